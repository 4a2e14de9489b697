//! Turns runtime events into terminal lines.
use std::collections::HashMap;

use battle_core::{BattleEvent, BattleOutcome, BattleState, CombatantId};
use runtime::{Event, RuntimeHandle, Topic};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::warn;

/// Reads every topic and prints what happened in publication order.
///
/// The runtime publishes a frame's events before the tick returns, so flushing
/// right after a step (or right before a prompt) shows everything so far.
pub struct Narrator {
    receivers: Vec<broadcast::Receiver<Event>>,
    names: HashMap<CombatantId, String>,
}

impl Narrator {
    pub fn new(handle: &RuntimeHandle, state: &BattleState) -> Self {
        let receivers = Topic::ALL
            .into_iter()
            .map(|topic| handle.subscribe(topic))
            .collect();
        let names = state
            .combatants
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect();
        Self { receivers, names }
    }

    pub fn name(&self, id: CombatantId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Prints all buffered events.
    pub fn flush(&mut self) {
        for line in self.drain().iter().filter_map(|e| self.describe(&e.payload)) {
            println!("{line}");
        }
    }

    fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        for rx in &mut self.receivers {
            loop {
                match rx.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(target: "battle_cli", skipped, "Event log fell behind");
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }
        events.sort_by_key(|e| e.sequence);
        events
    }

    fn describe(&self, event: &BattleEvent) -> Option<String> {
        let line = match event {
            BattleEvent::BattleStarted { heroes, enemies } => format!(
                "=== {} vs {} ===",
                self.list(heroes),
                self.list(enemies)
            ),
            BattleEvent::TurnStarted {
                actor,
                turn,
                lookahead,
                ..
            } => format!(
                "\n-- Turn {turn}: {} (next: {})",
                self.name(*actor),
                self.list(lookahead.get(1..).unwrap_or_default())
            ),
            BattleEvent::InputRequested { actor } => {
                format!("{} awaits orders", self.name(*actor))
            }
            BattleEvent::EchoTriggered { actor, echoer } => format!(
                "{} echoes {}'s strike",
                self.name(*echoer),
                self.name(*actor)
            ),
            BattleEvent::ActionResolved {
                attacker,
                target,
                attack,
                damage,
                net_damage,
                echo,
            } => format!(
                "{}{} uses {attack} on {}: {net_damage:.1} damage ({damage:.1} raw)",
                if *echo { "  echo: " } else { "" },
                self.name(*attacker),
                self.name(*target)
            ),
            BattleEvent::ActionRejected {
                actor,
                target,
                reason,
            } => format!(
                "{} cannot strike {}: {reason}",
                self.name(*actor),
                self.name(*target)
            ),
            BattleEvent::ChargeChanged {
                combatant,
                before,
                after,
            } => format!(
                "{} charge {before:.0} -> {after:.0}",
                self.name(*combatant)
            ),
            BattleEvent::DualStateActivated { combatant, turns } => format!(
                "{} enters dual-state for {turns} turn(s)",
                self.name(*combatant)
            ),
            BattleEvent::DualStateEnded { combatant } => {
                format!("{} leaves dual-state", self.name(*combatant))
            }
            BattleEvent::CombatantDied { combatant, team } => {
                format!("{} ({team}) falls", self.name(*combatant))
            }
            BattleEvent::BattleEnded { outcome } => match outcome {
                BattleOutcome::Win => "\n=== Victory ===".to_string(),
                BattleOutcome::Lose => "\n=== Defeat ===".to_string(),
            },
            BattleEvent::ActionFinished { .. } => return None,
        };
        Some(line)
    }

    fn list(&self, ids: &[CombatantId]) -> String {
        ids.iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

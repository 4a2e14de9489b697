//! Simulation worker that owns the authoritative [`BattleController`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), advances
//! the battle, and publishes every emitted [`BattleEvent`] to the
//! [`EventBus`].

use battle_core::{
    ActionIntent, BattleController, BattleEvent, BattleOutcome, BattlePhase, BattleState,
    CombatantId,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::{InputPrompt, Result};
use crate::events::{Event, EventBus};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Advance the battle by `dt` seconds.
    Tick {
        dt: f32,
        reply: oneshot::Sender<Result<TickReport>>,
    },
    /// Hand a player intent to the combatant waiting for input.
    SubmitIntent {
        intent: ActionIntent,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Query the current battle state (read-only).
    QueryState {
        reply: oneshot::Sender<BattleSnapshot>,
    },
}

/// Result of one frame.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub frame: u64,
    pub phase: BattlePhase,
    pub outcome: Option<BattleOutcome>,
    /// Set while a player-controlled combatant waits for an intent.
    pub prompt: Option<InputPrompt>,
}

/// Read-only copy of the battle.
#[derive(Clone, Debug)]
pub struct BattleSnapshot {
    pub frame: u64,
    pub phase: BattlePhase,
    pub outcome: Option<BattleOutcome>,
    pub current_actor: Option<CombatantId>,
    pub lookahead: Vec<CombatantId>,
    pub state: BattleState,
}

/// Background task that processes battle commands.
pub struct SimulationWorker {
    battle: BattleController,
    frame: u64,
    published: u64,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        battle: BattleController,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            battle,
            frame: 0,
            published: 0,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every command sender is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        debug!(target: "runtime::worker", frame = self.frame, "Simulation worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick { dt, reply } => {
                let result = self.tick(dt);
                let _ = reply.send(result);
            }
            Command::SubmitIntent { intent, reply } => {
                let result = self.submit_intent(intent);
                let _ = reply.send(result);
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn tick(&mut self, dt: f32) -> Result<TickReport> {
        self.frame += 1;
        let result = self.battle.tick(dt);
        // Events emitted before a failure are still delivered.
        self.publish_events();
        result?;

        Ok(TickReport {
            frame: self.frame,
            phase: self.battle.phase(),
            outcome: self.battle.outcome(),
            prompt: self.prompt(),
        })
    }

    fn submit_intent(&mut self, intent: ActionIntent) -> Result<()> {
        let actor = intent.actor;
        match self.battle.submit_intent(intent) {
            Ok(()) => {
                debug!(target: "runtime::worker", %actor, "Intent accepted");
                Ok(())
            }
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    %actor,
                    code = error.error_code(),
                    error = %error,
                    "Intent rejected"
                );
                Err(error.into())
            }
        }
    }

    fn prompt(&self) -> Option<InputPrompt> {
        let request = self.battle.pending_input()?;
        let team = self.battle.state().combatant(request.actor)?.team;
        Some(InputPrompt {
            team,
            request,
            state: self.battle.state().clone(),
        })
    }

    fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            frame: self.frame,
            phase: self.battle.phase(),
            outcome: self.battle.outcome(),
            current_actor: self.battle.current_actor(),
            lookahead: self.battle.lookahead().to_vec(),
            state: self.battle.state().clone(),
        }
    }

    fn publish_events(&mut self) {
        for event in self.battle.drain_events() {
            log_event(self.frame, &event);
            self.event_bus
                .publish(Event::new(self.frame, self.published, event));
            self.published += 1;
        }
    }
}

/// Scheduling at `debug`; resolved actions, deaths and outcomes at `info`.
fn log_event(frame: u64, event: &BattleEvent) {
    match event {
        BattleEvent::TurnStarted { actor, turn, .. } => {
            debug!(target: "runtime::worker", %actor, turn, "Turn started");
        }
        BattleEvent::ActionRejected { actor, reason, .. } => {
            debug!(target: "runtime::worker", %actor, %reason, "Action discarded");
        }
        BattleEvent::ActionResolved {
            attacker,
            target,
            attack,
            net_damage,
            echo,
            ..
        } => {
            info!(
                target: "runtime::worker",
                %attacker,
                %target,
                %attack,
                net_damage,
                echo,
                "Action resolved"
            );
        }
        BattleEvent::CombatantDied { combatant, team } => {
            info!(target: "runtime::worker", %combatant, %team, "Combatant died");
        }
        BattleEvent::BattleEnded { outcome } => {
            info!(target: "runtime::worker", %outcome, frame, "Battle ended");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use battle_core::CombatantId;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at_info(event: &BattleEvent) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || log_event(3, event));
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn resolved_actions_are_logged_at_info() {
        let line = logged_at_info(&BattleEvent::ActionResolved {
            attacker: CombatantId(0),
            target: CombatantId(2),
            attack: "Fireball".into(),
            damage: 20.0,
            net_damage: 17.0,
            echo: false,
        });
        assert!(line.contains("INFO"), "{line}");
        assert!(line.contains("Action resolved"), "{line}");
        assert!(line.contains("Fireball"), "{line}");
    }

    #[test]
    fn turn_scheduling_stays_below_info() {
        let line = logged_at_info(&BattleEvent::TurnStarted {
            actor: CombatantId(1),
            turn: 4,
            ticks: 2.5,
            lookahead: vec![CombatantId(1)],
        });
        assert!(line.is_empty(), "{line}");
    }
}

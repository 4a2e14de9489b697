//! Battle-level state machine.
//!
//! ```text
//!            ┌────────────── action finished ───────────────┐
//!            ▼                                              │
//!      AdvanceTime ──schedule──▶ Idle ──death──▶ VictoryCheck ──▶ Win | Lose
//!            ▲                                      │
//!            └──────── nobody holds the turn ───────┘
//! ```
//!
//! The controller owns the [`BattleState`] and one [`UnitController`] per
//! combatant. Each [`BattleController::tick`] settles the battle phase,
//! steps the unit holding the turn, then applies whatever that unit reported.

use super::turns::schedule_next_turn;
use super::unit::{Outbox, UnitContext, UnitController, UnitSignal, UnitState, living_opponents};
use crate::action::{ActionIntent, InputRequest};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, Dice, EuclideanProximity, PcgRng, ProximityOracle, RngOracle};
use crate::error::BattleError;
use crate::event::{BattleEvent, BattleOutcome};
use crate::state::{BattleState, Combatant, CombatantId, CombatantSpec, Team};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    /// Pick the next actor and move the clock to its turn.
    AdvanceTime,
    /// A unit holds the turn.
    Idle,
    /// Someone died; decide whether a side is wiped out.
    VictoryCheck,
    Win,
    Lose,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// Drives one battle from setup to a terminal outcome.
pub struct BattleController {
    phase: BattlePhase,
    outcome: Option<BattleOutcome>,
    config: BattleConfig,
    state: BattleState,
    units: Vec<UnitController>,
    rng: Box<dyn RngOracle>,
    proximity: Box<dyn ProximityOracle>,
    dice: Dice,
    outbox: Outbox,
}

impl BattleController {
    /// Sets up a battle. Identifiers are assigned heroes first, then enemies.
    ///
    /// # Errors
    ///
    /// - [`BattleError::InvalidConfig`] if `config` fails validation
    /// - [`BattleError::EmptyRoster`] if a side has no living combatant
    /// - [`BattleError::InvalidSpeed`] / [`BattleError::NoAttacks`] for bad combatants
    pub fn new(
        config: BattleConfig,
        heroes: Vec<CombatantSpec>,
        enemies: Vec<CombatantSpec>,
    ) -> Result<Self, BattleError> {
        config.validate().map_err(BattleError::InvalidConfig)?;

        let mut state = BattleState::default();
        let mut units = Vec::with_capacity(heroes.len() + enemies.len());
        let specs = heroes
            .into_iter()
            .map(|spec| (Team::Hero, spec))
            .chain(enemies.into_iter().map(|spec| (Team::Enemy, spec)));

        for (team, spec) in specs {
            let id = CombatantId(state.combatants.len() as u32);
            let record = Combatant::from_spec(id, team, spec, &config)?;
            let mut unit = UnitController::new(id);
            if record.is_alive() {
                state.roster.insert(id, team);
            } else {
                unit.mark_dead();
            }
            state.combatants.push(record);
            units.push(unit);
        }

        for team in [Team::Hero, Team::Enemy] {
            if state.roster.team(team).is_empty() {
                return Err(BattleError::EmptyRoster { team: Some(team) });
            }
        }

        let mut outbox = Outbox::default();
        outbox.event(BattleEvent::BattleStarted {
            heroes: state.roster.heroes().to_vec(),
            enemies: state.roster.enemies().to_vec(),
        });

        Ok(Self {
            phase: BattlePhase::AdvanceTime,
            outcome: None,
            config,
            state,
            units,
            rng: Box::new(PcgRng),
            proximity: Box::new(EuclideanProximity),
            dice: Dice::new(0),
            outbox,
        })
    }

    /// Seeds every random choice made during the battle.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dice = Dice::new(seed);
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_proximity(mut self, proximity: Box<dyn ProximityOracle>) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.dice.seed()
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.state.turn.current_actor
    }

    /// Predicted next actors, head first. For display only.
    pub fn lookahead(&self) -> &[CombatantId] {
        &self.state.turn.lookahead
    }

    pub fn unit_state(&self, id: CombatantId) -> Option<UnitState> {
        self.units.get(id.index()).map(UnitController::state)
    }

    /// Takes every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.outbox.events)
    }

    /// Advances the battle by `dt` seconds.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleFinished`] once an outcome is decided
    /// - scheduling errors if the roster became unschedulable
    pub fn tick(&mut self, dt: f32) -> Result<(), BattleError> {
        if self.is_finished() {
            return Err(BattleError::BattleFinished);
        }

        self.settle()?;
        if self.phase == BattlePhase::Idle
            && let Some(actor) = self.state.turn.current_actor
        {
            self.step_unit(actor, dt);
            self.process_signals();
            self.settle()?;
        }
        Ok(())
    }

    /// Choices available to the player-controlled actor, if it is waiting.
    pub fn pending_input(&self) -> Option<InputRequest> {
        let actor = self.state.turn.current_actor?;
        if self.phase != BattlePhase::Idle || !self.units.get(actor.index())?.is_awaiting_input() {
            return None;
        }
        let record = self.state.combatant(actor)?;
        Some(InputRequest {
            actor,
            attacks: record.attacks.clone(),
            targets: living_opponents(&self.state, record.team),
        })
    }

    /// Hands a player intent to the actor holding the turn.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleFinished`] once an outcome is decided
    /// - [`BattleError::NotChoosing`] if `intent.actor` is not choosing right now
    /// - [`BattleError::InvalidIntent`] / [`BattleError::UnknownCombatant`] for a malformed intent
    pub fn submit_intent(&mut self, intent: ActionIntent) -> Result<(), BattleError> {
        if self.is_finished() {
            return Err(BattleError::BattleFinished);
        }
        if self.state.turn.current_actor != Some(intent.actor) {
            return Err(BattleError::NotChoosing {
                actor: intent.actor,
            });
        }
        let unit = self
            .units
            .get_mut(intent.actor.index())
            .ok_or(BattleError::UnknownCombatant(intent.actor))?;
        unit.submit_intent(intent, &self.state)
    }

    /// Runs phase transitions until the battle waits on a unit or ends.
    fn settle(&mut self) -> Result<(), BattleError> {
        loop {
            match self.phase {
                BattlePhase::AdvanceTime => self.advance_time()?,
                BattlePhase::VictoryCheck => self.victory_check(),
                BattlePhase::Win | BattlePhase::Lose if self.outcome.is_none() => {
                    self.finish_battle()
                }
                _ => return Ok(()),
            }
        }
    }

    fn advance_time(&mut self) -> Result<(), BattleError> {
        let schedule = schedule_next_turn(&mut self.state, &self.config)?;

        self.outbox.event(BattleEvent::TurnStarted {
            actor: schedule.actor,
            turn: self.state.turn.turn_number,
            ticks: schedule.ticks,
            lookahead: schedule.lookahead,
        });
        if let Some(unit) = self.units.get_mut(schedule.actor.index()) {
            unit.begin_turn(&mut self.state, &mut self.outbox);
        }
        self.phase = BattlePhase::Idle;
        Ok(())
    }

    fn victory_check(&mut self) {
        self.phase = if self.state.roster.heroes().is_empty() {
            BattlePhase::Lose
        } else if self.state.roster.enemies().is_empty() {
            BattlePhase::Win
        } else if self.actor_holds_turn() {
            BattlePhase::Idle
        } else {
            BattlePhase::AdvanceTime
        };
    }

    fn finish_battle(&mut self) {
        let outcome = if self.phase == BattlePhase::Win {
            BattleOutcome::Win
        } else {
            BattleOutcome::Lose
        };

        for unit in &mut self.units {
            unit.cancel();
        }
        if outcome == BattleOutcome::Win {
            self.state.roster.clear();
        }
        self.state.turn.lookahead.clear();
        self.state.turn.current_actor = None;

        self.outcome = Some(outcome);
        self.outbox.event(BattleEvent::BattleEnded { outcome });
    }

    fn actor_holds_turn(&self) -> bool {
        self.state
            .turn
            .current_actor
            .and_then(|actor| self.units.get(actor.index()))
            .is_some_and(UnitController::holds_turn)
    }

    fn step_unit(&mut self, id: CombatantId, dt: f32) {
        let Some(unit) = self.units.get_mut(id.index()) else {
            return;
        };
        let mut ctx = UnitContext {
            state: &mut self.state,
            config: &self.config,
            env: BattleEnv::new(self.rng.as_ref(), self.proximity.as_ref()),
            dice: &mut self.dice,
            outbox: &mut self.outbox,
        };
        unit.step(&mut ctx, dt);
    }

    /// Applies unit reports after the step that produced them.
    fn process_signals(&mut self) {
        while !self.outbox.signals.is_empty() {
            let signals = std::mem::take(&mut self.outbox.signals);
            for (_, signal) in signals {
                match signal {
                    UnitSignal::Killed(target) => {
                        if let Some(unit) = self.units.get_mut(target.index()) {
                            unit.mark_dead();
                        }
                        self.step_unit(target, 0.0);
                    }
                    UnitSignal::Died => {
                        if !self.phase.is_terminal() {
                            self.phase = BattlePhase::VictoryCheck;
                        }
                    }
                    UnitSignal::ActionFinished => {
                        if self.phase == BattlePhase::Idle {
                            self.phase = BattlePhase::AdvanceTime;
                        }
                    }
                    UnitSignal::InputRequested => {}
                }
            }
        }
    }
}

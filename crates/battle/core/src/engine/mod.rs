//! Scheduling and the two state machines that run a battle.
//!
//! [`BattleController`] owns the state and decides whose turn it is through
//! the turn-order simulator in [`turns`]. Each combatant's turn is played out
//! by its [`UnitController`].

mod battle;
pub mod turns;
mod unit;

pub use battle::{BattleController, BattlePhase};
pub use turns::{InitiativeEntry, TurnSchedule, advance_to_threshold, build_lookahead, schedule_next_turn};
pub use unit::{ActingPhase, Outbox, UnitContext, UnitController, UnitSignal, UnitState};

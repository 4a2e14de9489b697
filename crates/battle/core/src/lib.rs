//! Deterministic turn-based battle rules.
//!
//! `battle-core` holds the combat model (combatants, attacks, the elemental
//! ledger and dual-state), the initiative-based turn scheduler and the
//! battle/unit state machines. It performs no I/O: callers drive it with
//! [`BattleController::tick`] and read back [`BattleEvent`]s.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod state;

pub use action::{ActionIntent, Attack, HitOutcome, InputRequest, Resolution};
pub use config::BattleConfig;
pub use engine::{
    ActingPhase, BattleController, BattlePhase, InitiativeEntry, TurnSchedule, UnitController,
    UnitSignal, UnitState,
};
pub use env::{BattleEnv, Dice, EuclideanProximity, PcgRng, ProximityOracle, RngOracle, RollContext};
pub use error::{BattleError, ErrorSeverity};
pub use event::{BattleEvent, BattleOutcome};
pub use state::{
    BattleState, ChargeChange, CombatStats, Combatant, CombatantId, CombatantSpec, DualState,
    Element, ElementTokens, Position, Roster, SelectionStrategy, Team, TurnState,
};

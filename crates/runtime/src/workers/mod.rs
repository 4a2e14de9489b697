//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the battle and executes commands sent through
//! [`crate::RuntimeHandle`].

mod simulation;

pub use simulation::{BattleSnapshot, Command, SimulationWorker, TickReport};

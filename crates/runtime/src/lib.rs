//! Async runtime orchestration for battles.
//!
//! This crate wraps a [`battle_core::BattleController`] in a background
//! simulation worker and drives it frame by frame. Consumers embed
//! [`Runtime`] to run battles, plug in [`ActionProvider`]s for
//! player-controlled combatants, and subscribe to events through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, ChannelActionProvider, FirstAttackProvider, InputPrompt, ProviderKind,
    RandomActionProvider, Result, RuntimeError, RuntimeHandle,
};
pub use events::{Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{BattleSnapshot, TickReport};

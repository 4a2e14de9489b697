//! Data-driven battle content.
//!
//! Provides loaders for RON/TOML data files:
//! - Attack catalogs and hero/enemy rosters (RON)
//! - Battle configuration (TOML)
//!
//! Loaders produce `battle-core` types directly; nothing here is consulted
//! once a battle is running.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CombatantTemplate, ConfigLoader, LoadResult, LoadedRoster, RosterFile, RosterLoader};

//! Oracles the battle rules consult but do not own.
//!
//! [`BattleEnv`] bundles them so engine code receives one borrowed handle.

mod proximity;
mod rng;

pub use proximity::{EuclideanProximity, ProximityOracle};
pub use rng::{Dice, PcgRng, RngOracle, RollContext, compute_seed};

/// Borrowed view over the oracles used while stepping a battle.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub rng: &'a dyn RngOracle,
    pub proximity: &'a dyn ProximityOracle,
}

impl<'a> BattleEnv<'a> {
    pub fn new(rng: &'a dyn RngOracle, proximity: &'a dyn ProximityOracle) -> Self {
        Self { rng, proximity }
    }
}

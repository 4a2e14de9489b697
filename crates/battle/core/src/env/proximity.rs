//! Proximity queries used by the echo rule.

use crate::state::{BattleState, CombatantId};

/// Answers "who stands near this combatant".
pub trait ProximityOracle: Send + Sync {
    /// Other living combatants within `radius` of `origin`, in roster order.
    fn nearby(&self, state: &BattleState, origin: CombatantId, radius: f32) -> Vec<CombatantId>;
}

/// Straight-line distance between current positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanProximity;

impl ProximityOracle for EuclideanProximity {
    fn nearby(&self, state: &BattleState, origin: CombatantId, radius: f32) -> Vec<CombatantId> {
        let Some(center) = state.combatant(origin).map(|c| c.position) else {
            return Vec::new();
        };

        state
            .roster
            .all()
            .iter()
            .copied()
            .filter(|&id| id != origin)
            .filter(|&id| {
                state
                    .combatant(id)
                    .is_some_and(|c| c.is_alive() && c.position.distance(center) <= radius)
            })
            .collect()
    }
}

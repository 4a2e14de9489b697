use std::sync::Arc;

use super::Attack;
use crate::state::CombatantId;

/// Selected action waiting to be executed: who attacks whom, with what.
///
/// Built once when a combatant leaves `Choosing` and consumed once by the
/// resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionIntent {
    pub actor: CombatantId,
    pub target: CombatantId,
    pub attack: Arc<Attack>,
}

impl ActionIntent {
    pub fn new(actor: CombatantId, target: CombatantId, attack: Arc<Attack>) -> Self {
        Self {
            actor,
            target,
            attack,
        }
    }
}

/// What a player-controlled combatant may choose from.
#[derive(Clone, Debug, PartialEq)]
pub struct InputRequest {
    pub actor: CombatantId,
    pub attacks: Vec<Arc<Attack>>,
    /// Living opponents, in roster order.
    pub targets: Vec<CombatantId>,
}

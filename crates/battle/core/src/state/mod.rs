//! Battle state: combatant records, rosters and turn bookkeeping.
//!
//! All mutable battle data lives in [`BattleState`], owned by the
//! [`BattleController`](crate::engine::BattleController). Unit controllers
//! borrow it while they step and only touch their own record plus, during
//! damage resolution, the target's HP, ledger and state.

mod combatant;
mod common;
mod dual_state;
mod ledger;
mod roster;

pub use combatant::{CombatStats, Combatant, CombatantSpec, SelectionStrategy};
pub use common::{CombatantId, Position, Team};
pub use dual_state::{ChargeChange, DualState};
pub use ledger::{Element, ElementTokens};
pub use roster::Roster;

/// Scheduling bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnState {
    /// Predicted next actors, for display only.
    pub lookahead: Vec<CombatantId>,
    /// Combatant whose turn is in progress.
    pub current_actor: Option<CombatantId>,
    /// Number of turns started so far.
    pub turn_number: u64,
}

/// Complete mutable state of one battle.
#[derive(Clone, Debug, Default)]
pub struct BattleState {
    /// Every combatant record, indexed by [`CombatantId`]. Dead records stay.
    pub combatants: Vec<Combatant>,
    pub roster: Roster,
    pub turn: TurnState,
}

impl BattleState {
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id.index())
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(id.index())
    }

    /// Living members of `team` in roster order.
    pub fn living(&self, team: Team) -> impl Iterator<Item = &Combatant> + '_ {
        self.roster
            .team(team)
            .iter()
            .filter_map(|&id| self.combatant(id))
            .filter(|c| c.is_alive())
    }

    /// Removes `id` from all roster views and from the lookahead queue.
    ///
    /// Returns true if the combatant was still on the roster.
    pub fn remove_from_battle(&mut self, id: CombatantId) -> bool {
        self.turn.lookahead.retain(|&queued| queued != id);
        self.roster.remove(id)
    }
}

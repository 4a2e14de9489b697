//! Hero, enemy and all-combatant membership.

use super::{CombatantId, Team};

/// The three roster views used by scheduling and the victory check.
///
/// Invariant: `all` is exactly `heroes ∪ enemies`, in insertion order. Every
/// mutation updates the three views together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    heroes: Vec<CombatantId>,
    enemies: Vec<CombatantId>,
    all: Vec<CombatantId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` to its team's view and to the combined view.
    ///
    /// Returns false if it was already present.
    pub fn insert(&mut self, id: CombatantId, team: Team) -> bool {
        if self.all.contains(&id) {
            return false;
        }
        match team {
            Team::Hero => self.heroes.push(id),
            Team::Enemy => self.enemies.push(id),
        }
        self.all.push(id);
        true
    }

    /// Removes `id` from every view. Returns true if it was present.
    pub fn remove(&mut self, id: CombatantId) -> bool {
        let before = self.all.len();
        self.heroes.retain(|&member| member != id);
        self.enemies.retain(|&member| member != id);
        self.all.retain(|&member| member != id);
        debug_assert!(self.is_consistent(), "roster views diverged");
        self.all.len() != before
    }

    /// Empties every view.
    pub fn clear(&mut self) {
        self.heroes.clear();
        self.enemies.clear();
        self.all.clear();
    }

    pub fn heroes(&self) -> &[CombatantId] {
        &self.heroes
    }

    pub fn enemies(&self) -> &[CombatantId] {
        &self.enemies
    }

    pub fn all(&self) -> &[CombatantId] {
        &self.all
    }

    pub fn team(&self, team: Team) -> &[CombatantId] {
        match team {
            Team::Hero => &self.heroes,
            Team::Enemy => &self.enemies,
        }
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.all.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Checks the `all = heroes ∪ enemies` invariant.
    pub fn is_consistent(&self) -> bool {
        self.all.len() == self.heroes.len() + self.enemies.len()
            && self
                .all
                .iter()
                .all(|id| self.heroes.contains(id) != self.enemies.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Roster {
        let mut roster = Roster::new();
        roster.insert(CombatantId(0), Team::Hero);
        roster.insert(CombatantId(1), Team::Hero);
        roster.insert(CombatantId(2), Team::Enemy);
        roster
    }

    #[test]
    fn removal_updates_every_view() {
        let mut roster = sample();

        assert!(roster.remove(CombatantId(1)));
        assert_eq!(roster.heroes(), &[CombatantId(0)]);
        assert_eq!(roster.all(), &[CombatantId(0), CombatantId(2)]);
        assert!(roster.is_consistent());

        assert!(roster.remove(CombatantId(2)));
        assert!(roster.enemies().is_empty());
        assert!(roster.is_consistent());
    }

    #[test]
    fn removal_is_idempotent() {
        let mut roster = sample();
        assert!(roster.remove(CombatantId(0)));
        let snapshot = roster.clone();
        assert!(!roster.remove(CombatantId(0)));
        assert_eq!(roster, snapshot);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut roster = sample();
        assert!(!roster.insert(CombatantId(0), Team::Enemy));
        assert!(roster.enemies().len() == 1 && roster.is_consistent());
    }

    #[test]
    fn clear_keeps_views_consistent() {
        let mut roster = sample();
        roster.clear();
        assert!(roster.is_empty());
        assert!(roster.heroes().is_empty() && roster.enemies().is_empty());
    }
}

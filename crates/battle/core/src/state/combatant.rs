//! Combatant records.
//!
//! A [`Combatant`] is pure data: stats, scheduling state, elemental ledger and
//! dual-state tracker. Behaviour lives in the unit controller and the action
//! resolver. Records are created from a [`CombatantSpec`] at battle start and
//! kept after death for history.

use std::sync::Arc;

use super::{CombatantId, DualState, ElementTokens, Position, Team};
use crate::action::Attack;
use crate::config::BattleConfig;
use crate::error::BattleError;

/// How a combatant picks its action while choosing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionStrategy {
    /// Uniform random target among living opponents, uniform random attack.
    RandomAi,
    /// Waits for an intent from the player-choice collaborator.
    PlayerInput,
}

impl SelectionStrategy {
    /// Default strategy for a team: heroes are player-controlled, enemies are AI.
    pub const fn default_for(team: Team) -> Self {
        match team {
            Team::Hero => SelectionStrategy::PlayerInput,
            Team::Enemy => SelectionStrategy::RandomAi,
        }
    }
}

/// Combat statistics. Current values start at their base values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub current_hp: f32,
    pub max_hp: f32,
    pub base_attack: f32,
    pub current_attack: f32,
    pub base_defense: f32,
    pub current_defense: f32,
    /// Initiative gained per tick. Must be positive.
    pub speed: f64,
}

impl CombatStats {
    pub fn new(max_hp: f32, attack: f32, defense: f32, speed: f64) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            base_attack: attack,
            current_attack: attack,
            base_defense: defense,
            current_defense: defense,
            speed,
        }
    }
}

/// Roster entry used to create a combatant at battle start.
#[derive(Clone, Debug)]
pub struct CombatantSpec {
    pub name: String,
    pub stats: CombatStats,
    pub state_charge: f32,
    pub initiative: f64,
    pub position: Position,
    pub attacks: Vec<Arc<Attack>>,
    /// Overrides the team default when set.
    pub strategy: Option<SelectionStrategy>,
}

impl CombatantSpec {
    pub fn new(name: impl Into<String>, stats: CombatStats, attacks: Vec<Arc<Attack>>) -> Self {
        Self {
            name: name.into(),
            stats,
            state_charge: 0.0,
            initiative: 0.0,
            position: Position::ORIGIN,
            attacks,
            strategy: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_charge(mut self, charge: f32) -> Self {
        self.state_charge = charge;
        self
    }

    pub fn with_initiative(mut self, initiative: f64) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// One combatant's complete battle record.
#[derive(Clone, Debug)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub team: Team,
    pub alive: bool,
    pub stats: CombatStats,
    /// Scheduling accumulator; a turn triggers at the configured threshold.
    pub initiative: f64,
    pub ledger: ElementTokens,
    pub dual_state: DualState,
    pub attacks: Vec<Arc<Attack>>,
    pub strategy: SelectionStrategy,
    pub position: Position,
    /// Where the combatant stands between actions.
    pub home: Position,
    /// Last attack this combatant executed; echoes repeat it.
    pub last_attack: Option<Arc<Attack>>,
}

impl Combatant {
    /// Builds a combatant record, validating the invariants scheduling relies on.
    ///
    /// # Errors
    ///
    /// - [`BattleError::InvalidSpeed`] if speed is not a positive finite number
    /// - [`BattleError::NoAttacks`] if the attack list is empty
    pub fn from_spec(
        id: CombatantId,
        team: Team,
        spec: CombatantSpec,
        config: &BattleConfig,
    ) -> Result<Self, BattleError> {
        let speed = spec.stats.speed;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(BattleError::InvalidSpeed {
                combatant: spec.name,
                speed,
            });
        }
        if spec.attacks.is_empty() {
            return Err(BattleError::NoAttacks {
                combatant: spec.name,
            });
        }

        let mut stats = spec.stats;
        stats.current_hp = stats.current_hp.clamp(0.0, stats.max_hp.max(0.0));

        Ok(Self {
            id,
            name: spec.name,
            team,
            alive: stats.current_hp > 0.0,
            stats,
            initiative: spec.initiative.max(0.0),
            ledger: ElementTokens::NONE,
            dual_state: DualState::with_charge(spec.state_charge, config.max_charge),
            attacks: spec.attacks,
            strategy: spec.strategy.unwrap_or(SelectionStrategy::default_for(team)),
            position: spec.position,
            home: spec.position,
            last_attack: None,
        })
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn in_dual_state(&self) -> bool {
        self.dual_state.active
    }

    /// This combatant's own copy of `attack`, matched by identity or full value.
    ///
    /// A same-named attack with different stats is not a match.
    pub fn known_attack(&self, attack: &Attack) -> Option<&Arc<Attack>> {
        self.attacks
            .iter()
            .find(|known| core::ptr::eq(known.as_ref(), attack) || ***known == *attack)
    }
}

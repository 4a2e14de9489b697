//! Error infrastructure for battle-core.
//!
//! Setup errors (`EmptyRoster`, `InvalidSpeed`, `NoAttacks`) are detected
//! before a battle starts and prevent it from starting. In-battle errors are
//! recoverable: the offending intent is discarded and the turn ends.

use crate::state::{CombatantId, Team};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the battle continues; the offending intent is discarded
/// - **Validation**: invalid input from a caller, rejected without side effects
/// - **Internal**: state inconsistency that indicates a bug
/// - **Fatal**: the battle cannot start or continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Errors surfaced by battle setup, scheduling and action resolution.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BattleError {
    #[error("{} roster is empty", .team.map_or("combatant", Team::as_str))]
    EmptyRoster { team: Option<Team> },

    #[error("combatant '{combatant}' has invalid speed {speed}")]
    InvalidSpeed { combatant: String, speed: f64 },

    #[error("combatant '{combatant}' has no attacks")]
    NoAttacks { combatant: String },

    #[error("{actor} targeted {target}, which is already dead")]
    DeadTarget {
        actor: CombatantId,
        target: CombatantId,
    },

    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("{actor} is already executing an action")]
    ReentrantAction { actor: CombatantId },

    #[error("charge for {actor} left the meter range ({attempted}) and was clamped")]
    InvalidChargeValue { actor: CombatantId, attempted: f32 },

    #[error("{actor} is not choosing an action")]
    NotChoosing { actor: CombatantId },

    #[error("invalid intent from {actor}: {reason}")]
    InvalidIntent {
        actor: CombatantId,
        reason: &'static str,
    },

    #[error("invalid battle configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("the battle has already finished")]
    BattleFinished,
}

impl BattleError {
    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyRoster { .. }
            | Self::InvalidSpeed { .. }
            | Self::NoAttacks { .. }
            | Self::InvalidConfig(_) => ErrorSeverity::Fatal,
            Self::DeadTarget { .. }
            | Self::ReentrantAction { .. }
            | Self::InvalidChargeValue { .. } => ErrorSeverity::Recoverable,
            Self::UnknownCombatant(_)
            | Self::NotChoosing { .. }
            | Self::InvalidIntent { .. }
            | Self::BattleFinished => ErrorSeverity::Validation,
        }
    }

    /// Returns a static string identifier for this error variant.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRoster { .. } => "EMPTY_ROSTER",
            Self::InvalidSpeed { .. } => "INVALID_SPEED",
            Self::NoAttacks { .. } => "NO_ATTACKS",
            Self::DeadTarget { .. } => "DEAD_TARGET",
            Self::UnknownCombatant(_) => "UNKNOWN_COMBATANT",
            Self::ReentrantAction { .. } => "REENTRANT_ACTION",
            Self::InvalidChargeValue { .. } => "INVALID_CHARGE_VALUE",
            Self::NotChoosing { .. } => "NOT_CHOOSING",
            Self::InvalidIntent { .. } => "INVALID_INTENT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::BattleFinished => "BATTLE_FINISHED",
        }
    }
}

//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, the battle rules and action
//! providers so clients can bubble them up with consistent context.
use std::fmt;

use battle_core::{BattleError, Team};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("{kind} action provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("{kind} action provider failed: {reason}")]
    ProviderFailed { kind: ProviderKind, reason: String },

    #[error("action provider channel closed")]
    ActionProviderChannelClosed,

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a hero and enemy roster before building")]
    MissingRoster,

    #[error("battle did not finish within {frames} frames")]
    FrameLimitReached { frames: u64 },
}

/// Which side an action provider serves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Hero,
    Enemy,
}

impl From<Team> for ProviderKind {
    fn from(team: Team) -> Self {
        match team {
            Team::Hero => ProviderKind::Hero,
            Team::Enemy => ProviderKind::Enemy,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Hero => "hero",
            ProviderKind::Enemy => "enemy",
        };
        write!(f, "{}", label)
    }
}

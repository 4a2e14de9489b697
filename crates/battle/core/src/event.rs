//! Presentation events emitted by the battle controller.
//!
//! Events are buffered by the controller and drained by the caller. The
//! battle never waits on whoever consumes them.

use crate::state::{CombatantId, Team};

/// Terminal result of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Win,
    Lose,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    BattleStarted {
        heroes: Vec<CombatantId>,
        enemies: Vec<CombatantId>,
    },

    /// A turn was handed to `actor` after advancing the clock by `ticks`.
    TurnStarted {
        actor: CombatantId,
        turn: u64,
        ticks: f64,
        lookahead: Vec<CombatantId>,
    },

    /// A player-controlled combatant is waiting for an intent.
    InputRequested { actor: CombatantId },

    /// `echoer` repeats its last attack because `actor` started an action nearby.
    EchoTriggered {
        actor: CombatantId,
        echoer: CombatantId,
    },

    ActionResolved {
        attacker: CombatantId,
        target: CombatantId,
        attack: String,
        damage: f32,
        net_damage: f32,
        echo: bool,
    },

    /// The intent was discarded; the turn ended without effect.
    ActionRejected {
        actor: CombatantId,
        target: CombatantId,
        reason: String,
    },

    ChargeChanged {
        combatant: CombatantId,
        before: f32,
        after: f32,
    },

    DualStateActivated {
        combatant: CombatantId,
        turns: u32,
    },

    DualStateEnded { combatant: CombatantId },

    /// The acting combatant is back home and its turn is over.
    ActionFinished { actor: CombatantId },

    CombatantDied {
        combatant: CombatantId,
        team: Team,
    },

    BattleEnded { outcome: BattleOutcome },
}

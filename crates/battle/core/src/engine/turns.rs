//! Turn-order simulation.
//!
//! Every combatant gains `speed` initiative per tick and acts once it holds
//! at least the threshold T. Two operations share that model:
//!
//! - [`build_lookahead`] replays ticks on a copy of the initiative values to
//!   predict the next actors (display only).
//! - [`advance_to_threshold`] jumps the real initiative values forward by the
//!   exact fractional tick count that brings the predicted actor to T.
//!
//! Within one simulated tick, the combatant that overflowed T by the largest
//! margin acts first; equal overflow keeps roster order.

use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::state::{BattleState, CombatantId};

/// One combatant's scheduling inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitiativeEntry {
    pub id: CombatantId,
    pub speed: f64,
    pub initiative: f64,
}

/// Result of scheduling one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnSchedule {
    pub actor: CombatantId,
    /// Fractional ticks applied to every combatant (0 if the actor was already ready).
    pub ticks: f64,
    pub lookahead: Vec<CombatantId>,
}

/// Copies the scheduling inputs of every roster member, in roster order.
pub fn snapshot(state: &BattleState) -> Vec<InitiativeEntry> {
    state
        .roster
        .all()
        .iter()
        .filter_map(|&id| state.combatant(id))
        .map(|c| InitiativeEntry {
            id: c.id,
            speed: c.stats.speed,
            initiative: c.initiative,
        })
        .collect()
}

/// Predicts the next `length` actors without touching real initiative.
///
/// # Errors
///
/// - [`BattleError::EmptyRoster`] if `entries` is empty
/// - [`BattleError::InvalidSpeed`] if any speed is not positive and finite, or
///   too small to move an initiative of `threshold`
pub fn build_lookahead(
    entries: &[InitiativeEntry],
    threshold: f64,
    length: usize,
) -> Result<Vec<CombatantId>, BattleError> {
    validate_entries(entries, threshold)?;

    let mut simulated = entries.to_vec();
    let mut queue = Vec::with_capacity(length + simulated.len());
    let mut ready: Vec<(CombatantId, f64)> = Vec::with_capacity(simulated.len());

    while queue.len() < length {
        skip_idle_ticks(&mut simulated, threshold);
        ready.clear();

        for entry in simulated.iter_mut() {
            entry.initiative += entry.speed;
            if entry.initiative >= threshold {
                // Keep the overflow so banked progress carries into later passes.
                entry.initiative -= threshold;
                ready.push((entry.id, entry.initiative));
            }
        }

        // Stable sort: largest overflow first, roster order on ties.
        ready.sort_by(|a, b| b.1.total_cmp(&a.1));
        queue.extend(ready.iter().map(|&(id, _)| id));
    }

    queue.truncate(length);
    Ok(queue)
}

/// Moves every roster member forward so `actor` reaches `threshold`.
///
/// Applies `speed × ticks` to each combatant, where
/// `ticks = (threshold - actor.initiative) / actor.speed`. Does nothing if the
/// actor is already ready. The actor's initiative is snapped to at least
/// `threshold` so rounding cannot leave it a hair short.
///
/// Returns the number of ticks applied.
pub fn advance_to_threshold(
    state: &mut BattleState,
    actor: CombatantId,
    threshold: f64,
) -> Result<f64, BattleError> {
    let record = state
        .combatant(actor)
        .ok_or(BattleError::UnknownCombatant(actor))?;
    if record.initiative >= threshold {
        return Ok(0.0);
    }
    if !(record.stats.speed.is_finite() && record.stats.speed > 0.0) {
        return Err(BattleError::InvalidSpeed {
            combatant: record.name.clone(),
            speed: record.stats.speed,
        });
    }

    let ticks = (threshold - record.initiative) / record.stats.speed;

    let members: Vec<CombatantId> = state.roster.all().to_vec();
    for id in members {
        if let Some(combatant) = state.combatant_mut(id) {
            combatant.initiative += combatant.stats.speed * ticks;
        }
    }

    if let Some(record) = state.combatant_mut(actor) {
        record.initiative = record.initiative.max(threshold);
    }

    Ok(ticks)
}

/// Picks the next actor, advances real initiative and records the lookahead.
///
/// The head of the freshly built lookahead queue is authoritative.
pub fn schedule_next_turn(
    state: &mut BattleState,
    config: &BattleConfig,
) -> Result<TurnSchedule, BattleError> {
    let entries = snapshot(state);
    let lookahead = build_lookahead(&entries, config.turn_threshold, config.queue_length.max(1))?;
    let actor = *lookahead
        .first()
        .ok_or(BattleError::EmptyRoster { team: None })?;

    let ticks = advance_to_threshold(state, actor, config.turn_threshold)?;

    state.turn.lookahead = lookahead.clone();
    state.turn.current_actor = Some(actor);
    state.turn.turn_number += 1;

    Ok(TurnSchedule {
        actor,
        ticks,
        lookahead,
    })
}

/// Fast-forwards over whole ticks in which nobody can reach `threshold`.
///
/// One tick is always left for the regular pass, so the crossing itself and
/// its overflow ordering are computed the same way as without the skip.
fn skip_idle_ticks(entries: &mut [InitiativeEntry], threshold: f64) {
    let idle = entries
        .iter()
        .map(|e| ((threshold - e.initiative) / e.speed).floor() - 1.0)
        .fold(f64::INFINITY, f64::min);
    if idle >= 1.0 && idle.is_finite() {
        for entry in entries.iter_mut() {
            entry.initiative += entry.speed * idle;
        }
    }
}

/// Smallest usable speed as a fraction of the threshold. Anything slower
/// vanishes when added to an initiative near the threshold.
const MIN_SPEED_RATIO: f64 = 1e-15;

fn validate_entries(entries: &[InitiativeEntry], threshold: f64) -> Result<(), BattleError> {
    if entries.is_empty() {
        return Err(BattleError::EmptyRoster { team: None });
    }
    let min_speed = threshold * MIN_SPEED_RATIO;
    if let Some(bad) = entries
        .iter()
        .find(|e| !(e.speed.is_finite() && e.speed > 0.0 && e.speed >= min_speed))
    {
        return Err(BattleError::InvalidSpeed {
            combatant: bad.id.to_string(),
            speed: bad.speed,
        });
    }
    Ok(())
}

//! Damage, token and charge resolution.
//!
//! # Formula
//!
//! ```text
//! damage     = attacker.current_attack + attack.damage
//! damage    *= 2                       (attacker in dual-state)
//! net_damage = damage - target.current_defense
//! hp         = max(hp - net_damage, 0) (only when net_damage > 0)
//! ```
//!
//! A primary action then updates the attacker's dual-state: turn accounting
//! for an activation that was already running, then charge, then activation.
//! Echo actions stop after the hit.

use super::{ActionIntent, Attack};
use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::state::{BattleState, ChargeChange, Combatant, CombatantId};

/// Outcome of applying one hit to a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitOutcome {
    /// HP actually removed (never negative).
    pub net_damage: f32,
    pub hp_after: f32,
    /// True if this hit brought HP to 0.
    pub killed: bool,
}

/// Record of one resolved action, primary or echo.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub attack: String,
    /// Damage before defense, after dual-state doubling.
    pub damage: f32,
    pub hit: HitOutcome,
    pub echo: bool,
    /// Charge movement of the attacker; `None` for echoes.
    pub charge: Option<ChargeChange>,
    pub dual_state_activated: bool,
}

/// Computes the attacker's damage before defense.
pub fn compute_damage(attacker: &Combatant, attack: &Attack) -> f32 {
    let damage = attacker.stats.current_attack + attack.damage;
    if attacker.in_dual_state() {
        damage * 2.0
    } else {
        damage
    }
}

/// Grants the attack's tokens and subtracts damage net of defense.
///
/// Defense absorbs non-positive results entirely: HP never increases and
/// never drops below 0.
pub fn apply_hit(target: &mut Combatant, attack: &Attack, damage: f32) -> HitOutcome {
    target.ledger.grant(&attack.tokens);

    let net_damage = (damage - target.stats.current_defense).max(0.0);
    let was_standing = target.stats.current_hp > 0.0;
    if net_damage > 0.0 {
        target.stats.current_hp = (target.stats.current_hp - net_damage).max(0.0);
    }

    HitOutcome {
        net_damage,
        hp_after: target.stats.current_hp,
        killed: was_standing && target.stats.current_hp <= 0.0,
    }
}

/// Resolves a primary action.
///
/// # Errors
///
/// - [`BattleError::UnknownCombatant`] if either side is not a battle record
/// - [`BattleError::DeadTarget`] if the target is already dead; nothing is applied
pub fn resolve_action(
    state: &mut BattleState,
    intent: &ActionIntent,
    config: &BattleConfig,
) -> Result<Resolution, BattleError> {
    let damage = {
        let attacker = state
            .combatant(intent.actor)
            .ok_or(BattleError::UnknownCombatant(intent.actor))?;
        ensure_living_target(state, intent.actor, intent.target)?;
        compute_damage(attacker, &intent.attack)
    };

    let hit = {
        let target = state
            .combatant_mut(intent.target)
            .ok_or(BattleError::UnknownCombatant(intent.target))?;
        apply_hit(target, &intent.attack, damage)
    };

    let attacker = state
        .combatant_mut(intent.actor)
        .ok_or(BattleError::UnknownCombatant(intent.actor))?;

    // Accounting applies to an activation that was running before this action.
    attacker
        .dual_state
        .record_completed_action(intent.attack.extending);
    let charge = attacker
        .dual_state
        .add_charge(intent.attack.charge, config.max_charge);
    let dual_state_activated = attacker
        .dual_state
        .try_activate(config.max_charge, config.dual_state_turns);
    attacker.last_attack = Some(intent.attack.clone());

    Ok(Resolution {
        attacker: intent.actor,
        target: intent.target,
        attack: intent.attack.name.clone(),
        damage,
        hit,
        echo: false,
        charge: Some(charge),
        dual_state_activated,
    })
}

/// Resolves an echo: `echoer` repeats its last attack (or its first) on `target`.
///
/// Same damage and token rules as a primary action; charge and dual-state
/// counters are left alone.
pub fn resolve_echo(
    state: &mut BattleState,
    echoer: CombatantId,
    target: CombatantId,
) -> Result<Resolution, BattleError> {
    let (attack, damage) = {
        let source = state
            .combatant(echoer)
            .ok_or(BattleError::UnknownCombatant(echoer))?;
        ensure_living_target(state, echoer, target)?;
        let attack = source
            .last_attack
            .clone()
            .or_else(|| source.attacks.first().cloned())
            .ok_or_else(|| BattleError::NoAttacks {
                combatant: source.name.clone(),
            })?;
        let damage = compute_damage(source, &attack);
        (attack, damage)
    };

    let target_record = state
        .combatant_mut(target)
        .ok_or(BattleError::UnknownCombatant(target))?;
    let hit = apply_hit(target_record, &attack, damage);

    Ok(Resolution {
        attacker: echoer,
        target,
        attack: attack.name.clone(),
        damage,
        hit,
        echo: true,
        charge: None,
        dual_state_activated: false,
    })
}

fn ensure_living_target(
    state: &BattleState,
    actor: CombatantId,
    target: CombatantId,
) -> Result<(), BattleError> {
    let record = state
        .combatant(target)
        .ok_or(BattleError::UnknownCombatant(target))?;
    if !record.is_alive() || record.stats.current_hp <= 0.0 {
        return Err(BattleError::DeadTarget { actor, target });
    }
    Ok(())
}

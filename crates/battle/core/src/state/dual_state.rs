//! Charge meter and dual-state bookkeeping.
//!
//! Lifecycle of one activation:
//!
//! ```text
//! charge reaches max ──▶ active, turns_remaining = N
//!        │
//!        ├─ each completed action: turns_remaining -= 1
//!        │    (first extending action instead sets was_extended)
//!        ▼
//! start of a turn with turns_remaining == 0 ──▶ inactive, charge = 0
//! ```

/// Result of adding charge to the meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeChange {
    pub before: f32,
    pub after: f32,
    /// Unclamped value, reported when it left `[0, max]`.
    pub clamped_from: Option<f32>,
}

/// Per-combatant dual-state tracker.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualState {
    /// Charge meter, always within `[0, max_charge]`.
    pub charge: f32,
    pub active: bool,
    pub turns_remaining: u32,
    /// Set once the extending attack has granted its bonus turn in this activation.
    pub was_extended: bool,
}

impl DualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a pre-filled meter (clamped to `[0, max_charge]`).
    pub fn with_charge(charge: f32, max_charge: f32) -> Self {
        Self {
            charge: clamp_charge(charge, max_charge),
            ..Self::default()
        }
    }

    /// Adds `amount` to the meter and clamps the result to `[0, max_charge]`.
    pub fn add_charge(&mut self, amount: f32, max_charge: f32) -> ChargeChange {
        let before = self.charge;
        let raw = before + amount;
        self.charge = clamp_charge(raw, max_charge);
        let clamped_from = (raw != self.charge).then_some(raw);
        ChargeChange {
            before,
            after: self.charge,
            clamped_from,
        }
    }

    /// Activates dual-state when the meter is full and it is not already active.
    ///
    /// Returns true if this call activated it.
    pub fn try_activate(&mut self, max_charge: f32, turns: u32) -> bool {
        if self.active || self.charge < max_charge {
            return false;
        }
        self.active = true;
        self.turns_remaining = turns;
        self.was_extended = false;
        true
    }

    /// Counts one completed action against the active dual-state.
    ///
    /// The first extending action of an activation sets `was_extended`
    /// instead of consuming a turn. No-op while inactive.
    pub fn record_completed_action(&mut self, extending: bool) {
        if !self.active {
            return;
        }
        if extending && !self.was_extended {
            self.was_extended = true;
        } else {
            self.turns_remaining = self.turns_remaining.saturating_sub(1);
        }
    }

    /// Ends an active dual-state whose turns are spent.
    ///
    /// Resets charge to exactly 0. Returns true if dual-state ended.
    pub fn expire_if_spent(&mut self) -> bool {
        if !self.active || self.turns_remaining > 0 {
            return false;
        }
        self.clear();
        true
    }

    /// Unconditionally drops dual-state and empties the meter.
    pub fn clear(&mut self) {
        self.charge = 0.0;
        self.active = false;
        self.turns_remaining = 0;
        self.was_extended = false;
    }
}

fn clamp_charge(value: f32, max_charge: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max_charge)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f32 = 100.0;

    #[test]
    fn charge_clamps_and_activates_at_max() {
        let mut state = DualState::with_charge(95.0, MAX);

        let change = state.add_charge(10.0, MAX);
        assert_eq!(change.after, 100.0);
        assert_eq!(change.clamped_from, Some(105.0));

        assert!(state.try_activate(MAX, 1));
        assert!(state.active);
        assert_eq!(state.turns_remaining, 1);

        // Already active: a second activation is refused.
        assert!(!state.try_activate(MAX, 3));
        assert_eq!(state.turns_remaining, 1);
    }

    #[test]
    fn negative_charge_clamps_to_zero() {
        let mut state = DualState::with_charge(5.0, MAX);
        let change = state.add_charge(-20.0, MAX);
        assert_eq!(change.after, 0.0);
        assert_eq!(change.clamped_from, Some(-15.0));
    }

    #[test]
    fn in_range_charge_is_not_reported_as_clamped() {
        let mut state = DualState::new();
        assert_eq!(state.add_charge(40.0, MAX).clamped_from, None);
        assert!(!state.try_activate(MAX, 1));
    }

    #[test]
    fn extending_action_grants_one_bonus_turn() {
        let mut state = DualState::with_charge(MAX, MAX);
        state.try_activate(MAX, 1);

        state.record_completed_action(true);
        assert!(state.was_extended);
        assert_eq!(state.turns_remaining, 1);

        // Second extending action in the same activation consumes a turn.
        state.record_completed_action(true);
        assert_eq!(state.turns_remaining, 0);
    }

    #[test]
    fn expiry_resets_charge_and_flags() {
        let mut state = DualState::with_charge(MAX, MAX);
        state.try_activate(MAX, 1);
        state.record_completed_action(true);
        assert!(!state.expire_if_spent());

        state.record_completed_action(false);
        assert!(state.expire_if_spent());
        assert_eq!(state.charge, 0.0);
        assert!(!state.active);
        assert!(!state.was_extended);

        // Idle trackers never expire.
        assert!(!state.expire_if_spent());
    }

    #[test]
    fn inactive_tracker_ignores_completed_actions() {
        let mut state = DualState::new();
        state.record_completed_action(true);
        assert!(!state.was_extended);
        assert_eq!(state.turns_remaining, 0);
    }
}

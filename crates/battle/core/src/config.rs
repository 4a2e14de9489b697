/// Battle configuration constants and tunable parameters.
///
/// Scheduling values are in initiative units, movement values in world units
/// and seconds. Every field has a default so partial config files load.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Initiative a combatant must reach before it may act (T).
    pub turn_threshold: f64,

    /// Number of predicted actors in the lookahead queue.
    pub queue_length: usize,

    /// Turns granted when dual-state activates.
    pub dual_state_turns: u32,

    /// Charge value at which dual-state activates. Charge is clamped to `[0, max_charge]`.
    pub max_charge: f32,

    /// Radius around the acting combatant inside which dual-state allies echo.
    pub echo_radius: f32,

    /// Distance to the target at which the approach stops.
    pub approach_distance: f32,

    /// Distance to the home position at which the return trip counts as finished.
    pub return_tolerance: f32,

    /// Movement speed while acting, in world units per second.
    pub move_speed: f32,

    /// Pause between arriving at the target and striking, in seconds.
    pub post_arrival_delay: f32,
}

impl BattleConfig {
    pub const DEFAULT_TURN_THRESHOLD: f64 = 1000.0;
    pub const DEFAULT_QUEUE_LENGTH: usize = 8;
    pub const DEFAULT_DUAL_STATE_TURNS: u32 = 1;
    pub const DEFAULT_MAX_CHARGE: f32 = 100.0;
    pub const DEFAULT_ECHO_RADIUS: f32 = 2.0;
    pub const DEFAULT_APPROACH_DISTANCE: f32 = 2.0;
    pub const DEFAULT_RETURN_TOLERANCE: f32 = 0.01;
    pub const DEFAULT_MOVE_SPEED: f32 = 20.0;
    pub const DEFAULT_POST_ARRIVAL_DELAY: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            turn_threshold: Self::DEFAULT_TURN_THRESHOLD,
            queue_length: Self::DEFAULT_QUEUE_LENGTH,
            dual_state_turns: Self::DEFAULT_DUAL_STATE_TURNS,
            max_charge: Self::DEFAULT_MAX_CHARGE,
            echo_radius: Self::DEFAULT_ECHO_RADIUS,
            approach_distance: Self::DEFAULT_APPROACH_DISTANCE,
            return_tolerance: Self::DEFAULT_RETURN_TOLERANCE,
            move_speed: Self::DEFAULT_MOVE_SPEED,
            post_arrival_delay: Self::DEFAULT_POST_ARRIVAL_DELAY,
        }
    }

    pub fn with_turn_threshold(mut self, turn_threshold: f64) -> Self {
        self.turn_threshold = turn_threshold;
        self
    }

    pub fn with_queue_length(mut self, queue_length: usize) -> Self {
        self.queue_length = queue_length;
        self
    }

    /// Checks that the values can drive a battle.
    ///
    /// Returns a static description of the first offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.turn_threshold.is_finite() && self.turn_threshold > 0.0) {
            return Err("turn_threshold must be a positive finite number");
        }
        if self.queue_length == 0 {
            return Err("queue_length must be at least 1");
        }
        if !(self.max_charge.is_finite() && self.max_charge > 0.0) {
            return Err("max_charge must be a positive finite number");
        }
        if !(self.move_speed.is_finite() && self.move_speed > 0.0) {
            return Err("move_speed must be a positive finite number");
        }
        if self.echo_radius < 0.0 || self.approach_distance < 0.0 || self.return_tolerance < 0.0 {
            return Err("distances must not be negative");
        }
        if self.post_arrival_delay < 0.0 {
            return Err("post_arrival_delay must not be negative");
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

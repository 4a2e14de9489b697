use core::fmt;

/// Unique identifier for a combatant within one battle.
///
/// Identifiers are dense indices into the battle's combatant records, assigned
/// in roster order (heroes first, then enemies). Records of dead combatants
/// are retained, so an identifier stays valid for the whole battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl CombatantId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Team {
    Hero,
    Enemy,
}

impl Team {
    pub const fn as_str(self) -> &'static str {
        match self {
            Team::Hero => "hero",
            Team::Enemy => "enemy",
        }
    }

    /// Returns the team this team fights against.
    pub const fn opponent(self) -> Self {
        match self {
            Team::Hero => Team::Enemy,
            Team::Enemy => Team::Hero,
        }
    }
}

/// Continuous 2-D position on the battlefield, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves toward `target` by at most `max_delta`, never overshooting.
    pub fn move_towards(self, target: Position, max_delta: f32) -> Position {
        let distance = self.distance(target);
        if distance <= max_delta || distance == 0.0 {
            return target;
        }
        let t = max_delta / distance;
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

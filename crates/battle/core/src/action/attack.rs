use crate::state::ElementTokens;

/// Immutable template for a usable move.
///
/// Attacks are shared read-only between combatants (`Arc<Attack>`); nothing
/// in a battle mutates them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attack {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Tokens granted to the target's elemental ledger.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tokens: ElementTokens,
    /// Flat damage added to the attacker's current attack stat.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: f32,
    /// Added to the attacker's charge meter when the attack resolves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub charge: f32,
    /// Marks the attack that grants one bonus dual-state turn per activation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extending: bool,
}

impl Attack {
    pub fn new(name: impl Into<String>, damage: f32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tokens: ElementTokens::NONE,
            damage,
            charge: 0.0,
            extending: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tokens(mut self, tokens: ElementTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_charge(mut self, charge: f32) -> Self {
        self.charge = charge;
        self
    }

    pub fn extending(mut self) -> Self {
        self.extending = true;
        self
    }
}

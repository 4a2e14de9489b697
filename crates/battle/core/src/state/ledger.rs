//! Elemental token accounting.
//!
//! Attacks grant tokens of four elements to their target. The ledger only
//! accumulates; later systems read it, nothing in this crate spends it.

use core::ops::AddAssign;

/// The four token elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Sky,
}

/// Counts of tokens per element.
///
/// Used both as the per-combatant ledger and as the grant carried by an
/// [`Attack`](crate::action::Attack).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElementTokens {
    pub fire: u32,
    pub water: u32,
    pub earth: u32,
    pub sky: u32,
}

impl ElementTokens {
    pub const NONE: Self = Self {
        fire: 0,
        water: 0,
        earth: 0,
        sky: 0,
    };

    pub const fn new(fire: u32, water: u32, earth: u32, sky: u32) -> Self {
        Self {
            fire,
            water,
            earth,
            sky,
        }
    }

    pub const fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Sky => self.sky,
        }
    }

    pub fn total(&self) -> u32 {
        self.fire
            .saturating_add(self.water)
            .saturating_add(self.earth)
            .saturating_add(self.sky)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Adds every counter of `grant` to this ledger.
    pub fn grant(&mut self, grant: &ElementTokens) {
        self.fire = self.fire.saturating_add(grant.fire);
        self.water = self.water.saturating_add(grant.water);
        self.earth = self.earth.saturating_add(grant.earth);
        self.sky = self.sky.saturating_add(grant.sky);
    }
}

impl AddAssign<&ElementTokens> for ElementTokens {
    fn add_assign(&mut self, rhs: &ElementTokens) {
        self.grant(rhs);
    }
}

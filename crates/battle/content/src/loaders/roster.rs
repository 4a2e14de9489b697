//! Roster loader.
//!
//! A roster file declares the attack catalog once and lets every combatant
//! reference attacks by name:
//!
//! ```ron
//! (
//!     attacks: [(name: "Slash", damage: 5.0, charge: 20.0)],
//!     heroes: [(name: "Knight", max_hp: 60.0, attack: 8.0, defense: 2.0, speed: 30.0, attacks: ["Slash"])],
//!     enemies: [(name: "Orc", max_hp: 50.0, attack: 7.0, defense: 1.0, speed: 35.0, attacks: ["Slash"])],
//! )
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use battle_core::{Attack, CombatStats, CombatantSpec, Position, SelectionStrategy};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// On-disk roster layout.
#[derive(Clone, Debug, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub attacks: Vec<Attack>,
    pub heroes: Vec<CombatantTemplate>,
    pub enemies: Vec<CombatantTemplate>,
}

/// One combatant as written in a roster file.
#[derive(Clone, Debug, Deserialize)]
pub struct CombatantTemplate {
    pub name: String,
    pub max_hp: f32,
    /// Starting HP; full health when omitted.
    #[serde(default)]
    pub hp: Option<f32>,
    pub attack: f32,
    pub defense: f32,
    pub speed: f64,
    #[serde(default)]
    pub charge: f32,
    #[serde(default)]
    pub initiative: f64,
    #[serde(default)]
    pub position: Position,
    /// Attack names, resolved against the roster's catalog.
    pub attacks: Vec<String>,
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
}

/// Roster ready to hand to a battle.
#[derive(Clone, Debug)]
pub struct LoadedRoster {
    pub attacks: Vec<Arc<Attack>>,
    pub heroes: Vec<CombatantSpec>,
    pub enemies: Vec<CombatantSpec>,
}

/// Loader for hero/enemy rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load a roster from a RON file.
    pub fn load(path: &Path) -> LoadResult<LoadedRoster> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a roster from RON text and resolve attack references.
    pub fn parse(content: &str) -> LoadResult<LoadedRoster> {
        let raw: RosterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        let mut catalog: HashMap<String, Arc<Attack>> = HashMap::new();
        let mut attacks = Vec::with_capacity(raw.attacks.len());
        for attack in raw.attacks {
            let attack = Arc::new(attack);
            if catalog
                .insert(attack.name.clone(), attack.clone())
                .is_some()
            {
                anyhow::bail!("Duplicate attack '{}' in roster catalog", attack.name);
            }
            attacks.push(attack);
        }

        let heroes = raw
            .heroes
            .into_iter()
            .map(|template| resolve(template, &catalog))
            .collect::<LoadResult<Vec<_>>>()?;
        let enemies = raw
            .enemies
            .into_iter()
            .map(|template| resolve(template, &catalog))
            .collect::<LoadResult<Vec<_>>>()?;

        Ok(LoadedRoster {
            attacks,
            heroes,
            enemies,
        })
    }
}

fn resolve(
    template: CombatantTemplate,
    catalog: &HashMap<String, Arc<Attack>>,
) -> LoadResult<CombatantSpec> {
    let attacks = template
        .attacks
        .iter()
        .map(|name| {
            catalog.get(name).cloned().ok_or_else(|| {
                anyhow::anyhow!(
                    "Combatant '{}' references unknown attack '{}'",
                    template.name,
                    name
                )
            })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    let mut stats = CombatStats::new(
        template.max_hp,
        template.attack,
        template.defense,
        template.speed,
    );
    if let Some(hp) = template.hp {
        stats.current_hp = hp;
    }

    let mut spec = CombatantSpec::new(template.name, stats, attacks)
        .at(template.position)
        .with_charge(template.charge)
        .with_initiative(template.initiative);
    if let Some(strategy) = template.strategy {
        spec = spec.with_strategy(strategy);
    }
    Ok(spec)
}

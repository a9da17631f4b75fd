//! Roster files - which units from the catalog fight on each side

use crate::SimError;
use battle_core::config::{load_toml, parse_toml};
use battle_core::{Item, Party, UnitCatalog};
use serde::Deserialize;
use std::path::Path;

const DEMO_ROSTERS: &str = include_str!("../config/rosters.toml");

/// Both sides of an engagement
#[derive(Debug, Clone, Deserialize)]
pub struct RostersConfig {
    pub attackers: PartyConfig,
    pub defenders: PartyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyConfig {
    /// Index into `units`
    #[serde(default)]
    pub leader: Option<usize>,
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub inventory: Vec<Item>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitEntry {
    pub unit_type: String,
    pub slot: usize,
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

impl RostersConfig {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        Ok(load_toml(path)?)
    }

    /// The bundled demo engagement
    pub fn demo() -> Result<Self, SimError> {
        Ok(parse_toml(DEMO_ROSTERS)?)
    }
}

impl PartyConfig {
    /// Spawn every unit from the catalog
    pub fn build(&self, catalog: &UnitCatalog) -> Result<Party, SimError> {
        let units = self
            .units
            .iter()
            .map(|entry| catalog.spawn(&entry.unit_type, entry.level, entry.slot))
            .collect::<Result<Vec<_>, _>>()?;

        let mut party = Party::new(units);
        party.leader = self.leader;
        party.inventory = self.inventory.clone();
        Ok(party)
    }
}

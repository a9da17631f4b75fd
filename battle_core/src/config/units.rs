//! Unit catalog loading

use super::ConfigError;
use crate::roster::{UnitCatalog, UnitType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for unit type definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(rename = "units")]
    pub units: Vec<UnitType>,
}

/// Load a unit catalog from a TOML file
pub fn load_unit_catalog(path: &Path) -> Result<UnitCatalog, ConfigError> {
    let config: UnitsConfig = super::load_toml(path)?;
    UnitCatalog::from_types(config.units)
}

/// Load a unit catalog from a TOML string
pub fn parse_unit_catalog(content: &str) -> Result<UnitCatalog, ConfigError> {
    let config: UnitsConfig = super::parse_toml(content)?;
    UnitCatalog::from_types(config.units)
}

/// The catalog bundled with the crate
pub fn default_catalog() -> Result<UnitCatalog, ConfigError> {
    parse_unit_catalog(include_str!("../../config/units.toml"))
}

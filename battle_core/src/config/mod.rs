//! Configuration loading from TOML files

mod constants;
mod units;

pub use constants::{
    ArmourConstants, BattleConstants, DefendConstants, LevelingConstants, RosterConstants,
    ShieldConstants, StatusConstants, TransformationConstants,
};
pub use units::{default_catalog, load_unit_catalog, parse_unit_catalog};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Deserialize a TOML string
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load battle constants from a TOML file and validate them
pub fn load_constants(path: &Path) -> Result<BattleConstants, ConfigError> {
    let constants: BattleConstants = load_toml(path)?;
    constants.validate()?;
    Ok(constants)
}

use battle_core::{BattleError, ConfigError, ValidationError};
use thiserror::Error;

/// Anything that stops a simulation run
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid roster: {0}")]
    Validation(#[from] ValidationError),
    #[error("Battle failed: {0}")]
    Battle(#[from] BattleError),
    #[error("Failed to write result: {0}")]
    Output(#[from] serde_json::Error),
    #[error("Failed to write result: {0}")]
    Io(#[from] std::io::Error),
}

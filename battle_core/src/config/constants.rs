//! Battle rule constants

use super::ConfigError;
use crate::types::AttackSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunable battle constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleConstants {
    #[serde(default)]
    pub roster: RosterConstants,
    #[serde(default)]
    pub statuses: StatusConstants,
    #[serde(default)]
    pub defend: DefendConstants,
    #[serde(default)]
    pub armour: ArmourConstants,
    #[serde(default)]
    pub shields: ShieldConstants,
    #[serde(default)]
    pub transformation: TransformationConstants,
    #[serde(default)]
    pub leveling: LevelingConstants,
}

impl BattleConstants {
    /// Reject values the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "roster.capacity must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.defend.damage_reduction) {
            return Err(ConfigError::ValidationError(
                "defend.damage_reduction must be within 0..=1".to_string(),
            ));
        }
        if self.armour.max > 100 {
            return Err(ConfigError::ValidationError(
                "armour.max must not exceed 100".to_string(),
            ));
        }
        let reductions = std::iter::once(&self.shields.default_reduction)
            .chain(self.shields.per_source.values());
        for reduction in reductions {
            if !(0.0..=1.0).contains(reduction) {
                return Err(ConfigError::ValidationError(format!(
                    "shield reduction {reduction} must be within 0..=1"
                )));
            }
        }
        if self.leveling.power_per_level < 0.0 {
            return Err(ConfigError::ValidationError(
                "leveling.power_per_level must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConstants {
    /// Slots per party; large units take two
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RosterConstants {
    fn default() -> Self {
        RosterConstants {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    6
}

/// Durations are counted in the affected unit's turns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConstants {
    #[serde(default = "default_poison_turns")]
    pub poison_turns: u32,
    #[serde(default = "default_fear_turns")]
    pub fear_turns: u32,
    #[serde(default = "default_paralysis_turns")]
    pub paralysis_turns: u32,
    #[serde(default = "default_level_drain_turns")]
    pub level_drain_turns: u32,
    /// Levels removed by a single decrease-level hit
    #[serde(default = "default_level_drain_amount")]
    pub level_drain_amount: u32,
}

impl Default for StatusConstants {
    fn default() -> Self {
        StatusConstants {
            poison_turns: default_poison_turns(),
            fear_turns: default_fear_turns(),
            paralysis_turns: default_paralysis_turns(),
            level_drain_turns: default_level_drain_turns(),
            level_drain_amount: default_level_drain_amount(),
        }
    }
}

fn default_poison_turns() -> u32 {
    3
}
fn default_fear_turns() -> u32 {
    1
}
fn default_paralysis_turns() -> u32 {
    1
}
fn default_level_drain_turns() -> u32 {
    3
}
fn default_level_drain_amount() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefendConstants {
    /// Fraction of incoming damage removed while defending
    #[serde(default = "default_damage_reduction")]
    pub damage_reduction: f64,
}

impl Default for DefendConstants {
    fn default() -> Self {
        DefendConstants {
            damage_reduction: default_damage_reduction(),
        }
    }
}

fn default_damage_reduction() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmourConstants {
    /// Armour is a damage percentage, capped here
    #[serde(default = "default_max_armour")]
    pub max: u32,
}

impl Default for ArmourConstants {
    fn default() -> Self {
        ArmourConstants {
            max: default_max_armour(),
        }
    }
}

fn default_max_armour() -> u32 {
    90
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConstants {
    /// Fraction removed by a shield with no per-source override
    #[serde(default = "default_shield_reduction")]
    pub default_reduction: f64,
    #[serde(default)]
    pub per_source: HashMap<AttackSource, f64>,
}

impl Default for ShieldConstants {
    fn default() -> Self {
        ShieldConstants {
            default_reduction: default_shield_reduction(),
            per_source: HashMap::new(),
        }
    }
}

impl ShieldConstants {
    /// Reduction applied by a shield against the given source
    pub fn reduction_for(&self, source: AttackSource) -> f64 {
        self.per_source
            .get(&source)
            .copied()
            .unwrap_or(self.default_reduction)
            .clamp(0.0, 1.0)
    }
}

fn default_shield_reduction() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConstants {
    /// Unit type used when a transforming attack names none
    #[serde(default = "default_polymorph")]
    pub default_into: String,
    /// `None` makes transformations permanent
    #[serde(default = "default_transformation_turns")]
    pub turns: Option<u32>,
}

impl Default for TransformationConstants {
    fn default() -> Self {
        TransformationConstants {
            default_into: default_polymorph(),
            turns: default_transformation_turns(),
        }
    }
}

fn default_polymorph() -> String {
    "imp".to_string()
}
fn default_transformation_turns() -> Option<u32> {
    Some(2)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelingConstants {
    /// Extra effect power per level above 1, as a fraction of base power
    #[serde(default = "default_power_per_level")]
    pub power_per_level: f64,
}

impl Default for LevelingConstants {
    fn default() -> Self {
        LevelingConstants {
            power_per_level: default_power_per_level(),
        }
    }
}

fn default_power_per_level() -> f64 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = BattleConstants::default();
        assert_eq!(constants.roster.capacity, 6);
        assert_eq!(constants.armour.max, 90);
        assert!((constants.defend.damage_reduction - 0.5).abs() < f64::EPSILON);
        assert_eq!(constants.transformation.turns, Some(2));
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_constants() {
        let toml = r#"
[roster]
capacity = 8

[shields]
default_reduction = 0.25

[shields.per_source]
fire = 0.75
"#;

        let constants: BattleConstants = toml::from_str(toml).unwrap();
        assert_eq!(constants.roster.capacity, 8);
        assert_eq!(constants.statuses.poison_turns, 3);
        assert!((constants.shields.reduction_for(AttackSource::Fire) - 0.75).abs() < f64::EPSILON);
        assert!((constants.shields.reduction_for(AttackSource::Mind) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_permanent_transformation() {
        let toml = r#"
[transformation]
default_into = "frog"
"#;
        let mut constants: BattleConstants = toml::from_str(toml).unwrap();
        assert_eq!(constants.transformation.default_into, "frog");
        constants.transformation.turns = None;
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut constants = BattleConstants::default();
        constants.roster.capacity = 0;
        assert!(constants.validate().is_err());

        let mut constants = BattleConstants::default();
        constants.shields.per_source.insert(AttackSource::Air, 1.5);
        assert!(constants.validate().is_err());
    }
}

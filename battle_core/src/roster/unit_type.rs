//! UnitType - immutable catalog entries

use crate::config::ConfigError;
use crate::types::{AttackEffect, AttackSource, AttackTargeting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One attack a unit type can perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackInfo {
    pub name: String,
    pub source: AttackSource,
    pub effect: AttackEffect,
    /// Hit probability in percent (0-100)
    pub accuracy: u32,
    /// Base magnitude for numeric effects (damage, healing, poison, armour loss)
    #[serde(default)]
    pub power: u32,
    /// Unit type summoned or polymorphed into by summon/transformation effects
    #[serde(default)]
    pub unit_type: Option<String>,
}

impl AttackInfo {
    pub fn new(name: &str, source: AttackSource, effect: AttackEffect, accuracy: u32) -> Self {
        AttackInfo {
            name: name.to_string(),
            source,
            effect,
            accuracy,
            power: 0,
            unit_type: None,
        }
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    pub fn with_unit_type(mut self, unit_type: &str) -> Self {
        self.unit_type = Some(unit_type.to_string());
        self
    }

    /// Effect power at the given level
    pub fn power_at_level(&self, level: u32, power_per_level: f64) -> u32 {
        let bonus = 1.0 + level.saturating_sub(1) as f64 * power_per_level;
        (self.power as f64 * bonus).round() as u32
    }
}

/// Static definition of a kind of unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Occupies two roster slots
    #[serde(default)]
    pub large: bool,
    pub base_health: u32,
    /// Damage reduction in percent
    #[serde(default)]
    pub armour: u32,
    /// Sources whose attacks have no effect on this unit
    #[serde(default)]
    pub immunities: BTreeSet<AttackSource>,
    /// Effects this unit ignores regardless of source
    #[serde(default)]
    pub effect_immunities: BTreeSet<AttackEffect>,
    /// Sources whose numeric effects are reduced
    #[serde(default)]
    pub shields: BTreeSet<AttackSource>,
    pub base_attack1: AttackInfo,
    /// Only attempted after `base_attack1` hits
    #[serde(default)]
    pub base_attack2: Option<AttackInfo>,
    /// Actions per turn (1 or 2)
    #[serde(default = "default_actions")]
    pub actions: u32,
    #[serde(default)]
    pub attack_target: AttackTargeting,
    /// Lower values act earlier in a round
    pub initiative: u32,
    #[serde(default)]
    pub base_movement: u32,
    /// Experience granted for defeating this unit, indexed by level - 1
    #[serde(default)]
    pub base_experience: Vec<u32>,
}

fn default_actions() -> u32 {
    1
}

impl UnitType {
    /// Roster slots taken by this unit
    pub fn slot_size(&self) -> usize {
        if self.large {
            2
        } else {
            1
        }
    }

    /// Experience for defeating a unit of this type at `level`
    pub fn experience_for_level(&self, level: u32) -> u32 {
        let index = level.saturating_sub(1) as usize;
        self.base_experience
            .get(index)
            .or_else(|| self.base_experience.last())
            .copied()
            .unwrap_or(0)
    }

    pub fn is_immune_to(&self, source: AttackSource, effect: AttackEffect) -> bool {
        self.immunities.contains(&source) || self.effect_immunities.contains(&effect)
    }

    pub fn is_shielded_against(&self, source: AttackSource) -> bool {
        self.shields.contains(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_health == 0 {
            return Err(ConfigError::ValidationError(format!(
                "unit type '{}' must have positive base_health",
                self.id
            )));
        }
        if !(1..=2).contains(&self.actions) {
            return Err(ConfigError::ValidationError(format!(
                "unit type '{}' must have 1 or 2 actions, got {}",
                self.id, self.actions
            )));
        }
        if let Some(second) = &self.base_attack2 {
            if self.base_attack1.effect.is_targetless() {
                return Err(ConfigError::ValidationError(format!(
                    "unit type '{}' cannot follow a targetless attack with a second one",
                    self.id
                )));
            }
            if second.effect.is_friendly() != self.base_attack1.effect.is_friendly() {
                return Err(ConfigError::ValidationError(format!(
                    "unit type '{}' mixes a friendly and a hostile attack",
                    self.id
                )));
            }
            if second.effect == AttackEffect::Summon {
                return Err(ConfigError::ValidationError(format!(
                    "unit type '{}' cannot summon with its second attack",
                    self.id
                )));
            }
        }
        let attacks = std::iter::once(&self.base_attack1).chain(self.base_attack2.as_ref());
        for attack in attacks {
            if attack.effect == AttackEffect::Summon && attack.unit_type.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "summoning attack '{}' of '{}' names no unit type",
                    attack.name, self.id
                )));
            }
            if attack.accuracy > 100 {
                return Err(ConfigError::ValidationError(format!(
                    "attack '{}' of '{}' has accuracy {} above 100",
                    attack.name, self.id, attack.accuracy
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A plain one-action melee type
    pub fn soldier(id: &str, initiative: u32, health: u32) -> UnitType {
        UnitType {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            large: false,
            base_health: health,
            armour: 0,
            immunities: BTreeSet::new(),
            effect_immunities: BTreeSet::new(),
            shields: BTreeSet::new(),
            base_attack1: AttackInfo::new("Strike", AttackSource::Weapon, AttackEffect::Damage, 100)
                .with_power(25),
            base_attack2: None,
            actions: 1,
            attack_target: AttackTargeting::Nearest,
            initiative,
            base_movement: 20,
            base_experience: vec![10, 20, 30],
        }
    }
}

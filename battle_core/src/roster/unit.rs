//! UnitInstance - a unit's mutable battle state

use super::UnitType;
use crate::status::{Status, StatusKind, StatusSet};
use serde::{Deserialize, Serialize};

/// A unit taking part in a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInstance {
    /// The type this unit was recruited as
    pub base: UnitType,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u32,
    pub health: u32,
    pub max_health: u32,
    pub armour: u32,
    /// Armour removed by destroy-armour hits; survives transformations
    #[serde(default)]
    pub armour_destroyed: u32,
    /// Position within the party formation
    pub slot: usize,
    #[serde(default)]
    pub statuses: StatusSet,
    #[serde(default)]
    pub actions_remaining: u32,
}

fn default_level() -> u32 {
    1
}

impl UnitInstance {
    /// Create a fresh unit at full health
    pub fn new(unit_type: &UnitType, level: u32, slot: usize) -> Self {
        UnitInstance {
            base: unit_type.clone(),
            level: level.max(1),
            experience: 0,
            health: unit_type.base_health,
            max_health: unit_type.base_health,
            armour: unit_type.armour,
            armour_destroyed: 0,
            slot,
            statuses: StatusSet::new(),
            actions_remaining: 0,
        }
    }

    /// The type this unit currently acts as
    pub fn effective_type(&self) -> &UnitType {
        self.statuses.transformed_into().unwrap_or(&self.base)
    }

    pub fn effective_level(&self) -> u32 {
        self.level
            .saturating_sub(self.statuses.levels_drained())
            .max(1)
    }

    pub fn initiative(&self) -> u32 {
        self.effective_type().initiative
    }

    /// Formation footprint; a transformation does not move the unit
    pub fn slot_size(&self) -> usize {
        self.base.slot_size()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_feared(&self) -> bool {
        self.statuses.has(StatusKind::Feared)
    }

    /// Subtract health, floored at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Add health, capped at max health. Dead units are not healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.max_health.saturating_sub(self.health));
        self.health += healed;
        healed
    }

    /// Permanently reduce armour toward zero. Returns the armour removed.
    pub fn destroy_armour(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.armour);
        self.armour -= removed;
        self.armour_destroyed += removed;
        removed
    }

    /// Start acting as `into`, rescaling health and armour to the new baseline
    pub fn transform(&mut self, into: UnitType, turns: Option<u32>) {
        let max_health = into.base_health;
        let armour = into.armour;
        self.statuses.apply(Status::Transformed {
            into: Box::new(into),
            turns,
        });
        self.rebase(max_health, armour);
    }

    /// Return to the base type after a transformation ends
    pub fn revert_transformation(&mut self) {
        let max_health = self.base.base_health;
        let armour = self.base.armour;
        self.rebase(max_health, armour);
    }

    fn rebase(&mut self, max_health: u32, armour: u32) {
        if self.max_health > 0 && self.health > 0 {
            let ratio = self.health as f64 / self.max_health as f64;
            self.health = ((max_health as f64 * ratio).round() as u32).clamp(1, max_health);
        } else {
            self.health = 0;
        }
        self.max_health = max_health;
        self.armour = armour.saturating_sub(self.armour_destroyed);
    }

    /// Reset the per-turn action budget
    pub fn refill_actions(&mut self) {
        self.actions_remaining = self.effective_type().actions;
    }
}

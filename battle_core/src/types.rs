//! Core enumerations shared by every battle component

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an attack's power comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackSource {
    Weapon,
    Air,
    Earth,
    Fire,
    Water,
    Life,
    Death,
    Mind,
}

/// What an attack does to its target on a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackEffect {
    Damage,
    Poison,
    Paralysis,
    Transformation,
    DestroyArmour,
    Summon,
    Fear,
    DecreaseLevel,
    Healing,
    Cure,
}

impl AttackEffect {
    /// Effects aimed at the actor's own party
    pub fn is_friendly(self) -> bool {
        matches!(self, AttackEffect::Healing | AttackEffect::Cure)
    }

    /// Effects that pick no target at all
    pub fn is_targetless(self) -> bool {
        matches!(self, AttackEffect::Summon)
    }

    /// Effects whose magnitude a shield can reduce
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            AttackEffect::Damage | AttackEffect::Poison | AttackEffect::DestroyArmour
        )
    }
}

/// Which units an attack may be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTargeting {
    /// Closest living unit by slot distance
    #[default]
    Nearest,
    /// A single unit chosen by the caller
    Anyone,
    /// Every living unit at once
    Everyone,
}

/// Inventory item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Elixir,
    Sphere,
    Talisman,
    Banner,
    Book,
    Boots,
    Artifact,
    Jewelry,
    Rod,
    Scroll,
}

impl ItemType {
    /// Whether using the item removes it from the inventory
    pub fn is_consumable(self) -> bool {
        matches!(
            self,
            ItemType::Elixir | ItemType::Sphere | ItemType::Scroll
        )
    }
}

/// The two sides of an engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyId {
    Attackers,
    Defenders,
}

impl PartyId {
    /// The opposing side
    pub fn opponent(self) -> PartyId {
        match self {
            PartyId::Attackers => PartyId::Defenders,
            PartyId::Defenders => PartyId::Attackers,
        }
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyId::Attackers => write!(f, "attackers"),
            PartyId::Defenders => write!(f, "defenders"),
        }
    }
}

/// Outcome of a finished battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Party(PartyId),
    /// Both sides were wiped out in the same resolution step
    Draw,
}

/// Index of a unit in the battle's unit arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of a unit's two configured attacks was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackSlot {
    Primary,
    Secondary,
    /// An attack carried by an inventory item
    Item,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_symmetric() {
        assert_eq!(PartyId::Attackers.opponent(), PartyId::Defenders);
        assert_eq!(PartyId::Defenders.opponent().opponent(), PartyId::Defenders);
    }

    #[test]
    fn test_effect_classification() {
        assert!(AttackEffect::Healing.is_friendly());
        assert!(AttackEffect::Cure.is_friendly());
        assert!(!AttackEffect::Damage.is_friendly());
        assert!(AttackEffect::Summon.is_targetless());
        assert!(AttackEffect::Damage.is_numeric());
        assert!(!AttackEffect::Fear.is_numeric());
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&AttackSource::Death).unwrap();
        assert_eq!(json, "\"death\"");
        let effect: AttackEffect = serde_json::from_str("\"destroy_armour\"").unwrap();
        assert_eq!(effect, AttackEffect::DestroyArmour);
    }
}

//! Party - the caller-supplied roster for one side

use super::{AttackInfo, UnitInstance};
use crate::types::{AttackTargeting, ItemType, PartyId, UnitId};
use serde::{Deserialize, Serialize};

/// An inventory item; only items carrying an attack can be used in battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub attack: Option<AttackInfo>,
    #[serde(default)]
    pub targeting: AttackTargeting,
}

/// One side's units as handed to [`crate::Battle::new`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub units: Vec<UnitInstance>,
    /// Index into `units` of the party leader
    #[serde(default)]
    pub leader: Option<usize>,
    #[serde(default)]
    pub inventory: Vec<Item>,
}

impl Party {
    pub fn new(units: Vec<UnitInstance>) -> Self {
        Party {
            units,
            leader: None,
            inventory: Vec::new(),
        }
    }

    pub fn with_leader(mut self, index: usize) -> Self {
        self.leader = Some(index);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }
}

/// A party's membership inside a battle, referring to units by arena index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRoster {
    pub id: PartyId,
    /// Units still on the field, in roster order
    pub members: Vec<UnitId>,
    pub leader: Option<UnitId>,
    pub inventory: Vec<Item>,
    /// Units killed during the battle
    pub fallen: Vec<UnitId>,
    /// Units that left the battle by fleeing
    pub fled: Vec<UnitId>,
}

impl PartyRoster {
    pub(crate) fn new(id: PartyId) -> Self {
        PartyRoster {
            id,
            members: Vec::new(),
            leader: None,
            inventory: Vec::new(),
            fallen: Vec::new(),
            fled: Vec::new(),
        }
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.members.contains(&unit)
    }

    pub fn is_leader(&self, unit: UnitId) -> bool {
        self.leader == Some(unit)
    }

    /// Position of an item in the inventory
    pub(crate) fn find_item(&self, item_id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == item_id)
    }
}

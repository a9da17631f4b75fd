//! Roster & type catalog - unit definitions and the live parties of a battle
//!
//! Every unit in a battle lives in a single arena owned by [`Roster`]; parties
//! and the turn queue refer to units by [`UnitId`] only.

mod catalog;
mod party;
mod unit;
pub(crate) mod unit_type;

pub use catalog::UnitCatalog;
pub use party::{Item, Party, PartyRoster};
pub use unit::UnitInstance;
pub use unit_type::{AttackInfo, UnitType};

use crate::error::ValidationError;
use crate::types::{PartyId, UnitId};
use serde::{Deserialize, Serialize};

/// Arena of units plus both parties' membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    units: Vec<UnitInstance>,
    attackers: PartyRoster,
    defenders: PartyRoster,
    capacity: usize,
}

impl Roster {
    /// Move both parties into the arena, validating slots and leaders
    pub fn new(attackers: Party, defenders: Party, capacity: usize) -> Result<Self, ValidationError> {
        let mut roster = Roster {
            units: Vec::new(),
            attackers: PartyRoster::new(PartyId::Attackers),
            defenders: PartyRoster::new(PartyId::Defenders),
            capacity,
        };
        roster.add_party(PartyId::Attackers, attackers)?;
        roster.add_party(PartyId::Defenders, defenders)?;
        Ok(roster)
    }

    fn add_party(&mut self, id: PartyId, party: Party) -> Result<(), ValidationError> {
        let required: usize = party.units.iter().map(UnitInstance::slot_size).sum();
        if required > self.capacity {
            return Err(ValidationError::RosterOverCapacity {
                party: id,
                required,
                capacity: self.capacity,
            });
        }

        let mut occupied = vec![false; self.capacity];
        for unit in &party.units {
            check_unit(id, unit)?;
            let end = unit.slot + unit.slot_size();
            if end > self.capacity {
                return Err(ValidationError::RosterOverCapacity {
                    party: id,
                    required: end,
                    capacity: self.capacity,
                });
            }
            for slot in unit.slot..end {
                if occupied[slot] {
                    return Err(ValidationError::SlotConflict { party: id, slot });
                }
                occupied[slot] = true;
            }
        }

        if let Some(index) = party.leader {
            if index >= party.units.len() {
                return Err(ValidationError::InvalidLeader { party: id, index });
            }
        }

        let first = self.units.len();
        let roster = self.party_mut(id);
        roster.leader = party.leader.map(|index| UnitId(first + index));
        roster.inventory = party.inventory;

        for unit in party.units {
            let alive = unit.is_alive();
            let unit_id = UnitId(self.units.len());
            self.units.push(unit);
            let roster = self.party_mut(id);
            if alive {
                roster.members.push(unit_id);
            } else {
                roster.fallen.push(unit_id);
            }
        }
        Ok(())
    }

    pub fn unit(&self, id: UnitId) -> Result<&UnitInstance, ValidationError> {
        self.units.get(id.0).ok_or(ValidationError::UnknownUnit(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut UnitInstance, ValidationError> {
        self.units.get_mut(id.0).ok_or(ValidationError::UnknownUnit(id))
    }

    /// All units ever part of the battle, indexed by [`UnitId`]
    pub fn units(&self) -> &[UnitInstance] {
        &self.units
    }

    pub fn party(&self, id: PartyId) -> &PartyRoster {
        match id {
            PartyId::Attackers => &self.attackers,
            PartyId::Defenders => &self.defenders,
        }
    }

    pub fn party_mut(&mut self, id: PartyId) -> &mut PartyRoster {
        match id {
            PartyId::Attackers => &mut self.attackers,
            PartyId::Defenders => &mut self.defenders,
        }
    }

    /// The party a unit currently stands in
    pub fn party_of(&self, unit: UnitId) -> Option<PartyId> {
        [PartyId::Attackers, PartyId::Defenders]
            .into_iter()
            .find(|&id| self.party(id).contains(unit))
    }

    /// Living members of a party, in roster order
    pub fn living(&self, party: PartyId) -> Vec<UnitId> {
        self.party(party)
            .members
            .iter()
            .copied()
            .filter(|id| self.units.get(id.0).is_some_and(UnitInstance::is_alive))
            .collect()
    }

    pub fn living_count(&self, party: PartyId) -> usize {
        self.living(party).len()
    }

    /// Living units of both parties: attackers first, each in roster order
    pub fn roster_order(&self) -> Vec<UnitId> {
        let mut order = self.living(PartyId::Attackers);
        order.extend(self.living(PartyId::Defenders));
        order
    }

    /// Move a unit from its party's members to the fallen list
    pub fn mark_dead(&mut self, unit: UnitId) -> bool {
        self.remove_member(unit, |party| &mut party.fallen)
    }

    /// Move a unit from its party's members to the fled list
    pub fn mark_fled(&mut self, unit: UnitId) -> bool {
        self.remove_member(unit, |party| &mut party.fled)
    }

    fn remove_member(
        &mut self,
        unit: UnitId,
        destination: impl Fn(&mut PartyRoster) -> &mut Vec<UnitId>,
    ) -> bool {
        let Some(party_id) = self.party_of(unit) else {
            return false;
        };
        let party = self.party_mut(party_id);
        party.members.retain(|&member| member != unit);
        destination(party).push(unit);
        true
    }

    /// First slot where a unit of `size` fits among the party's living members
    pub fn free_slot(&self, party: PartyId, size: usize) -> Option<usize> {
        let mut occupied = vec![false; self.capacity];
        for id in self.living(party) {
            let unit = &self.units[id.0];
            let end = (unit.slot + unit.slot_size()).min(self.capacity);
            for slot in unit.slot..end {
                occupied[slot] = true;
            }
        }
        (0..self.capacity).find(|&start| {
            start + size <= self.capacity && !occupied[start..start + size].contains(&true)
        })
    }

    /// Add a new unit to a party's members
    pub fn add_unit(&mut self, party: PartyId, unit: UnitInstance) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(unit);
        self.party_mut(party).members.push(id);
        id
    }
}

/// Reject caller-built units whose type or health the engine cannot work with
fn check_unit(party: PartyId, unit: &UnitInstance) -> Result<(), ValidationError> {
    for unit_type in [&unit.base, unit.effective_type()] {
        unit_type
            .validate()
            .map_err(|err| ValidationError::InvalidUnitType {
                unit_type: unit_type.id.clone(),
                reason: err.to_string(),
            })?;
    }
    if unit.health > unit.max_health {
        return Err(ValidationError::HealthAboveMaximum {
            party,
            slot: unit.slot,
            health: unit.health,
            max_health: unit.max_health,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::unit_type::fixtures::soldier;
    use super::*;

    fn party_of(specs: &[(&str, usize)]) -> Party {
        Party::new(
            specs
                .iter()
                .map(|(id, slot)| UnitInstance::new(&soldier(id, 50, 100), 1, *slot))
                .collect(),
        )
    }

    #[test]
    fn test_arena_assigns_ids_in_roster_order() {
        let roster = Roster::new(
            party_of(&[("a1", 0), ("a2", 1)]),
            party_of(&[("d1", 0)]),
            6,
        )
        .unwrap();

        assert_eq!(roster.party(PartyId::Attackers).members, vec![UnitId(0), UnitId(1)]);
        assert_eq!(roster.party(PartyId::Defenders).members, vec![UnitId(2)]);
        assert_eq!(roster.roster_order(), vec![UnitId(0), UnitId(1), UnitId(2)]);
        assert_eq!(roster.party_of(UnitId(2)), Some(PartyId::Defenders));
    }

    #[test]
    fn test_slot_conflict_rejected() {
        let result = Roster::new(party_of(&[("a1", 2), ("a2", 2)]), Party::default(), 6);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::SlotConflict {
                party: PartyId::Attackers,
                slot: 2
            }
        );
    }

    #[test]
    fn test_large_unit_over_capacity() {
        let mut giant = soldier("giant", 60, 300);
        giant.large = true;
        let party = Party::new(vec![UnitInstance::new(&giant, 1, 5)]);
        assert!(matches!(
            Roster::new(party, Party::default(), 6),
            Err(ValidationError::RosterOverCapacity { .. })
        ));
    }

    #[test]
    fn test_invalid_leader() {
        let party = party_of(&[("a1", 0)]).with_leader(3);
        assert!(matches!(
            Roster::new(party, Party::default(), 6),
            Err(ValidationError::InvalidLeader { index: 3, .. })
        ));
    }

    #[test]
    fn test_health_above_maximum_rejected() {
        let mut party = party_of(&[("a1", 0)]);
        party.units[0].health = party.units[0].max_health + 50;
        assert_eq!(
            Roster::new(party, Party::default(), 6).unwrap_err(),
            ValidationError::HealthAboveMaximum {
                party: PartyId::Attackers,
                slot: 0,
                health: 150,
                max_health: 100
            }
        );
    }

    #[test]
    fn test_unit_without_actions_rejected() {
        let mut party = party_of(&[("a1", 0)]);
        party.units[0].base.actions = 0;
        assert!(matches!(
            Roster::new(Party::default(), party, 6),
            Err(ValidationError::InvalidUnitType { unit_type, .. }) if unit_type == "a1"
        ));
    }

    #[test]
    fn test_invalid_transformation_rejected() {
        let mut party = party_of(&[("a1", 0)]);
        let mut husk = soldier("husk", 10, 100);
        husk.base_health = 0;
        party.units[0].statuses.apply(crate::status::Status::Transformed {
            into: Box::new(husk),
            turns: Some(1),
        });
        assert!(matches!(
            Roster::new(party, Party::default(), 6),
            Err(ValidationError::InvalidUnitType { unit_type, .. }) if unit_type == "husk"
        ));
    }

    #[test]
    fn test_mark_dead_removes_from_living() {
        let mut roster = Roster::new(party_of(&[("a1", 0), ("a2", 1)]), Party::default(), 6).unwrap();
        roster.unit_mut(UnitId(0)).unwrap().take_damage(1000);

        assert!(roster.mark_dead(UnitId(0)));
        assert_eq!(roster.living(PartyId::Attackers), vec![UnitId(1)]);
        assert_eq!(roster.party(PartyId::Attackers).fallen, vec![UnitId(0)]);
        assert_eq!(roster.party_of(UnitId(0)), None);
        assert!(!roster.mark_dead(UnitId(0)));
    }

    #[test]
    fn test_free_slot_skips_occupied() {
        let mut roster = Roster::new(party_of(&[("a1", 0), ("a2", 1)]), Party::default(), 3).unwrap();
        assert_eq!(roster.free_slot(PartyId::Attackers, 1), Some(2));
        assert_eq!(roster.free_slot(PartyId::Attackers, 2), None);

        roster.unit_mut(UnitId(0)).unwrap().take_damage(1000);
        roster.mark_dead(UnitId(0));
        assert_eq!(roster.free_slot(PartyId::Attackers, 1), Some(0));
    }
}

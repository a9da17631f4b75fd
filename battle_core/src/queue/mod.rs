//! Turn queue scheduler
//!
//! A round's act order is every living unit of both parties sorted ascending
//! by current initiative (lower acts earlier), ties kept in roster order. An
//! optional [`QueueRandomizer`] may then permute the sorted order.
//!
//! States: `Empty -> Built -> Draining -> Exhausted -> Built (next round)`.

mod randomizer;

pub use randomizer::{IdentityOrder, QueueEntry, QueueRandomizer, ShuffleTies};

use crate::error::{InvariantViolation, ValidationError};
use crate::roster::Roster;
use crate::types::UnitId;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    /// Never built
    Empty,
    /// Built for a round, nothing popped yet
    Built,
    /// Units are acting and being popped
    Draining,
    /// Every unit has acted; rebuild before popping again
    Exhausted,
}

/// Act order for the current round, as indices into the unit arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnQueue {
    /// Full order of the round, including units that already acted
    order: Vec<UnitId>,
    /// Index of the current head in `order`
    cursor: usize,
    state: QueueState,
}

impl Default for TurnQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnQueue {
    pub fn new() -> Self {
        TurnQueue {
            order: Vec::new(),
            cursor: 0,
            state: QueueState::Empty,
        }
    }

    /// Deterministic initiative order of the roster's living units
    pub fn sorted_entries(roster: &Roster) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = roster
            .roster_order()
            .into_iter()
            .filter_map(|unit| {
                roster.unit(unit).ok().map(|instance| QueueEntry {
                    unit,
                    initiative: instance.initiative(),
                })
            })
            .collect();
        // Stable: equal initiatives keep roster order
        entries.sort_by_key(|entry| entry.initiative);
        entries
    }

    /// Build the next round's order from the roster's living units
    pub fn rebuild(
        &mut self,
        roster: &Roster,
        randomizer: &mut dyn QueueRandomizer,
    ) -> Result<(), InvariantViolation> {
        let sorted = Self::sorted_entries(roster);
        let mut expected: Vec<UnitId> = sorted.iter().map(|entry| entry.unit).collect();

        let reordered = randomizer.reorder(sorted);
        let order: Vec<UnitId> = reordered.iter().map(|entry| entry.unit).collect();

        let mut actual = order.clone();
        expected.sort_unstable();
        actual.sort_unstable();
        if expected != actual {
            return Err(InvariantViolation::QueueCorrupted);
        }

        debug!(units = order.len(), "Turn queue rebuilt");
        self.order = order;
        self.cursor = 0;
        self.state = if self.order.is_empty() {
            QueueState::Exhausted
        } else {
            QueueState::Built
        };
        Ok(())
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == QueueState::Exhausted
    }

    /// The unit whose turn it is
    pub fn head(&self) -> Option<UnitId> {
        match self.state {
            QueueState::Built | QueueState::Draining => self.order.get(self.cursor).copied(),
            QueueState::Empty | QueueState::Exhausted => None,
        }
    }

    /// Finish the head's turn. `None` means the round is over.
    pub fn pop(&mut self) -> Option<UnitId> {
        let head = self.head()?;
        self.cursor += 1;
        self.state = if self.cursor >= self.order.len() {
            QueueState::Exhausted
        } else {
            QueueState::Draining
        };
        Some(head)
    }

    /// Full order of the round, including units that already acted
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    /// Head plus every unit still waiting this round
    pub fn remaining(&self) -> &[UnitId] {
        match self.state {
            QueueState::Built | QueueState::Draining => &self.order[self.cursor..],
            QueueState::Empty | QueueState::Exhausted => &[],
        }
    }

    /// Units after the head that have not acted yet
    pub fn upcoming(&self) -> &[UnitId] {
        self.remaining().get(1..).unwrap_or(&[])
    }

    /// Position of a unit in this round's order, used as a tie-breaker
    pub fn rank(&self, unit: UnitId) -> Option<usize> {
        self.order.iter().position(|&queued| queued == unit)
    }

    /// Purge a unit from the round, e.g. after it died or fled
    pub fn remove(&mut self, unit: UnitId) {
        let Some(position) = self.rank(unit) else {
            return;
        };
        self.order.remove(position);
        if position < self.cursor {
            self.cursor -= 1;
        }
        if matches!(self.state, QueueState::Built | QueueState::Draining)
            && self.cursor >= self.order.len()
        {
            self.state = QueueState::Exhausted;
        }
    }

    /// Replace the order of the units waiting behind the head
    pub fn reorder_upcoming(&mut self, upcoming: Vec<UnitId>) -> Result<(), ValidationError> {
        let mut expected = self.upcoming().to_vec();
        let mut proposed = upcoming.clone();
        expected.sort_unstable();
        proposed.sort_unstable();
        if expected != proposed {
            return Err(ValidationError::InvalidQueueOrder);
        }
        let start = self.cursor + 1;
        self.order.splice(start.., upcoming);
        Ok(())
    }

    /// Check that every waiting unit is alive and still in a party
    pub fn verify(&self, roster: &Roster) -> Result<(), InvariantViolation> {
        for &unit in self.remaining() {
            let alive = roster.unit(unit).map(|u| u.is_alive()).unwrap_or(false);
            if !alive {
                return Err(InvariantViolation::DeadUnitInQueue(unit));
            }
            if roster.party_of(unit).is_none() {
                return Err(InvariantViolation::UnitOutsideRosters(unit));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::unit_type::fixtures::soldier;
    use crate::roster::{Party, UnitInstance};
    use proptest::prelude::*;

    fn roster_with(attackers: &[u32], defenders: &[u32]) -> Roster {
        let build = |initiatives: &[u32], prefix: &str| {
            Party::new(
                initiatives
                    .iter()
                    .enumerate()
                    .map(|(slot, &init)| {
                        UnitInstance::new(&soldier(&format!("{prefix}{slot}"), init, 50), 1, slot)
                    })
                    .collect(),
            )
        };
        Roster::new(build(attackers, "a"), build(defenders, "d"), 6).unwrap()
    }

    /// Reverses its input, which is still a permutation
    struct Reverse;

    impl QueueRandomizer for Reverse {
        fn reorder(&mut self, mut entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
            entries.reverse();
            entries
        }
    }

    /// Drops the last unit
    struct Lossy;

    impl QueueRandomizer for Lossy {
        fn reorder(&mut self, mut entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
            entries.pop();
            entries
        }
    }

    #[test]
    fn test_lower_initiative_acts_first() {
        let roster = roster_with(&[10], &[5]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();

        // Defender (initiative 5) before attacker (initiative 10)
        assert_eq!(queue.order(), &[UnitId(1), UnitId(0)]);
    }

    #[test]
    fn test_state_transitions() {
        let roster = roster_with(&[10, 20], &[]);
        let mut queue = TurnQueue::new();
        assert_eq!(queue.state(), QueueState::Empty);
        assert_eq!(queue.pop(), None);

        queue.rebuild(&roster, &mut IdentityOrder).unwrap();
        assert_eq!(queue.state(), QueueState::Built);

        assert_eq!(queue.pop(), Some(UnitId(0)));
        assert_eq!(queue.state(), QueueState::Draining);
        assert_eq!(queue.pop(), Some(UnitId(1)));
        assert_eq!(queue.state(), QueueState::Exhausted);
        assert_eq!(queue.pop(), None);

        queue.rebuild(&roster, &mut IdentityOrder).unwrap();
        assert_eq!(queue.state(), QueueState::Built);
        assert_eq!(queue.head(), Some(UnitId(0)));
    }

    #[test]
    fn test_dead_units_excluded() {
        let mut roster = roster_with(&[10, 20], &[15]);
        roster.unit_mut(UnitId(1)).unwrap().take_damage(1000);
        roster.mark_dead(UnitId(1));

        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();
        assert_eq!(queue.order(), &[UnitId(0), UnitId(2)]);
        assert!(queue.verify(&roster).is_ok());
    }

    #[test]
    fn test_remove_before_and_after_cursor() {
        let roster = roster_with(&[1, 2, 3], &[4]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();
        queue.pop();
        queue.pop();
        assert_eq!(queue.head(), Some(UnitId(2)));

        queue.remove(UnitId(0));
        assert_eq!(queue.head(), Some(UnitId(2)));
        queue.remove(UnitId(3));
        assert_eq!(queue.remaining(), &[UnitId(2)]);

        queue.remove(UnitId(2));
        assert!(queue.is_exhausted());
        assert_eq!(queue.head(), None);
    }

    #[test]
    fn test_randomizer_applied_to_sorted_output() {
        let roster = roster_with(&[1, 2], &[3]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut Reverse).unwrap();
        assert_eq!(queue.order(), &[UnitId(2), UnitId(1), UnitId(0)]);
    }

    #[test]
    fn test_lossy_randomizer_rejected() {
        let roster = roster_with(&[1, 2], &[3]);
        let mut queue = TurnQueue::new();
        assert_eq!(
            queue.rebuild(&roster, &mut Lossy),
            Err(InvariantViolation::QueueCorrupted)
        );
    }

    #[test]
    fn test_reorder_upcoming() {
        let roster = roster_with(&[1, 2, 3], &[]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();

        queue.reorder_upcoming(vec![UnitId(2), UnitId(1)]).unwrap();
        assert_eq!(queue.order(), &[UnitId(0), UnitId(2), UnitId(1)]);

        assert_eq!(
            queue.reorder_upcoming(vec![UnitId(0), UnitId(1)]),
            Err(ValidationError::InvalidQueueOrder)
        );
    }

    #[test]
    fn test_verify_detects_dead_unit_left_in_queue() {
        let mut roster = roster_with(&[1, 2], &[3]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();

        roster.unit_mut(UnitId(1)).unwrap().take_damage(1000);
        assert_eq!(
            queue.verify(&roster),
            Err(InvariantViolation::DeadUnitInQueue(UnitId(1)))
        );

        queue.remove(UnitId(1));
        assert!(queue.verify(&roster).is_ok());
    }

    #[test]
    fn test_verify_detects_unit_outside_rosters() {
        let mut roster = roster_with(&[1, 2], &[3]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();

        roster.mark_fled(UnitId(2));
        assert_eq!(
            queue.verify(&roster),
            Err(InvariantViolation::UnitOutsideRosters(UnitId(2)))
        );
    }

    #[test]
    fn test_verify_ignores_units_that_already_acted() {
        let mut roster = roster_with(&[1, 2], &[3]);
        let mut queue = TurnQueue::new();
        queue.rebuild(&roster, &mut IdentityOrder).unwrap();
        queue.pop();

        roster.unit_mut(UnitId(0)).unwrap().take_damage(1000);
        assert!(queue.verify(&roster).is_ok());
    }

    proptest! {
        #[test]
        fn prop_queue_sorted_and_stable(
            attackers in proptest::collection::vec(0u32..20, 0..=6),
            defenders in proptest::collection::vec(0u32..20, 0..=6),
        ) {
            let roster = roster_with(&attackers, &defenders);
            let mut queue = TurnQueue::new();
            queue.rebuild(&roster, &mut IdentityOrder).unwrap();

            let order = queue.order();
            prop_assert_eq!(order.len(), attackers.len() + defenders.len());

            let initiatives: Vec<u32> = attackers.iter().chain(defenders.iter()).copied().collect();
            for pair in order.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(initiatives[a.0] <= initiatives[b.0]);
                if initiatives[a.0] == initiatives[b.0] {
                    // Arena ids follow roster order
                    prop_assert!(a.0 < b.0);
                }
            }
        }
    }
}

//! Pluggable reordering applied after the deterministic initiative sort

use crate::types::UnitId;
use rand::seq::SliceRandom;
use rand::Rng;

/// A queued unit and the initiative it was sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub unit: UnitId,
    pub initiative: u32,
}

/// Strategy that may reorder a freshly sorted queue
///
/// Implementations receive the stable initiative order and must return a
/// permutation of it; anything else aborts the battle.
pub trait QueueRandomizer: Send {
    fn reorder(&mut self, entries: Vec<QueueEntry>) -> Vec<QueueEntry>;
}

/// Keeps the deterministic order untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOrder;

impl QueueRandomizer for IdentityOrder {
    fn reorder(&mut self, entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
        entries
    }
}

/// Shuffles units that share an initiative value, leaving the initiative order intact
#[derive(Debug, Clone)]
pub struct ShuffleTies<R: Rng> {
    rng: R,
}

impl<R: Rng> ShuffleTies<R> {
    pub fn new(rng: R) -> Self {
        ShuffleTies { rng }
    }
}

impl<R: Rng + Send> QueueRandomizer for ShuffleTies<R> {
    fn reorder(&mut self, mut entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
        let mut start = 0;
        while start < entries.len() {
            let initiative = entries[start].initiative;
            let end = entries[start..]
                .iter()
                .position(|entry| entry.initiative != initiative)
                .map_or(entries.len(), |offset| start + offset);
            entries[start..end].shuffle(&mut self.rng);
            start = end;
        }
        entries
    }
}

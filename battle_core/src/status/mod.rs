//! Status effects - tagged, timed states on a unit

mod types;

pub use types::{Status, StatusKind};

use crate::roster::UnitType;
use serde::{Deserialize, Serialize};

/// How an application changed a unit's statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Added,
    Refreshed,
}

/// What happened to a unit's statuses as its turn began
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnStartTick {
    /// Poison damage to deal before the unit acts
    pub poison_damage: u32,
    /// The unit is paralyzed and loses this turn
    pub skip_turn: bool,
    /// Whether a defend stance was dropped
    pub defend_cleared: bool,
    pub expired: Vec<StatusKind>,
}

/// Active statuses on a unit, at most one per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSet {
    statuses: Vec<Status>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a status, or refresh the existing one of the same kind
    pub fn apply(&mut self, status: Status) -> StatusChange {
        match self.statuses.iter_mut().find(|s| s.kind() == status.kind()) {
            Some(existing) => {
                existing.refresh(status);
                StatusChange::Refreshed
            }
            None => {
                self.statuses.push(status);
                StatusChange::Added
            }
        }
    }

    pub fn get(&self, kind: StatusKind) -> Option<&Status> {
        self.statuses.iter().find(|s| s.kind() == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove(&mut self, kind: StatusKind) -> Option<Status> {
        let index = self.statuses.iter().position(|s| s.kind() == kind)?;
        Some(self.statuses.remove(index))
    }

    /// Remove every negative status, returning the kinds removed
    pub fn cure(&mut self) -> Vec<StatusKind> {
        let removed = self
            .statuses
            .iter()
            .filter(|s| s.is_negative())
            .map(Status::kind)
            .collect();
        self.statuses.retain(|s| !s.is_negative());
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.statuses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn transformed_into(&self) -> Option<&UnitType> {
        match self.get(StatusKind::Transformed) {
            Some(Status::Transformed { into, .. }) => Some(into.as_ref()),
            _ => None,
        }
    }

    pub fn levels_drained(&self) -> u32 {
        match self.get(StatusKind::LeveledDown) {
            Some(Status::LeveledDown { levels, .. }) => *levels,
            _ => 0,
        }
    }

    /// Damage fraction removed by an active defend stance
    pub fn defend_reduction(&self) -> f64 {
        match self.get(StatusKind::Defending) {
            Some(Status::Defending { reduction }) => *reduction,
            _ => 0.0,
        }
    }

    /// Start-of-turn processing: drop the defend stance, tick poison and paralysis
    pub fn begin_turn(&mut self) -> TurnStartTick {
        let mut tick = TurnStartTick {
            defend_cleared: self.remove(StatusKind::Defending).is_some(),
            ..TurnStartTick::default()
        };

        for status in &mut self.statuses {
            match status {
                Status::Poisoned { damage, turns } => {
                    tick.poison_damage = *damage;
                    *turns = turns.saturating_sub(1);
                    if *turns == 0 {
                        tick.expired.push(StatusKind::Poisoned);
                    }
                }
                Status::Paralyzed { turns } => {
                    tick.skip_turn = true;
                    *turns = turns.saturating_sub(1);
                    if *turns == 0 {
                        tick.expired.push(StatusKind::Paralyzed);
                    }
                }
                _ => {}
            }
        }

        self.statuses.retain(|s| !tick.expired.contains(&s.kind()));
        tick
    }

    /// End-of-turn processing: tick fear, level drain and timed transformations
    ///
    /// Returns the expired statuses so the owner can undo their stat changes.
    pub fn end_turn(&mut self) -> Vec<Status> {
        for status in &mut self.statuses {
            if let Some(turns) = status.end_of_turn_counter() {
                *turns = turns.saturating_sub(1);
            }
        }

        let (expired, active): (Vec<Status>, Vec<Status>) = self
            .statuses
            .drain(..)
            .partition(|s| {
                matches!(
                    s,
                    Status::Feared { turns: 0 }
                        | Status::LeveledDown { turns: 0, .. }
                        | Status::Transformed { turns: Some(0), .. }
                )
            });
        self.statuses = active;
        expired
    }
}

//! Status variants carried by units

use crate::roster::UnitType;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Status`], used for lookups and deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poisoned,
    Paralyzed,
    Feared,
    Transformed,
    LeveledDown,
    Defending,
}

/// A status effect with its explicit strength and duration
///
/// Durations count the affected unit's own turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Status {
    /// Loses `damage` health at the start of each turn
    Poisoned { damage: u32, turns: u32 },
    /// Skips its turns while active
    Paralyzed { turns: u32 },
    /// Cannot attack or use items
    Feared { turns: u32 },
    /// Acts as `into` until the duration runs out; `None` is permanent
    Transformed {
        into: Box<UnitType>,
        turns: Option<u32>,
    },
    /// Effective level lowered by `levels`
    LeveledDown { levels: u32, turns: u32 },
    /// Incoming damage reduced until the unit's next turn
    Defending { reduction: f64 },
}

impl Status {
    pub fn kind(&self) -> StatusKind {
        match self {
            Status::Poisoned { .. } => StatusKind::Poisoned,
            Status::Paralyzed { .. } => StatusKind::Paralyzed,
            Status::Feared { .. } => StatusKind::Feared,
            Status::Transformed { .. } => StatusKind::Transformed,
            Status::LeveledDown { .. } => StatusKind::LeveledDown,
            Status::Defending { .. } => StatusKind::Defending,
        }
    }

    /// Whether a cure removes this status
    pub fn is_negative(&self) -> bool {
        !matches!(self, Status::Defending { .. })
    }

    /// Merge a reapplication into this status, keeping the stronger values
    pub fn refresh(&mut self, incoming: Status) {
        match (self, incoming) {
            (
                Status::Poisoned { damage, turns },
                Status::Poisoned {
                    damage: new_damage,
                    turns: new_turns,
                },
            ) => {
                *damage = (*damage).max(new_damage);
                *turns = (*turns).max(new_turns);
            }
            (Status::Paralyzed { turns }, Status::Paralyzed { turns: new_turns })
            | (Status::Feared { turns }, Status::Feared { turns: new_turns }) => {
                *turns = (*turns).max(new_turns);
            }
            (
                Status::LeveledDown { levels, turns },
                Status::LeveledDown {
                    levels: new_levels,
                    turns: new_turns,
                },
            ) => {
                *levels = (*levels).max(new_levels);
                *turns = (*turns).max(new_turns);
            }
            (current, incoming) => {
                // Transformations and stances are replaced outright
                *current = incoming;
            }
        }
    }

    /// Turns left for statuses that expire at the end of the unit's turn
    pub(crate) fn end_of_turn_counter(&mut self) -> Option<&mut u32> {
        match self {
            Status::Feared { turns } | Status::LeveledDown { turns, .. } => Some(turns),
            Status::Transformed { turns, .. } => turns.as_mut(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_refresh_keeps_stronger() {
        let mut status = Status::Poisoned {
            damage: 10,
            turns: 1,
        };
        status.refresh(Status::Poisoned {
            damage: 5,
            turns: 3,
        });
        assert_eq!(
            status,
            Status::Poisoned {
                damage: 10,
                turns: 3
            }
        );
    }

    #[test]
    fn test_status_serialization() {
        let status = Status::LeveledDown {
            levels: 1,
            turns: 2,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("leveled_down"));
    }

    #[test]
    fn test_defending_is_not_negative() {
        assert!(!Status::Defending { reduction: 0.5 }.is_negative());
        assert!(Status::Feared { turns: 1 }.is_negative());
    }
}

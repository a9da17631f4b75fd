//! ActionResult / TurnResult - what happened, for replay and animation

use crate::status::{StatusChange, StatusKind};
use crate::types::{AttackSlot, UnitId, Winner};
use serde::{Deserialize, Serialize};

/// What kind of step produced an [`ActionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRecord {
    Attack,
    UseItem,
    Wait,
    Defend,
    Flee,
    /// Turn lost to paralysis
    Skipped,
    /// Start-of-turn status processing (poison, expiring statuses)
    TurnStart,
    /// Statuses expiring as the unit's turn ends
    TurnEnd,
}

/// One accuracy roll against one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub slot: AttackSlot,
    pub attack: String,
    /// Drawn value in 0..100; a hit when below accuracy
    pub roll: u32,
    pub hit: bool,
    /// Hit, but the target's immunity negated the effect
    pub negated: bool,
}

/// A single state change caused by an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDelta {
    Damaged {
        unit: UnitId,
        amount: u32,
        health_after: u32,
    },
    Healed {
        unit: UnitId,
        amount: u32,
        health_after: u32,
    },
    StatusApplied {
        unit: UnitId,
        status: StatusKind,
        change: StatusChange,
    },
    StatusRemoved {
        unit: UnitId,
        status: StatusKind,
    },
    ArmourDestroyed {
        unit: UnitId,
        amount: u32,
        armour_after: u32,
    },
    Transformed {
        unit: UnitId,
        into: String,
        turns: Option<u32>,
    },
    Reverted {
        unit: UnitId,
    },
    Summoned {
        unit: UnitId,
        unit_type: String,
        slot: usize,
    },
    Died {
        unit: UnitId,
    },
    Fled {
        unit: UnitId,
    },
    ExperienceGained {
        unit: UnitId,
        amount: u32,
    },
}

impl EffectDelta {
    /// The unit this change applies to
    pub fn unit(&self) -> UnitId {
        match self {
            EffectDelta::Damaged { unit, .. }
            | EffectDelta::Healed { unit, .. }
            | EffectDelta::StatusApplied { unit, .. }
            | EffectDelta::StatusRemoved { unit, .. }
            | EffectDelta::ArmourDestroyed { unit, .. }
            | EffectDelta::Transformed { unit, .. }
            | EffectDelta::Reverted { unit }
            | EffectDelta::Summoned { unit, .. }
            | EffectDelta::Died { unit }
            | EffectDelta::Fled { unit }
            | EffectDelta::ExperienceGained { unit, .. } => *unit,
        }
    }
}

/// Record of one unit's action against at most one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub actor: UnitId,
    pub action: ActionRecord,
    pub target: Option<UnitId>,
    pub rolls: Vec<AttackRoll>,
    pub effects: Vec<EffectDelta>,
}

impl ActionResult {
    pub fn new(actor: UnitId, action: ActionRecord, target: Option<UnitId>) -> Self {
        ActionResult {
            actor,
            action,
            target,
            rolls: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Whether the first roll hit
    pub fn hit(&self) -> bool {
        self.rolls.first().is_some_and(|roll| roll.hit)
    }

    pub fn total_damage(&self) -> u32 {
        self.effects
            .iter()
            .map(|effect| match effect {
                EffectDelta::Damaged { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn deaths(&self) -> Vec<UnitId> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                EffectDelta::Died { unit } => Some(*unit),
                _ => None,
            })
            .collect()
    }

    pub fn is_killing_blow(&self) -> bool {
        !self.deaths().is_empty()
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} {:?}", self.actor, self.action)];

        if let Some(target) = self.target {
            parts.push(format!("-> {}", target));
        }

        for roll in &self.rolls {
            let outcome = match (roll.hit, roll.negated) {
                (true, true) => "immune",
                (true, false) => "hit",
                (false, _) => "miss",
            };
            parts.push(format!("{} {}", roll.attack, outcome));
        }

        let damage = self.total_damage();
        if damage > 0 {
            parts.push(format!("{} damage", damage));
        }

        if self.is_killing_blow() {
            parts.push("FATAL".to_string());
        }

        parts.join(", ")
    }
}

/// Everything produced by one call into the battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub round: u32,
    pub round_complete: bool,
    pub battle_complete: bool,
    pub winner: Option<Winner>,
    /// Unit expected to act next, if any
    pub next_actor: Option<UnitId>,
    pub action_results: Vec<ActionResult>,
}

impl TurnResult {
    pub(crate) fn new(round: u32) -> Self {
        TurnResult {
            round,
            round_complete: false,
            battle_complete: false,
            winner: None,
            next_actor: None,
            action_results: Vec::new(),
        }
    }
}

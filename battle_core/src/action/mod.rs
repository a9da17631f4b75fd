//! Action resolver - caller-submitted actions and their validation

use crate::error::{Result, RuleViolation, ValidationError};
use crate::roster::{Item, Roster};
use crate::types::UnitId;
use serde::{Deserialize, Serialize};

/// What a unit does with one of its actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Use the unit's own attacks; `target` is required for `anyone` targeting
    Attack { target: Option<UnitId> },
    Wait,
    /// Reduce incoming damage until the unit's next turn
    Defend,
    /// Leave the battle for good
    Flee,
    /// Leader only: use an inventory item's attack
    UseItem { item: String, target: Option<UnitId> },
}

/// An action submitted for the unit at the head of the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub actor: UnitId,
    pub kind: ActionKind,
}

impl Action {
    pub fn attack(actor: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::Attack { target: None },
        }
    }

    pub fn attack_target(actor: UnitId, target: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::Attack {
                target: Some(target),
            },
        }
    }

    pub fn wait(actor: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::Wait,
        }
    }

    pub fn defend(actor: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::Defend,
        }
    }

    pub fn flee(actor: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::Flee,
        }
    }

    pub fn use_item(actor: UnitId, item: &str, target: Option<UnitId>) -> Self {
        Action {
            actor,
            kind: ActionKind::UseItem {
                item: item.to_string(),
                target,
            },
        }
    }
}

/// Check an action against the current actor, its budget and its state
///
/// Returns the item to be used for [`ActionKind::UseItem`].
pub fn validate_action<'r>(
    roster: &'r Roster,
    current: Option<UnitId>,
    action: &Action,
) -> Result<Option<&'r Item>> {
    if current != Some(action.actor) {
        return Err(RuleViolation::NotCurrentActor {
            expected: current,
            submitted: action.actor,
        }
        .into());
    }

    let unit = roster.unit(action.actor)?;
    if unit.actions_remaining == 0 {
        return Err(RuleViolation::NoActionsRemaining(action.actor).into());
    }

    let invalid = |reason: &str| RuleViolation::InvalidAction {
        unit: action.actor,
        reason: reason.to_string(),
    };

    match &action.kind {
        ActionKind::Attack { .. } => {
            if unit.is_feared() {
                return Err(invalid("feared units cannot attack").into());
            }
            Ok(None)
        }
        ActionKind::UseItem { item, .. } => {
            if unit.is_feared() {
                return Err(invalid("feared units cannot use items").into());
            }
            let party_id = roster
                .party_of(action.actor)
                .ok_or(ValidationError::UnknownUnit(action.actor))?;
            let party = roster.party(party_id);
            if !party.is_leader(action.actor) {
                return Err(invalid("only the party leader can use items").into());
            }
            let index = party
                .find_item(item)
                .ok_or_else(|| ValidationError::UnknownItem(item.clone()))?;
            let item = &party.inventory[index];
            if item.attack.is_none() {
                return Err(invalid("item has no battle use").into());
            }
            Ok(Some(item))
        }
        ActionKind::Wait | ActionKind::Defend | ActionKind::Flee => Ok(None),
    }
}

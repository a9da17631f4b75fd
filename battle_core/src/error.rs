//! Battle error taxonomy
//!
//! - [`ValidationError`]: malformed caller input, surfaced as-is
//! - [`RuleViolation`]: a well-formed request the rules do not allow right now
//! - [`InvariantViolation`]: an engine bug; the battle is aborted when one is raised

use crate::types::{PartyId, UnitId};
use thiserror::Error;

/// Bad caller input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),
    #[error("Unknown item: {0}")]
    UnknownItem(String),
    #[error("Attack requires an explicit target")]
    MissingTarget,
    #[error("Unit {0} is not a selectable target")]
    InvalidTarget(UnitId),
    #[error("Party {party} needs {required} slots but only {capacity} are available")]
    RosterOverCapacity {
        party: PartyId,
        required: usize,
        capacity: usize,
    },
    #[error("Slot {slot} is used twice in party {party}")]
    SlotConflict { party: PartyId, slot: usize },
    #[error("Leader index {index} is out of range for party {party}")]
    InvalidLeader { party: PartyId, index: usize },
    #[error("Queue order must be a permutation of the units still waiting to act")]
    InvalidQueueOrder,
    #[error("Unit type '{unit_type}' is invalid: {reason}")]
    InvalidUnitType { unit_type: String, reason: String },
    #[error("Unit in slot {slot} of party {party} has {health} health, above its maximum of {max_health}")]
    HealthAboveMaximum {
        party: PartyId,
        slot: usize,
        health: u32,
        max_health: u32,
    },
}

/// A request the battle rules reject in the current state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Unit {submitted} is not the current actor (expected {expected:?})")]
    NotCurrentActor {
        expected: Option<UnitId>,
        submitted: UnitId,
    },
    #[error("Unit {0} has no actions remaining this turn")]
    NoActionsRemaining(UnitId),
    #[error("Unit {unit} cannot perform this action: {reason}")]
    InvalidAction { unit: UnitId, reason: String },
    #[error("Battle is already complete")]
    BattleAlreadyComplete,
    #[error("Battle was aborted after an internal error")]
    BattleAborted,
    #[error("No valid targets")]
    NoValidTargets,
    #[error("Party {0} has no free slot for a summoned unit")]
    RosterFull(PartyId),
    #[error("No round is in progress")]
    RoundNotInProgress,
    #[error("A round is already in progress")]
    RoundInProgress,
}

/// Engine bug; fatal for the battle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Dead unit {0} found in turn queue")]
    DeadUnitInQueue(UnitId),
    #[error("Unit {0} belongs to neither party")]
    UnitOutsideRosters(UnitId),
    #[error("Winner could not be determined unambiguously")]
    AmbiguousWinner,
    #[error("Queue randomizer did not return a permutation of its input")]
    QueueCorrupted,
}

/// Any failure returned by the battle engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl BattleError {
    /// Invariant violations abort the battle
    pub fn is_fatal(&self) -> bool {
        matches!(self, BattleError::Invariant(_))
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invariants_are_fatal() {
        let rule: BattleError = RuleViolation::NoValidTargets.into();
        let validation: BattleError = ValidationError::MissingTarget.into();
        let invariant: BattleError = InvariantViolation::AmbiguousWinner.into();

        assert!(!rule.is_fatal());
        assert!(!validation.is_fatal());
        assert!(invariant.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err: BattleError = RuleViolation::NotCurrentActor {
            expected: Some(UnitId(1)),
            submitted: UnitId(3),
        }
        .into();
        assert!(err.to_string().contains("#3"));

        let err: BattleError = ValidationError::UnknownUnitType("imp".to_string()).into();
        assert_eq!(err.to_string(), "Unknown unit type: imp");
    }
}

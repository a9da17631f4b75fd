//! Target selection per targeting mode

use crate::error::{BattleError, RuleViolation, ValidationError};
use crate::queue::TurnQueue;
use crate::roster::Roster;
use crate::types::{AttackEffect, AttackTargeting, UnitId};

/// Living units an attack with `effect` may be aimed at
///
/// Friendly effects look at the actor's own party, everything else at the
/// opposing party.
pub fn candidates(roster: &Roster, actor: UnitId, effect: AttackEffect) -> Result<Vec<UnitId>, BattleError> {
    let own = roster
        .party_of(actor)
        .ok_or(ValidationError::UnknownUnit(actor))?;
    let party = if effect.is_friendly() {
        own
    } else {
        own.opponent()
    };
    Ok(roster.living(party))
}

/// Resolve the targets of an attack
pub fn select_targets(
    roster: &Roster,
    queue: &TurnQueue,
    actor: UnitId,
    effect: AttackEffect,
    mode: AttackTargeting,
    requested: Option<UnitId>,
) -> Result<Vec<UnitId>, BattleError> {
    if effect.is_targetless() {
        return Ok(Vec::new());
    }

    let living = candidates(roster, actor, effect)?;
    if living.is_empty() {
        return Err(RuleViolation::NoValidTargets.into());
    }

    match mode {
        AttackTargeting::Nearest => nearest(roster, queue, actor, &living).map(|t| vec![t]),
        AttackTargeting::Anyone => {
            let target = requested.ok_or(ValidationError::MissingTarget)?;
            if living.contains(&target) {
                Ok(vec![target])
            } else {
                Err(ValidationError::InvalidTarget(target).into())
            }
        }
        AttackTargeting::Everyone => Ok(living),
    }
}

/// Closest unit by slot distance; ties go to whoever comes first in the queue
fn nearest(
    roster: &Roster,
    queue: &TurnQueue,
    actor: UnitId,
    living: &[UnitId],
) -> Result<UnitId, BattleError> {
    let origin = roster.unit(actor)?.slot;
    let mut best: Option<((usize, usize, UnitId), UnitId)> = None;

    for &candidate in living {
        let slot = roster.unit(candidate)?.slot;
        let key = (
            origin.abs_diff(slot),
            queue.rank(candidate).unwrap_or(usize::MAX),
            candidate,
        );
        if best.map_or(true, |(best_key, _)| key < best_key) {
            best = Some((key, candidate));
        }
    }

    best.map(|(_, unit)| unit)
        .ok_or_else(|| RuleViolation::NoValidTargets.into())
}

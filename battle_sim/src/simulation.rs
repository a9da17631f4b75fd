//! Scripted battle playback

use crate::SimError;
use battle_core::attack::candidates;
use battle_core::{Action, AttackTargeting, Battle, BattleError, TurnResult, UnitId, Winner};
use rand::Rng;
use tracing::{info, warn};

/// Outcome of a finished (or abandoned) simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub rounds: u32,
    pub actions: u32,
    /// `None` when the round limit was hit first
    pub winner: Option<Winner>,
}

/// Caller policy: every unit attacks, picking the first selectable target when
/// it has to choose. Feared units defend.
pub fn choose_action(battle: &Battle, actor: UnitId) -> Result<Action, BattleError> {
    let unit = battle.roster().unit(actor)?;
    if unit.is_feared() {
        return Ok(Action::defend(actor));
    }

    let unit_type = unit.effective_type();
    match unit_type.attack_target {
        AttackTargeting::Anyone => {
            let targets = candidates(battle.roster(), actor, unit_type.base_attack1.effect)?;
            Ok(match targets.first() {
                Some(&target) => Action::attack_target(actor, target),
                None => Action::wait(actor),
            })
        }
        AttackTargeting::Nearest | AttackTargeting::Everyone => Ok(Action::attack(actor)),
    }
}

/// Play `battle` to completion or `max_rounds`, handing every result to `emit`
pub fn run(
    battle: &mut Battle,
    max_rounds: u32,
    rng: &mut impl Rng,
    mut emit: impl FnMut(&TurnResult) -> Result<(), SimError>,
) -> Result<SimulationSummary, SimError> {
    let mut actions = 0;

    while !battle.is_complete() && battle.round() < max_rounds {
        emit(&battle.begin_round()?)?;

        while let Some(actor) = battle.current_actor() {
            let action = choose_action(battle, actor)?;
            let result = match battle.submit_with_rng(action, rng) {
                Ok(result) => result,
                Err(BattleError::Rule(rule)) => {
                    warn!(unit = %actor, reason = %rule, "Action refused, defending instead");
                    battle.submit_with_rng(Action::defend(actor), rng)?
                }
                Err(err) => return Err(err.into()),
            };
            actions += 1;
            emit(&result)?;
        }
    }

    let summary = SimulationSummary {
        rounds: battle.round(),
        actions,
        winner: battle.winner(),
    };
    match summary.winner {
        Some(winner) => info!(rounds = summary.rounds, winner = ?winner, "Simulation finished"),
        None => warn!(rounds = summary.rounds, "Round limit reached without a winner"),
    }
    Ok(summary)
}

//! Battle - the round/turn state machine driven by the caller
//!
//! `Created -> RoundInProgress -> RoundComplete -> (RoundInProgress | BattleComplete)`
//!
//! The caller starts each round with [`Battle::begin_round`] and then submits
//! one action at a time for [`Battle::current_actor`]. Start-of-turn status
//! processing, skipped turns and deaths are folded into the returned
//! [`TurnResult`]s.

use super::result::{ActionRecord, ActionResult, EffectDelta, TurnResult};
use super::snapshot::BattleSnapshot;
use crate::action::{validate_action, Action, ActionKind};
use crate::attack::{execute_attack, plan_attack, plan_unit_attack};
use crate::config::BattleConstants;
use crate::effect::{self, EffectContext};
use crate::error::{BattleError, InvariantViolation, Result, RuleViolation, ValidationError};
use crate::queue::{IdentityOrder, QueueRandomizer, TurnQueue};
use crate::roster::{Party, Roster, UnitCatalog};
use crate::status::{Status, StatusKind};
use crate::types::{AttackSlot, PartyId, UnitId, Winner};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleState {
    Created,
    RoundInProgress,
    RoundComplete,
    BattleComplete,
    /// An engine invariant broke; nothing further is accepted
    Aborted,
}

/// One engagement between two parties
pub struct Battle {
    roster: Roster,
    queue: TurnQueue,
    catalog: UnitCatalog,
    constants: BattleConstants,
    randomizer: Box<dyn QueueRandomizer>,
    state: BattleState,
    round: u32,
    winner: Option<Winner>,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("state", &self.state)
            .field("round", &self.round)
            .field("winner", &self.winner)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// Set up a battle; no queue exists until [`Battle::begin_round`]
    pub fn new(
        catalog: UnitCatalog,
        constants: BattleConstants,
        attackers: Party,
        defenders: Party,
    ) -> Result<Self> {
        let roster = Roster::new(attackers, defenders, constants.roster.capacity)?;
        info!(
            attackers = roster.living_count(PartyId::Attackers),
            defenders = roster.living_count(PartyId::Defenders),
            "Battle created"
        );
        Ok(Battle {
            roster,
            queue: TurnQueue::new(),
            catalog,
            constants,
            randomizer: Box::new(IdentityOrder),
            state: BattleState::Created,
            round: 0,
            winner: None,
        })
    }

    /// Replace the queue ordering strategy
    pub fn with_randomizer(mut self, randomizer: impl QueueRandomizer + 'static) -> Self {
        self.randomizer = Box::new(randomizer);
        self
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_complete(&self) -> bool {
        self.state == BattleState::BattleComplete
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn queue(&self) -> &TurnQueue {
        &self.queue
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn constants(&self) -> &BattleConstants {
        &self.constants
    }

    /// The unit expected to submit the next action
    pub fn current_actor(&self) -> Option<UnitId> {
        match self.state {
            BattleState::RoundInProgress => self.queue.head(),
            _ => None,
        }
    }

    /// Typed deep copy of the battle's data
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            round: self.round,
            state: self.state,
            winner: self.winner,
            roster: self.roster.clone(),
            queue: self.queue.clone(),
        }
    }

    /// Build the next round's queue and run turn starts up to the first unit able to act
    pub fn begin_round(&mut self) -> Result<TurnResult> {
        self.ensure_active()?;
        if self.state == BattleState::RoundInProgress {
            return Err(RuleViolation::RoundInProgress.into());
        }

        let outcome = self.start_round();
        outcome.map_err(|err| self.fail(err))
    }

    fn start_round(&mut self) -> Result<TurnResult> {
        self.round += 1;
        self.queue.rebuild(&self.roster, self.randomizer.as_mut())?;
        self.state = BattleState::RoundInProgress;
        info!(round = self.round, order = ?self.queue.order(), "Round started");

        let mut result = TurnResult::new(self.round);
        self.advance(&mut result)?;
        Ok(self.finish(result))
    }

    /// Submit an action for the current actor using the thread RNG
    pub fn submit(&mut self, action: Action) -> Result<TurnResult> {
        let mut rng = rand::thread_rng();
        self.submit_with_rng(action, &mut rng)
    }

    /// Submit an action with a provided RNG (for replayable battles)
    pub fn submit_with_rng(&mut self, action: Action, rng: &mut impl Rng) -> Result<TurnResult> {
        self.ensure_active()?;
        if self.state != BattleState::RoundInProgress {
            return Err(RuleViolation::RoundNotInProgress.into());
        }

        let outcome = self.resolve(action, rng);
        outcome.map_err(|err| self.fail(err))
    }

    /// Reorder the units still waiting to act this round
    pub fn replace_queue(&mut self, upcoming: Vec<UnitId>) -> Result<()> {
        self.ensure_active()?;
        if self.state != BattleState::RoundInProgress {
            return Err(RuleViolation::RoundNotInProgress.into());
        }
        self.queue.reorder_upcoming(upcoming)?;
        debug!(order = ?self.queue.remaining(), "Queue replaced");
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            BattleState::BattleComplete => Err(RuleViolation::BattleAlreadyComplete.into()),
            BattleState::Aborted => Err(RuleViolation::BattleAborted.into()),
            _ => Ok(()),
        }
    }

    /// Abort on invariant violations; other errors pass through
    fn fail(&mut self, err: BattleError) -> BattleError {
        if err.is_fatal() {
            error!(round = self.round, error = %err, "Battle aborted");
            self.state = BattleState::Aborted;
        }
        err
    }

    fn context(&mut self) -> EffectContext<'_> {
        EffectContext {
            roster: &mut self.roster,
            queue: &mut self.queue,
            catalog: &self.catalog,
            constants: &self.constants,
        }
    }

    fn resolve(&mut self, action: Action, rng: &mut impl Rng) -> Result<TurnResult> {
        let item = validate_action(&self.roster, self.queue.head(), &action)?.cloned();
        let actor = action.actor;
        let mut result = TurnResult::new(self.round);

        match &action.kind {
            ActionKind::Attack { target } => {
                let plan = plan_unit_attack(
                    &self.roster,
                    &self.queue,
                    &self.catalog,
                    &self.constants,
                    actor,
                    *target,
                )?;
                self.consume_action(actor)?;
                let results = execute_attack(&mut self.context(), actor, &plan, rng)?;
                result.action_results.extend(results);
            }
            ActionKind::UseItem { target, .. } => {
                let usable = item.and_then(|item| item.attack.clone().map(|attack| (item, attack)));
                let Some((item, attack)) = usable else {
                    return Err(RuleViolation::InvalidAction {
                        unit: actor,
                        reason: "item has no battle use".to_string(),
                    }
                    .into());
                };
                let plan = plan_attack(
                    &self.roster,
                    &self.queue,
                    &self.catalog,
                    &self.constants,
                    actor,
                    AttackSlot::Item,
                    attack,
                    None,
                    item.targeting,
                    *target,
                )?;
                self.consume_action(actor)?;
                if item.item_type.is_consumable() {
                    self.consume_item(actor, &item.id)?;
                }
                info!(unit = %actor, item = %item.id, "Item used");
                let results = execute_attack(&mut self.context(), actor, &plan, rng)?;
                result.action_results.extend(results);
            }
            ActionKind::Wait => {
                self.consume_action(actor)?;
                result
                    .action_results
                    .push(ActionResult::new(actor, ActionRecord::Wait, None));
            }
            ActionKind::Defend => {
                self.consume_action(actor)?;
                let reduction = self.constants.defend.damage_reduction;
                let change = self
                    .roster
                    .unit_mut(actor)?
                    .statuses
                    .apply(Status::Defending { reduction });
                let mut record = ActionResult::new(actor, ActionRecord::Defend, None);
                record.effects.push(EffectDelta::StatusApplied {
                    unit: actor,
                    status: StatusKind::Defending,
                    change,
                });
                result.action_results.push(record);
            }
            ActionKind::Flee => {
                self.consume_action(actor)?;
                self.roster.mark_fled(actor);
                self.queue.remove(actor);
                info!(unit = %actor, "Unit fled");
                let mut record = ActionResult::new(actor, ActionRecord::Flee, None);
                record.effects.push(EffectDelta::Fled { unit: actor });
                result.action_results.push(record);
            }
        }

        for record in &result.action_results {
            debug!(round = self.round, summary = %record.summary(), "Action resolved");
        }

        if !self.check_completion()? {
            let still_head = self.queue.head() == Some(actor);
            if still_head && self.roster.unit(actor)?.actions_remaining == 0 {
                self.end_turn(actor, &mut result)?;
            }
            if self.queue.head() != Some(actor) {
                self.advance(&mut result)?;
            }
        }

        self.queue.verify(&self.roster)?;
        Ok(self.finish(result))
    }

    fn consume_action(&mut self, actor: UnitId) -> Result<()> {
        let unit = self.roster.unit_mut(actor)?;
        unit.actions_remaining = unit.actions_remaining.saturating_sub(1);
        Ok(())
    }

    fn consume_item(&mut self, actor: UnitId, item_id: &str) -> Result<()> {
        let party_id = self
            .roster
            .party_of(actor)
            .ok_or(ValidationError::UnknownUnit(actor))?;
        let party = self.roster.party_mut(party_id);
        let index = party
            .find_item(item_id)
            .ok_or_else(|| ValidationError::UnknownItem(item_id.to_string()))?;
        party.inventory.remove(index);
        Ok(())
    }

    /// Run turn starts until a unit can act, the round ends or the battle ends
    fn advance(&mut self, result: &mut TurnResult) -> Result<()> {
        loop {
            if self.check_completion()? {
                return Ok(());
            }
            let Some(head) = self.queue.head() else {
                self.state = BattleState::RoundComplete;
                info!(round = self.round, "Round complete");
                return Ok(());
            };
            if self.begin_turn(head, result)? {
                debug!(unit = %head, "Awaiting action");
                return Ok(());
            }
        }
    }

    /// Start-of-turn processing. Returns whether the unit may act now.
    fn begin_turn(&mut self, unit: UnitId, result: &mut TurnResult) -> Result<bool> {
        let tick = self.roster.unit_mut(unit)?.statuses.begin_turn();
        let mut record = ActionResult::new(unit, ActionRecord::TurnStart, None);

        if tick.defend_cleared {
            record.effects.push(EffectDelta::StatusRemoved {
                unit,
                status: StatusKind::Defending,
            });
        }
        if tick.poison_damage > 0 {
            let instance = self.roster.unit_mut(unit)?;
            let amount = instance.take_damage(tick.poison_damage);
            record.effects.push(EffectDelta::Damaged {
                unit,
                amount,
                health_after: instance.health,
            });
        }
        for status in &tick.expired {
            record.effects.push(EffectDelta::StatusRemoved {
                unit,
                status: *status,
            });
        }

        if !self.roster.unit(unit)?.is_alive() {
            record.effects.extend(effect::kill(&mut self.context(), unit, None)?);
            result.action_results.push(record);
            return Ok(false);
        }
        if !record.effects.is_empty() {
            result.action_results.push(record);
        }

        if tick.skip_turn {
            debug!(unit = %unit, "Turn skipped");
            result
                .action_results
                .push(ActionResult::new(unit, ActionRecord::Skipped, None));
            self.end_turn(unit, result)?;
            return Ok(false);
        }

        self.roster.unit_mut(unit)?.refill_actions();
        Ok(true)
    }

    /// End-of-turn status expiry, then hand the head of the queue on
    fn end_turn(&mut self, unit: UnitId, result: &mut TurnResult) -> Result<()> {
        let instance = self.roster.unit_mut(unit)?;
        instance.actions_remaining = 0;
        let expired = instance.statuses.end_turn();

        if !expired.is_empty() {
            let mut record = ActionResult::new(unit, ActionRecord::TurnEnd, None);
            for status in &expired {
                record.effects.push(EffectDelta::StatusRemoved {
                    unit,
                    status: status.kind(),
                });
                if status.kind() == StatusKind::Transformed {
                    instance.revert_transformation();
                    record.effects.push(EffectDelta::Reverted { unit });
                }
            }
            result.action_results.push(record);
        }

        if self.queue.pop() != Some(unit) {
            return Err(InvariantViolation::QueueCorrupted.into());
        }
        Ok(())
    }

    /// Move to `BattleComplete` once a party has no living units
    fn check_completion(&mut self) -> Result<bool> {
        let attackers = self.roster.living_count(PartyId::Attackers);
        let defenders = self.roster.living_count(PartyId::Defenders);
        let winner = match (attackers, defenders) {
            (0, 0) => Winner::Draw,
            (0, _) => Winner::Party(PartyId::Defenders),
            (_, 0) => Winner::Party(PartyId::Attackers),
            _ => return Ok(false),
        };
        if self.winner.is_some() {
            return Err(InvariantViolation::AmbiguousWinner.into());
        }

        self.winner = Some(winner);
        self.state = BattleState::BattleComplete;
        info!(round = self.round, winner = ?winner, "Battle complete");
        Ok(true)
    }

    fn finish(&self, mut result: TurnResult) -> TurnResult {
        result.round_complete = matches!(
            self.state,
            BattleState::RoundComplete | BattleState::BattleComplete
        );
        result.battle_complete = self.is_complete();
        result.winner = self.winner;
        result.next_actor = self.current_actor();
        result
    }
}

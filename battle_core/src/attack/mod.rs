//! Targeting & attack resolution
//!
//! An attack is resolved in two steps:
//! 1. [`plan_attack`] selects targets and checks everything that could fail,
//!    before any state is touched
//! 2. [`execute_attack`] rolls accuracy per target and hands surviving
//!    magnitudes to the effect engine

pub mod mitigation;
mod targeting;

pub use mitigation::{apply_shield, damage_after_defenses, mitigate, Mitigation};
pub use targeting::{candidates, select_targets};

use crate::combat::{ActionRecord, ActionResult, AttackRoll};
use crate::config::BattleConstants;
use crate::effect::{self, EffectContext};
use crate::error::{Result, RuleViolation, ValidationError};
use crate::queue::TurnQueue;
use crate::roster::{AttackInfo, Roster, UnitCatalog};
use crate::types::{AttackEffect, AttackSlot, AttackTargeting, UnitId};
use rand::Rng;
use tracing::debug;

/// A validated attack, ready to be rolled
#[derive(Debug, Clone, PartialEq)]
pub struct AttackPlan {
    pub slot: AttackSlot,
    pub attack: AttackInfo,
    /// Second attack, tried against each target the first one hits
    pub follow_up: Option<AttackInfo>,
    /// Empty for targetless effects
    pub targets: Vec<UnitId>,
}

/// Draw a value in `0..100`; below `accuracy` is a hit
pub fn roll_hit(accuracy: u32, rng: &mut impl Rng) -> (u32, bool) {
    let roll = rng.gen_range(0..100);
    (roll, roll < accuracy)
}

/// Plan one of the actor's own attacks
pub fn plan_unit_attack(
    roster: &Roster,
    queue: &TurnQueue,
    catalog: &UnitCatalog,
    constants: &BattleConstants,
    actor: UnitId,
    requested: Option<UnitId>,
) -> Result<AttackPlan> {
    let unit_type = roster.unit(actor)?.effective_type();
    plan_attack(
        roster,
        queue,
        catalog,
        constants,
        actor,
        AttackSlot::Primary,
        unit_type.base_attack1.clone(),
        unit_type.base_attack2.clone(),
        unit_type.attack_target,
        requested,
    )
}

/// Select targets and check summon/transformation prerequisites
#[allow(clippy::too_many_arguments)]
pub fn plan_attack(
    roster: &Roster,
    queue: &TurnQueue,
    catalog: &UnitCatalog,
    constants: &BattleConstants,
    actor: UnitId,
    slot: AttackSlot,
    attack: AttackInfo,
    follow_up: Option<AttackInfo>,
    mode: AttackTargeting,
    requested: Option<UnitId>,
) -> Result<AttackPlan> {
    match attack.effect {
        AttackEffect::Summon => {
            let unit_type = effect::summon_type(catalog, &attack)?;
            let party = roster
                .party_of(actor)
                .ok_or(ValidationError::UnknownUnit(actor))?;
            if roster.free_slot(party, unit_type.slot_size()).is_none() {
                return Err(RuleViolation::RosterFull(party).into());
            }
        }
        AttackEffect::Transformation => {
            effect::transformation_type(catalog, constants, &attack)?;
        }
        _ => {}
    }
    if let Some(second) = &follow_up {
        if second.effect == AttackEffect::Transformation {
            effect::transformation_type(catalog, constants, second)?;
        }
    }

    let targets = select_targets(roster, queue, actor, attack.effect, mode, requested)?;
    Ok(AttackPlan {
        slot,
        attack,
        follow_up,
        targets,
    })
}

/// Roll and apply a planned attack, one [`ActionResult`] per target
pub fn execute_attack(
    ctx: &mut EffectContext<'_>,
    actor: UnitId,
    plan: &AttackPlan,
    rng: &mut impl Rng,
) -> Result<Vec<ActionResult>> {
    let record = match plan.slot {
        AttackSlot::Item => ActionRecord::UseItem,
        AttackSlot::Primary | AttackSlot::Secondary => ActionRecord::Attack,
    };

    if plan.attack.effect.is_targetless() {
        let mut result = ActionResult::new(actor, record, None);
        result.effects = effect::summon(ctx, actor, &plan.attack)?;
        return Ok(vec![result]);
    }

    let mut results = Vec::with_capacity(plan.targets.len());
    for &target in &plan.targets {
        if !ctx.roster.unit(target)?.is_alive() {
            continue;
        }
        let mut result = ActionResult::new(actor, record, Some(target));

        let hit = resolve_roll(ctx, actor, target, plan.slot, &plan.attack, &mut result, rng)?;
        if hit && ctx.roster.unit(target)?.is_alive() {
            if let Some(second) = &plan.follow_up {
                resolve_roll(ctx, actor, target, AttackSlot::Secondary, second, &mut result, rng)?;
            }
        }

        debug!(summary = %result.summary(), "Attack resolved");
        results.push(result);
    }
    Ok(results)
}

/// One accuracy roll and, on a hit, its effect. Returns whether it hit.
fn resolve_roll(
    ctx: &mut EffectContext<'_>,
    actor: UnitId,
    target: UnitId,
    slot: AttackSlot,
    attack: &AttackInfo,
    result: &mut ActionResult,
    rng: &mut impl Rng,
) -> Result<bool> {
    let (roll, hit) = roll_hit(attack.accuracy, rng);
    let mut record = AttackRoll {
        slot,
        attack: attack.name.clone(),
        roll,
        hit,
        negated: false,
    };

    if hit {
        let power = match slot {
            AttackSlot::Item => attack.power,
            AttackSlot::Primary | AttackSlot::Secondary => {
                let level = ctx.roster.unit(actor)?.effective_level();
                attack.power_at_level(level, ctx.constants.leveling.power_per_level)
            }
        };

        let magnitude = if attack.effect.is_friendly() {
            Mitigation::Applies(power)
        } else {
            let defender = ctx.roster.unit(target)?.effective_type();
            mitigate(defender, attack, power, &ctx.constants.shields)
        };

        match magnitude {
            Mitigation::Immune => record.negated = true,
            Mitigation::Applies(amount) => {
                let deltas = effect::apply_effect(ctx, actor, target, attack, amount)?;
                result.effects.extend(deltas);
            }
        }
    }

    result.rolls.push(record);
    Ok(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::EffectDelta;
    use crate::queue::IdentityOrder;
    use crate::roster::unit_type::fixtures::soldier;
    use crate::roster::{Party, UnitInstance, UnitType};
    use crate::types::{AttackSource, PartyId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Arena {
        roster: Roster,
        queue: TurnQueue,
        catalog: UnitCatalog,
        constants: BattleConstants,
    }

    impl Arena {
        fn new(attacker: UnitType, defenders: Vec<UnitType>) -> Self {
            let attackers = Party::new(vec![UnitInstance::new(&attacker, 1, 0)]);
            let defenders = Party::new(
                defenders
                    .iter()
                    .enumerate()
                    .map(|(slot, t)| UnitInstance::new(t, 1, slot))
                    .collect(),
            );
            let roster = Roster::new(attackers, defenders, 6).unwrap();
            let mut queue = TurnQueue::new();
            queue.rebuild(&roster, &mut IdentityOrder).unwrap();
            Arena {
                roster,
                queue,
                catalog: UnitCatalog::from_types(vec![soldier("imp", 5, 20)]).unwrap(),
                constants: BattleConstants::default(),
            }
        }

        fn attack(&mut self, requested: Option<UnitId>, seed: u64) -> Result<Vec<ActionResult>> {
            let plan = plan_unit_attack(
                &self.roster,
                &self.queue,
                &self.catalog,
                &self.constants,
                UnitId(0),
                requested,
            )?;
            let mut ctx = EffectContext {
                roster: &mut self.roster,
                queue: &mut self.queue,
                catalog: &self.catalog,
                constants: &self.constants,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            execute_attack(&mut ctx, UnitId(0), &plan, &mut rng)
        }
    }

    fn with_accuracy(accuracy: u32) -> UnitType {
        let mut unit = soldier("archer", 10, 100);
        unit.base_attack1.accuracy = accuracy;
        unit
    }

    #[test]
    fn test_accuracy_extremes() {
        for seed in 0..20 {
            let mut arena = Arena::new(with_accuracy(100), vec![soldier("orc", 20, 1000)]);
            let results = arena.attack(None, seed).unwrap();
            assert!(results[0].hit());

            let mut arena = Arena::new(with_accuracy(0), vec![soldier("orc", 20, 1000)]);
            let results = arena.attack(None, seed).unwrap();
            assert!(!results[0].hit());
            assert!(results[0].effects.is_empty());
        }
    }

    #[test]
    fn test_everyone_rolls_per_target() {
        let mut mage = with_accuracy(50);
        mage.attack_target = AttackTargeting::Everyone;
        let enemies = vec![soldier("a", 20, 100), soldier("b", 20, 100), soldier("c", 20, 100)];
        let mut arena = Arena::new(mage, enemies);

        let results = arena.attack(None, 7).unwrap();
        assert_eq!(results.len(), 3);
        let targets: Vec<_> = results.iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![Some(UnitId(1)), Some(UnitId(2)), Some(UnitId(3))]);
        for result in &results {
            assert_eq!(result.rolls.len(), 1);
        }
    }

    #[test]
    fn test_second_attack_only_after_hit() {
        let mut spider = with_accuracy(0);
        spider.base_attack2 = Some(
            AttackInfo::new("Venom", AttackSource::Weapon, AttackEffect::Poison, 100).with_power(5),
        );
        let mut arena = Arena::new(spider.clone(), vec![soldier("orc", 20, 100)]);
        let results = arena.attack(None, 1).unwrap();
        assert_eq!(results[0].rolls.len(), 1);

        spider.base_attack1.accuracy = 100;
        let mut arena = Arena::new(spider, vec![soldier("orc", 20, 100)]);
        let results = arena.attack(None, 1).unwrap();
        assert_eq!(results[0].rolls.len(), 2);
        assert_eq!(results[0].rolls[1].slot, AttackSlot::Secondary);
        assert!(results[0].rolls[1].hit);
    }

    #[test]
    fn test_immune_target_is_hit_without_effect() {
        let mut ghost = soldier("ghost", 20, 100);
        ghost.immunities.insert(AttackSource::Weapon);
        let mut arena = Arena::new(with_accuracy(100), vec![ghost]);

        let results = arena.attack(None, 3).unwrap();
        assert!(results[0].hit());
        assert!(results[0].rolls[0].negated);
        assert!(results[0].effects.is_empty());
        assert_eq!(arena.roster.unit(UnitId(1)).unwrap().health, 100);
    }

    #[test]
    fn test_shield_reduces_damage() {
        let mut warden = soldier("warden", 20, 100);
        warden.shields.insert(AttackSource::Weapon);
        let mut arena = Arena::new(with_accuracy(100), vec![warden]);

        let results = arena.attack(None, 3).unwrap();
        assert_eq!(results[0].total_damage(), 13);
    }

    #[test]
    fn test_power_scales_with_level() {
        let mut arena = Arena::new(with_accuracy(100), vec![soldier("orc", 20, 100)]);
        arena.roster.unit_mut(UnitId(0)).unwrap().level = 3;

        let results = arena.attack(None, 3).unwrap();
        assert_eq!(results[0].total_damage(), 30);
    }

    #[test]
    fn test_kill_records_death() {
        let mut arena = Arena::new(with_accuracy(100), vec![soldier("orc", 20, 25)]);
        let results = arena.attack(None, 3).unwrap();

        assert!(results[0].is_killing_blow());
        assert!(results[0]
            .effects
            .contains(&EffectDelta::Died { unit: UnitId(1) }));
        assert_eq!(arena.roster.living_count(PartyId::Defenders), 0);
    }

    #[test]
    fn test_summon_is_targetless() {
        let mut caller = soldier("summoner", 10, 50);
        caller.base_attack1 = AttackInfo::new("Raise", AttackSource::Death, AttackEffect::Summon, 0)
            .with_unit_type("imp");
        let mut arena = Arena::new(caller, vec![soldier("orc", 20, 100)]);

        let results = arena.attack(None, 3).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target, None);
        assert!(results[0].rolls.is_empty());
        assert!(matches!(results[0].effects[0], EffectDelta::Summoned { .. }));
    }

    #[test]
    fn test_full_roster_rejected_before_any_change() {
        let mut caller = soldier("summoner", 10, 50);
        caller.base_attack1 = AttackInfo::new("Raise", AttackSource::Death, AttackEffect::Summon, 100)
            .with_unit_type("imp");
        let mut arena = Arena::new(caller, vec![soldier("orc", 20, 100)]);
        arena.roster = Roster::new(
            Party::new(vec![arena.roster.unit(UnitId(0)).unwrap().clone()]),
            Party::new(vec![arena.roster.unit(UnitId(1)).unwrap().clone()]),
            1,
        )
        .unwrap();

        assert_eq!(
            arena.attack(None, 3),
            Err(RuleViolation::RosterFull(PartyId::Attackers).into())
        );
        assert_eq!(arena.roster.units().len(), 2);
    }
}

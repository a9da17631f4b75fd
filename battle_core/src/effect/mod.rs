//! Effect engine - applies one resolved effect to one unit
//!
//! Every state change is reported as an [`EffectDelta`] so a presentation
//! layer can replay the action without inspecting the roster.

use crate::attack::mitigation::damage_after_defenses;
use crate::combat::EffectDelta;
use crate::config::BattleConstants;
use crate::error::{Result, RuleViolation, ValidationError};
use crate::queue::TurnQueue;
use crate::roster::{AttackInfo, Roster, UnitCatalog, UnitInstance, UnitType};
use crate::status::{Status, StatusKind};
use crate::types::{AttackEffect, UnitId};
use tracing::{debug, info};

/// Mutable battle state an effect may touch
pub struct EffectContext<'a> {
    pub roster: &'a mut Roster,
    pub queue: &'a mut TurnQueue,
    pub catalog: &'a UnitCatalog,
    pub constants: &'a BattleConstants,
}

/// Apply `attack`'s effect with the given post-mitigation magnitude
pub fn apply_effect(
    ctx: &mut EffectContext<'_>,
    actor: UnitId,
    target: UnitId,
    attack: &AttackInfo,
    magnitude: u32,
) -> Result<Vec<EffectDelta>> {
    let constants = ctx.constants;
    let statuses = &constants.statuses;
    let mut deltas = Vec::new();

    match attack.effect {
        AttackEffect::Damage => {
            let unit = ctx.roster.unit_mut(target)?;
            let damage = damage_after_defenses(
                magnitude,
                unit.armour,
                unit.statuses.defend_reduction(),
                &constants.armour,
            );
            let amount = unit.take_damage(damage);
            deltas.push(EffectDelta::Damaged {
                unit: target,
                amount,
                health_after: unit.health,
            });
            if !unit.is_alive() {
                deltas.extend(kill(ctx, target, Some(actor))?);
            }
        }
        AttackEffect::Healing => {
            let unit = ctx.roster.unit_mut(target)?;
            let amount = unit.heal(magnitude);
            deltas.push(EffectDelta::Healed {
                unit: target,
                amount,
                health_after: unit.health,
            });
        }
        AttackEffect::Poison => {
            let status = Status::Poisoned {
                damage: magnitude,
                turns: statuses.poison_turns,
            };
            deltas.push(apply_status(ctx.roster.unit_mut(target)?, target, status));
        }
        AttackEffect::Paralysis => {
            let status = Status::Paralyzed {
                turns: statuses.paralysis_turns,
            };
            deltas.push(apply_status(ctx.roster.unit_mut(target)?, target, status));
        }
        AttackEffect::Fear => {
            let status = Status::Feared {
                turns: statuses.fear_turns,
            };
            deltas.push(apply_status(ctx.roster.unit_mut(target)?, target, status));
        }
        AttackEffect::DecreaseLevel => {
            let status = Status::LeveledDown {
                levels: statuses.level_drain_amount,
                turns: statuses.level_drain_turns,
            };
            deltas.push(apply_status(ctx.roster.unit_mut(target)?, target, status));
        }
        AttackEffect::Cure => {
            let unit = ctx.roster.unit_mut(target)?;
            let removed = unit.statuses.cure();
            for status in &removed {
                deltas.push(EffectDelta::StatusRemoved {
                    unit: target,
                    status: *status,
                });
            }
            if removed.contains(&StatusKind::Transformed) {
                unit.revert_transformation();
                deltas.push(EffectDelta::Reverted { unit: target });
            }
        }
        AttackEffect::DestroyArmour => {
            let unit = ctx.roster.unit_mut(target)?;
            let amount = unit.destroy_armour(magnitude);
            deltas.push(EffectDelta::ArmourDestroyed {
                unit: target,
                amount,
                armour_after: unit.armour,
            });
        }
        AttackEffect::Transformation => {
            let into = transformation_type(ctx.catalog, constants, attack)?.clone();
            let turns = constants.transformation.turns;
            let into_id = into.id.clone();
            ctx.roster.unit_mut(target)?.transform(into, turns);
            deltas.push(EffectDelta::Transformed {
                unit: target,
                into: into_id,
                turns,
            });
        }
        AttackEffect::Summon => {
            deltas.extend(summon(ctx, actor, attack)?);
        }
    }

    Ok(deltas)
}

fn apply_status(unit: &mut UnitInstance, id: UnitId, status: Status) -> EffectDelta {
    let kind = status.kind();
    let change = unit.statuses.apply(status);
    EffectDelta::StatusApplied {
        unit: id,
        status: kind,
        change,
    }
}

/// Unit type a transforming attack turns its target into
pub fn transformation_type<'c>(
    catalog: &'c UnitCatalog,
    constants: &BattleConstants,
    attack: &AttackInfo,
) -> std::result::Result<&'c UnitType, ValidationError> {
    let id = attack
        .unit_type
        .as_deref()
        .unwrap_or(&constants.transformation.default_into);
    catalog.get(id)
}

/// Unit type a summoning attack calls in
pub fn summon_type<'c>(
    catalog: &'c UnitCatalog,
    attack: &AttackInfo,
) -> std::result::Result<&'c UnitType, ValidationError> {
    let id = attack
        .unit_type
        .as_deref()
        .ok_or_else(|| ValidationError::UnknownUnitType("(unspecified)".to_string()))?;
    catalog.get(id)
}

/// Place a new unit in the actor's party
///
/// The unit is not queued; it acts from the next round on.
pub fn summon(ctx: &mut EffectContext<'_>, actor: UnitId, attack: &AttackInfo) -> Result<Vec<EffectDelta>> {
    let party = ctx
        .roster
        .party_of(actor)
        .ok_or(ValidationError::UnknownUnit(actor))?;
    let unit_type = summon_type(ctx.catalog, attack)?;
    let slot = ctx
        .roster
        .free_slot(party, unit_type.slot_size())
        .ok_or(RuleViolation::RosterFull(party))?;

    let level = ctx.roster.unit(actor)?.effective_level();
    let id = ctx
        .roster
        .add_unit(party, UnitInstance::new(unit_type, level, slot));
    info!(summoner = %actor, unit = %id, unit_type = %unit_type.id, slot, "Unit summoned");

    Ok(vec![EffectDelta::Summoned {
        unit: id,
        unit_type: unit_type.id.clone(),
        slot,
    }])
}

/// Death processing: move the unit to the fallen list and out of the queue
///
/// A hostile killer is awarded experience from the victim's table.
pub fn kill(ctx: &mut EffectContext<'_>, victim: UnitId, killer: Option<UnitId>) -> Result<Vec<EffectDelta>> {
    let victim_party = ctx.roster.party_of(victim);
    let (experience, victim_type) = {
        let unit = ctx.roster.unit(victim)?;
        (unit.base.experience_for_level(unit.level), unit.base.id.clone())
    };

    ctx.roster.mark_dead(victim);
    ctx.queue.remove(victim);
    info!(unit = %victim, unit_type = %victim_type, "Unit died");

    let mut deltas = vec![EffectDelta::Died { unit: victim }];

    let Some(killer) = killer else {
        return Ok(deltas);
    };
    let hostile = match (victim_party, ctx.roster.party_of(killer)) {
        (Some(victim_party), Some(killer_party)) => victim_party != killer_party,
        _ => false,
    };
    if hostile && experience > 0 {
        ctx.roster.unit_mut(killer)?.experience += experience;
        debug!(unit = %killer, amount = experience, "Experience gained");
        deltas.push(EffectDelta::ExperienceGained {
            unit: killer,
            amount: experience,
        });
    }

    Ok(deltas)
}

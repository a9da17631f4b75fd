//! Defensive reductions: immunities, shields, armour and the defend stance
//!
//! Order for damage: shield -> armour -> defend stance. Immunity negates the
//! whole effect before any of these apply.

use crate::config::{ArmourConstants, ShieldConstants};
use crate::roster::{AttackInfo, UnitType};

/// What survives a target's immunities and shields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mitigation {
    /// Target is immune; the hit has no effect
    Immune,
    /// Magnitude handed to the effect engine
    Applies(u32),
}

/// Check immunities and shields for a hostile attack
pub fn mitigate(
    target: &UnitType,
    attack: &AttackInfo,
    magnitude: u32,
    shields: &ShieldConstants,
) -> Mitigation {
    if target.is_immune_to(attack.source, attack.effect) {
        return Mitigation::Immune;
    }
    if attack.effect.is_numeric() && target.is_shielded_against(attack.source) {
        let reduction = shields.reduction_for(attack.source);
        return Mitigation::Applies(apply_shield(magnitude, reduction));
    }
    Mitigation::Applies(magnitude)
}

/// Reduce a magnitude by a shield; a positive magnitude never drops to zero
pub fn apply_shield(magnitude: u32, reduction: f64) -> u32 {
    if magnitude == 0 {
        return 0;
    }
    let reduced = (magnitude as f64 * (1.0 - reduction.clamp(0.0, 1.0))).round() as u32;
    reduced.max(1)
}

/// Apply armour percentage and defend stance to incoming damage
pub fn damage_after_defenses(
    damage: u32,
    armour: u32,
    defend_reduction: f64,
    constants: &ArmourConstants,
) -> u32 {
    let armour = armour.min(constants.max).min(100);
    let after_armour = damage as f64 * (100 - armour) as f64 / 100.0;
    let after_defend = after_armour * (1.0 - defend_reduction.clamp(0.0, 1.0));
    after_defend.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::unit_type::fixtures::soldier;
    use crate::types::{AttackEffect, AttackSource};

    fn fireball(power: u32) -> AttackInfo {
        AttackInfo::new("Fireball", AttackSource::Fire, AttackEffect::Damage, 90).with_power(power)
    }

    #[test]
    fn test_immunity_negates() {
        let mut target = soldier("salamander", 30, 80);
        target.immunities.insert(AttackSource::Fire);

        let result = mitigate(&target, &fireball(50), 50, &ShieldConstants::default());
        assert_eq!(result, Mitigation::Immune);
    }

    #[test]
    fn test_shield_reduces_by_configured_fraction() {
        let mut target = soldier("warden", 30, 80);
        target.shields.insert(AttackSource::Fire);

        let mut shields = ShieldConstants::default();
        assert_eq!(
            mitigate(&target, &fireball(50), 50, &shields),
            Mitigation::Applies(25)
        );

        shields.per_source.insert(AttackSource::Fire, 0.8);
        assert_eq!(
            mitigate(&target, &fireball(50), 50, &shields),
            Mitigation::Applies(10)
        );
    }

    #[test]
    fn test_shield_never_fully_negates() {
        assert_eq!(apply_shield(3, 1.0), 1);
        assert_eq!(apply_shield(0, 0.5), 0);
    }

    #[test]
    fn test_shield_ignores_non_numeric_effects() {
        let mut target = soldier("warden", 30, 80);
        target.shields.insert(AttackSource::Mind);
        let fear = AttackInfo::new("Wail", AttackSource::Mind, AttackEffect::Fear, 50);

        assert_eq!(
            mitigate(&target, &fear, 0, &ShieldConstants::default()),
            Mitigation::Applies(0)
        );
    }

    #[test]
    fn test_armour_and_defend() {
        let constants = ArmourConstants::default();
        assert_eq!(damage_after_defenses(100, 0, 0.0, &constants), 100);
        assert_eq!(damage_after_defenses(100, 30, 0.0, &constants), 70);
        assert_eq!(damage_after_defenses(100, 30, 0.5, &constants), 35);
        // Capped at 90%
        assert_eq!(damage_after_defenses(100, 150, 0.0, &constants), 10);
    }
}

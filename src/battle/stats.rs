//! Stat resolution: base unit stats + research + special items -> combat stats
//!
//! Bonuses of one stat stack additively and are applied once with
//! `round(base * (1 + bonus))`. Two multipliers are applied afterwards as a
//! second pass on the already-rounded value: the Crimson Bull dragon attack
//! bonus and the defensive wall bonus. Keeping that order keeps numbers
//! identical to the planner's published tables.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    CRIMSON_BULL_DRAGON_MULTIPLIER, DRAGONRY_BONUS_PER_LEVEL, DRAGON_HEART_ATTACK_BONUS,
    GLOWING_SHIELDS_DEFENSE_BONUS, MAX_RESEARCH_LEVEL, PURPLE_BONES_DRAGON_DEFENSE_BONUS,
    RESEARCH_BONUS_PER_LEVEL, WALL_BASE_MULTIPLIER, WALL_PER_LEVEL,
};
use crate::catalog::{UnitCatalog, UnitClass, UnitType};

/// Research sliders, each 0-10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchLevels {
    pub metallurgy: u8,
    pub medicine: u8,
    pub weapons_calibration: u8,
    pub rapid_deployment: u8,
    pub dragonry: u8,
}

impl ResearchLevels {
    /// Every slider at the same level
    pub fn uniform(level: u8) -> Self {
        Self {
            metallurgy: level,
            medicine: level,
            weapons_calibration: level,
            rapid_deployment: level,
            dragonry: level,
        }
    }

    fn bonus(level: u8, per_level: f64) -> f64 {
        f64::from(level.min(MAX_RESEARCH_LEVEL)) * per_level
    }
}

/// Special item toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialItems {
    /// +20% attack for dragons, applied after all other attack bonuses
    pub crimson_bull: bool,
    /// +20% defense for all troops
    pub glowing_shields: bool,
    /// +100% defense for dragons
    pub purple_bones: bool,
    /// +20% attack for all troops
    pub dragon_heart: bool,
}

impl SpecialItems {
    /// Human-readable list of active items, for the battle log
    pub fn active_descriptions(&self) -> Vec<&'static str> {
        let mut active = Vec::new();
        if self.crimson_bull {
            active.push("Crimson Bull (+20% Dragon Attack)");
        }
        if self.glowing_shields {
            active.push("Glowing Shields (+20% Troop Defense)");
        }
        if self.purple_bones {
            active.push("Purple Bones (+100% Dragon Defense)");
        }
        if self.dragon_heart {
            active.push("Dragon Heart (+20% Troop Attack)");
        }
        active
    }
}

/// Combat stats after research, items and walls
///
/// Recomputed for every battle; never cached across research changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifiedStats {
    pub attack: u32,
    pub defense: u32,
    pub health: u32,
    pub speed: u32,
    pub range: u32,
    pub ranged_attack: u32,
}

fn apply_bonus(base: u32, bonus: f64) -> u32 {
    (f64::from(base) * (1.0 + bonus)).round() as u32
}

fn apply_multiplier(value: u32, multiplier: f64) -> u32 {
    (f64::from(value) * multiplier).round().max(0.0) as u32
}

/// Resolve modified stats for one unit class
pub fn resolve_stats(
    class: &UnitClass,
    research: &ResearchLevels,
    items: &SpecialItems,
) -> ModifiedStats {
    let metallurgy = ResearchLevels::bonus(research.metallurgy, RESEARCH_BONUS_PER_LEVEL);
    let medicine = ResearchLevels::bonus(research.medicine, RESEARCH_BONUS_PER_LEVEL);
    let calibration = ResearchLevels::bonus(research.weapons_calibration, RESEARCH_BONUS_PER_LEVEL);
    let rapid_deployment = ResearchLevels::bonus(research.rapid_deployment, RESEARCH_BONUS_PER_LEVEL);

    let is_dragon = class.category.is_dragon();
    let is_ranged = class.category.is_ranged();

    let mut attack_bonus = metallurgy;
    if items.dragon_heart {
        attack_bonus += DRAGON_HEART_ATTACK_BONUS;
    }

    let mut defense_bonus = metallurgy;
    if items.glowing_shields {
        defense_bonus += GLOWING_SHIELDS_DEFENSE_BONUS;
    }
    if items.purple_bones && is_dragon {
        defense_bonus += PURPLE_BONES_DRAGON_DEFENSE_BONUS;
    }

    let mut speed_bonus = rapid_deployment;
    if is_dragon {
        speed_bonus += ResearchLevels::bonus(research.dragonry, DRAGONRY_BONUS_PER_LEVEL);
    }

    let mut stats = ModifiedStats {
        attack: apply_bonus(class.attack, attack_bonus),
        defense: apply_bonus(class.defense, defense_bonus),
        health: apply_bonus(class.health, medicine),
        speed: apply_bonus(class.speed, speed_bonus),
        range: 0,
        ranged_attack: 0,
    };

    if is_ranged {
        stats.range = apply_bonus(class.range, calibration);
        stats.ranged_attack = apply_bonus(class.ranged_attack, attack_bonus);
    }

    // Second pass on the rounded values
    if items.crimson_bull && is_dragon {
        stats.attack = apply_multiplier(stats.attack, CRIMSON_BULL_DRAGON_MULTIPLIER);
        if is_ranged {
            stats.ranged_attack = apply_multiplier(stats.ranged_attack, CRIMSON_BULL_DRAGON_MULTIPLIER);
        }
    }

    stats
}

/// Resolve stats through the catalog; unknown units fight with all-zero stats
pub fn modified_stats(
    catalog: &UnitCatalog,
    unit: UnitType,
    research: &ResearchLevels,
    items: &SpecialItems,
) -> ModifiedStats {
    catalog
        .get(unit)
        .map(|class| resolve_stats(class, research, items))
        .unwrap_or_default()
}

/// Defensive wall multiplier, applied after every other defense bonus
pub fn wall_multiplier(wall_level: u8) -> f64 {
    WALL_BASE_MULTIPLIER + WALL_PER_LEVEL * f64::from(wall_level)
}

/// Apply a garrison wall to already-resolved stats
pub fn apply_wall(stats: ModifiedStats, wall_level: u8) -> ModifiedStats {
    ModifiedStats {
        defense: apply_multiplier(stats.defense, wall_multiplier(wall_level)),
        ..stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(unit: UnitType, research: ResearchLevels, items: SpecialItems) -> ModifiedStats {
        modified_stats(&UnitCatalog::with_defaults(), unit, &research, &items)
    }

    #[test]
    fn test_no_bonuses_returns_base() {
        let s = stats(UnitType::Halberdier, ResearchLevels::default(), SpecialItems::default());
        assert_eq!(s.attack, 40);
        assert_eq!(s.defense, 40);
        assert_eq!(s.health, 150);
        assert_eq!(s.speed, 300);
        assert_eq!(s.range, 0);
        assert_eq!(s.ranged_attack, 0);
    }

    #[test]
    fn test_metallurgy_ten_adds_fifty_percent() {
        let research = ResearchLevels {
            metallurgy: 10,
            ..Default::default()
        };
        let s = stats(UnitType::Conscript, research, SpecialItems::default());
        assert_eq!(s.attack, 15);
        assert_eq!(s.defense, 15);
        assert_eq!(s.health, 75);
        assert_eq!(s.speed, 200);
    }

    #[test]
    fn test_medicine_only_affects_health() {
        let research = ResearchLevels {
            medicine: 4,
            ..Default::default()
        };
        let s = stats(UnitType::Giant, research, SpecialItems::default());
        assert_eq!(s.health, 4800);
        assert_eq!(s.attack, 1000);
        assert_eq!(s.defense, 400);
    }

    #[test]
    fn test_dragonry_only_speeds_dragons() {
        let research = ResearchLevels {
            dragonry: 5,
            ..Default::default()
        };
        let dragon = stats(UnitType::SwiftStrikeDragon, research, SpecialItems::default());
        let conscript = stats(UnitType::Conscript, research, SpecialItems::default());
        assert_eq!(dragon.speed, 1500);
        assert_eq!(dragon.attack, 150);
        assert_eq!(conscript.speed, 200);
    }

    #[test]
    fn test_rapid_deployment_speeds_everyone() {
        let research = ResearchLevels {
            rapid_deployment: 10,
            ..Default::default()
        };
        assert_eq!(stats(UnitType::Conscript, research, SpecialItems::default()).speed, 300);
    }

    #[test]
    fn test_weapons_calibration_extends_ranged_units() {
        let research = ResearchLevels {
            weapons_calibration: 10,
            metallurgy: 10,
            ..Default::default()
        };
        let bow = stats(UnitType::LongbowMan, research, SpecialItems::default());
        assert_eq!(bow.range, 1800);
        assert_eq!(bow.ranged_attack, 120);

        let mirror = stats(UnitType::FireMirror, research, SpecialItems::default());
        assert_eq!(mirror.range, 2250);
        assert_eq!(mirror.ranged_attack, 1800);

        let melee = stats(UnitType::Minotaur, research, SpecialItems::default());
        assert_eq!(melee.range, 0);
        assert_eq!(melee.ranged_attack, 0);
    }

    #[test]
    fn test_dragon_heart_and_glowing_shields_apply_to_all() {
        let items = SpecialItems {
            dragon_heart: true,
            glowing_shields: true,
            ..Default::default()
        };
        let s = stats(UnitType::Halberdier, ResearchLevels::default(), items);
        assert_eq!(s.attack, 48);
        assert_eq!(s.defense, 48);
    }

    #[test]
    fn test_dragon_only_items() {
        let items = SpecialItems {
            crimson_bull: true,
            purple_bones: true,
            ..Default::default()
        };
        let dragon = stats(UnitType::SwiftStrikeDragon, ResearchLevels::default(), items);
        assert_eq!(dragon.attack, 180);
        assert_eq!(dragon.defense, 120);

        let giant = stats(UnitType::Giant, ResearchLevels::default(), items);
        assert_eq!(giant.attack, 1000);
        assert_eq!(giant.defense, 400);
    }

    #[test]
    fn test_crimson_bull_applies_after_other_attack_bonuses() {
        let research = ResearchLevels {
            metallurgy: 2,
            ..Default::default()
        };
        let items = SpecialItems {
            crimson_bull: true,
            dragon_heart: true,
            ..Default::default()
        };
        // 300 * 1.3 = 390, then 390 * 1.2 = 468
        let s = stats(UnitType::BattleDragon, research, items);
        assert_eq!(s.attack, 468);
    }

    #[test]
    fn test_research_above_ten_is_clamped() {
        let research = ResearchLevels {
            metallurgy: 40,
            ..Default::default()
        };
        assert_eq!(stats(UnitType::Conscript, research, SpecialItems::default()).attack, 15);
    }

    #[test]
    fn test_wall_multiplier() {
        let base = stats(UnitType::Halberdier, ResearchLevels::default(), SpecialItems::default());
        assert_eq!(apply_wall(base, 5).defense, 40);
        assert_eq!(apply_wall(base, 10).defense, 50);
        assert_eq!(apply_wall(base, 0).defense, 30);
        assert_eq!(apply_wall(base, 10).attack, 40);
    }

    #[test]
    fn test_missing_class_resolves_to_zero() {
        let catalog = UnitCatalog::empty();
        let s = modified_stats(
            &catalog,
            UnitType::Giant,
            &ResearchLevels::uniform(10),
            &SpecialItems::default(),
        );
        assert_eq!(s, ModifiedStats::default());
    }
}

//! Target acquisition and tactical target choice
//!
//! Ranged stacks act as snipers and go for the biggest threat. Melee stacks
//! go for the target their attack matches best, which wastes the least
//! damage on overkill.

use std::cmp::Ordering;

use crate::battle::units::BattleUnit;

/// Living enemy stacks within reach of `units[attacker]`, in insertion order
pub fn targets_in_reach(units: &[BattleUnit], attacker: usize) -> Vec<usize> {
    let unit = &units[attacker];
    let enemy = unit.side.opponent();
    units
        .iter()
        .enumerate()
        .filter(|(_, target)| target.is_alive() && target.side == enemy && unit.can_reach(target))
        .map(|(i, _)| i)
        .collect()
}

/// Nearest living enemy stack, first in insertion order on ties
pub fn nearest_enemy(units: &[BattleUnit], attacker: usize) -> Option<usize> {
    let unit = &units[attacker];
    let enemy = unit.side.opponent();
    units
        .iter()
        .enumerate()
        .filter(|(_, target)| target.is_alive() && target.side == enemy)
        .min_by_key(|(_, target)| unit.distance_to(target))
        .map(|(i, _)| i)
}

/// Ranged order: closest, then highest total attack, highest speed,
/// highest total defense, highest total health
fn ranged_priority(unit: &BattleUnit, a: &BattleUnit, b: &BattleUnit) -> Ordering {
    unit.distance_to(a)
        .cmp(&unit.distance_to(b))
        .then_with(|| b.total_attack().cmp(&a.total_attack()))
        .then_with(|| b.stats.speed.cmp(&a.stats.speed))
        .then_with(|| b.total_defense().cmp(&a.total_defense()))
        .then_with(|| b.total_health().cmp(&a.total_health()))
}

/// Melee order: closest, then smallest |attack - defense| gap, lowest speed,
/// lowest total attack, lowest total health
fn melee_priority(unit: &BattleUnit, a: &BattleUnit, b: &BattleUnit) -> Ordering {
    let gap = |target: &BattleUnit| unit.stats.attack.abs_diff(target.stats.defense);

    unit.distance_to(a)
        .cmp(&unit.distance_to(b))
        .then_with(|| gap(a).cmp(&gap(b)))
        .then_with(|| a.stats.speed.cmp(&b.stats.speed))
        .then_with(|| a.total_attack().cmp(&b.total_attack()))
        .then_with(|| a.total_health().cmp(&b.total_health()))
}

/// Pick the single best target among `candidates`
///
/// Full ties resolve to the earliest candidate.
pub fn select_target(units: &[BattleUnit], attacker: usize, candidates: &[usize]) -> Option<usize> {
    let unit = &units[attacker];
    let priority: fn(&BattleUnit, &BattleUnit, &BattleUnit) -> Ordering = if unit.is_ranged() {
        ranged_priority
    } else {
        melee_priority
    };

    candidates
        .iter()
        .copied()
        .filter(|&i| units[i].is_alive())
        .min_by(|&a, &b| priority(unit, &units[a], &units[b]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::stats::ModifiedStats;
    use crate::battle::units::Side;
    use crate::catalog::UnitType;

    fn unit(
        unit_type: UnitType,
        side: Side,
        count: u64,
        attack: u32,
        defense: u32,
        speed: u32,
        position: i64,
    ) -> BattleUnit {
        let stats = ModifiedStats {
            attack,
            defense,
            health: 100,
            speed,
            range: 0,
            ranged_attack: 0,
        };
        BattleUnit::new(unit_type, side, count, stats, position)
    }

    fn archer(position: i64) -> BattleUnit {
        let stats = ModifiedStats {
            attack: 5,
            defense: 30,
            health: 75,
            speed: 250,
            range: 1200,
            ranged_attack: 80,
        };
        BattleUnit::new(UnitType::LongbowMan, Side::Attacker, 100, stats, position)
    }

    #[test]
    fn test_targets_exclude_friends_dead_and_far() {
        let mut units = vec![
            unit(UnitType::Conscript, Side::Attacker, 10, 10, 10, 200, 0),
            unit(UnitType::Spy, Side::Attacker, 10, 5, 5, 150, 0),
            unit(UnitType::Porter, Side::Defender, 10, 1, 10, 100, 1),
            unit(UnitType::Halberdier, Side::Defender, 0, 40, 40, 300, 1),
            unit(UnitType::Giant, Side::Defender, 10, 1000, 400, 120, 5),
        ];
        assert_eq!(targets_in_reach(&units, 0), vec![2]);

        units[2].count = 0;
        assert!(targets_in_reach(&units, 0).is_empty());
        assert_eq!(nearest_enemy(&units, 0), Some(4));
        assert_eq!(nearest_enemy(&units, 4), Some(0));
    }

    #[test]
    fn test_ranged_prefers_highest_threat() {
        let units = vec![
            archer(0),
            unit(UnitType::Porter, Side::Defender, 1000, 1, 10, 100, 500),
            unit(UnitType::Minotaur, Side::Defender, 100, 70, 45, 275, 500),
        ];
        let candidates = targets_in_reach(&units, 0);
        assert_eq!(select_target(&units, 0, &candidates), Some(2));
    }

    #[test]
    fn test_ranged_prefers_closest_first() {
        let units = vec![
            archer(0),
            unit(UnitType::Porter, Side::Defender, 1000, 1, 10, 100, 400),
            unit(UnitType::Minotaur, Side::Defender, 100, 70, 45, 275, 500),
        ];
        let candidates = targets_in_reach(&units, 0);
        assert_eq!(select_target(&units, 0, &candidates), Some(1));
    }

    #[test]
    fn test_melee_prefers_matching_defense() {
        let units = vec![
            unit(UnitType::Halberdier, Side::Attacker, 10, 40, 40, 300, 0),
            unit(UnitType::Conscript, Side::Defender, 10, 10, 10, 200, 0),
            unit(UnitType::Minotaur, Side::Defender, 10, 70, 45, 275, 0),
        ];
        let candidates = targets_in_reach(&units, 0);
        // |40 - 45| = 5 beats |40 - 10| = 30
        assert_eq!(select_target(&units, 0, &candidates), Some(2));
    }

    #[test]
    fn test_melee_tie_breaks_on_lowest_speed() {
        let units = vec![
            unit(UnitType::Conscript, Side::Attacker, 10, 10, 10, 200, 0),
            unit(UnitType::Spy, Side::Defender, 10, 5, 10, 150, 0),
            unit(UnitType::Porter, Side::Defender, 10, 1, 10, 100, 0),
        ];
        let candidates = targets_in_reach(&units, 0);
        assert_eq!(select_target(&units, 0, &candidates), Some(2));
    }

    #[test]
    fn test_full_tie_keeps_insertion_order() {
        let units = vec![
            unit(UnitType::Conscript, Side::Attacker, 10, 10, 10, 200, 0),
            unit(UnitType::Spy, Side::Defender, 10, 5, 10, 150, 0),
            unit(UnitType::Porter, Side::Defender, 10, 5, 10, 150, 0),
        ];
        let candidates = targets_in_reach(&units, 0);
        assert_eq!(select_target(&units, 0, &candidates), Some(1));
    }
}

//! Movement along the one-dimensional battlefield
//!
//! A stack with nothing in reach advances by its speed toward the nearest
//! enemy. It never leaves `[0, battlefield_range]`, never passes a friendly
//! stack in its path and never overshoots the enemy it is closing on.

use crate::battle::targeting::nearest_enemy;
use crate::battle::units::BattleUnit;

/// Result of a movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementResult {
    pub from: i64,
    pub to: i64,
}

/// Where `units[mover]` would end up this turn, if it moves at all
pub fn plan_step(units: &[BattleUnit], mover: usize, battlefield_range: i64) -> Option<i64> {
    let unit = &units[mover];
    if unit.stats.speed == 0 || !unit.is_alive() {
        return None;
    }

    let enemy_pos = units[nearest_enemy(units, mover)?].position;
    let current = unit.position;

    // Turn around if the nearest enemy is behind us
    let mut direction = unit.side.forward();
    if (direction > 0 && current > enemy_pos) || (direction < 0 && current < enemy_pos) {
        direction = -direction;
    }

    let speed = i64::from(unit.stats.speed);
    let mut target = (current + speed * direction).clamp(0, battlefield_range);

    let friends = units
        .iter()
        .enumerate()
        .filter(|&(i, other)| i != mover && other.is_alive() && other.side == unit.side);

    if direction > 0 {
        let blocker = friends
            .filter(|(_, other)| other.position > current && other.position <= target)
            .map(|(_, other)| other.position)
            .min();
        if let Some(position) = blocker {
            target = position - 1;
        }
        target = target.min((enemy_pos - 1).max(0));
    } else {
        let blocker = friends
            .filter(|(_, other)| other.position < current && other.position >= target)
            .map(|(_, other)| other.position)
            .max();
        if let Some(position) = blocker {
            target = position + 1;
        }
        target = target.max((enemy_pos + 1).min(battlefield_range));
    }

    (target != current).then_some(target)
}

/// Move `units[mover]` one step toward the nearest enemy
pub fn advance_toward_nearest(
    units: &mut [BattleUnit],
    mover: usize,
    battlefield_range: i64,
) -> Option<MovementResult> {
    let to = plan_step(units, mover, battlefield_range)?;
    let unit = &mut units[mover];
    let from = unit.position;
    unit.position = to;
    unit.has_moved = true;
    Some(MovementResult { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::stats::ModifiedStats;
    use crate::battle::units::Side;
    use crate::catalog::UnitType;

    fn unit(side: Side, speed: u32, position: i64) -> BattleUnit {
        let stats = ModifiedStats {
            attack: 10,
            defense: 10,
            health: 75,
            speed,
            range: 0,
            ranged_attack: 0,
        };
        BattleUnit::new(UnitType::Conscript, side, 10, stats, position)
    }

    #[test]
    fn test_attacker_advances_by_speed() {
        let mut units = vec![unit(Side::Attacker, 200, 0), unit(Side::Defender, 0, 1200)];
        let moved = advance_toward_nearest(&mut units, 0, 1200).unwrap();
        assert_eq!(moved, MovementResult { from: 0, to: 200 });
        assert!(units[0].has_moved);
    }

    #[test]
    fn test_defender_advances_toward_zero() {
        let mut units = vec![unit(Side::Attacker, 0, 0), unit(Side::Defender, 300, 1200)];
        let moved = advance_toward_nearest(&mut units, 1, 1200).unwrap();
        assert_eq!(moved.to, 900);
    }

    #[test]
    fn test_stops_adjacent_to_enemy() {
        let mut units = vec![unit(Side::Attacker, 1000, 0), unit(Side::Defender, 0, 600)];
        let moved = advance_toward_nearest(&mut units, 0, 1200).unwrap();
        assert_eq!(moved.to, 599);
    }

    #[test]
    fn test_blocked_by_friend() {
        let mut units = vec![
            unit(Side::Attacker, 500, 0),
            unit(Side::Attacker, 0, 300),
            unit(Side::Defender, 0, 1200),
        ];
        let moved = advance_toward_nearest(&mut units, 0, 1200).unwrap();
        assert_eq!(moved.to, 299);
    }

    #[test]
    fn test_zero_speed_never_moves() {
        let units = vec![unit(Side::Attacker, 0, 0), unit(Side::Defender, 0, 1200)];
        assert_eq!(plan_step(&units, 0, 1200), None);
    }

    #[test]
    fn test_no_enemies_no_move() {
        let units = vec![unit(Side::Attacker, 100, 0)];
        assert_eq!(plan_step(&units, 0, 1200), None);
    }

    #[test]
    fn test_turns_around_when_enemy_behind() {
        let units = vec![unit(Side::Attacker, 100, 800), unit(Side::Defender, 0, 200)];
        assert_eq!(plan_step(&units, 0, 1200), Some(700));
    }
}

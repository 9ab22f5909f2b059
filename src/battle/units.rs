//! Battle units: one stack per unit type per side

use serde::{Deserialize, Serialize};

use crate::battle::stats::ModifiedStats;
use crate::catalog::UnitType;

/// Which army a stack fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    /// Direction of advance on the battlefield line
    pub fn forward(self) -> i64 {
        match self {
            Side::Attacker => 1,
            Side::Defender => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Attacker => "Attacker",
            Side::Defender => "Defender",
        }
    }
}

/// A stack of identical troops acting as one combat entity
///
/// Total attack and health scale with `count`. Once `count` reaches zero the
/// stack is inert and skipped by every phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub unit_type: UnitType,
    pub side: Side,
    pub count: u64,
    pub initial_count: u64,
    pub stats: ModifiedStats,
    /// Position on the one-dimensional battlefield
    pub position: i64,
    pub has_moved: bool,
    pub has_attacked: bool,
}

impl BattleUnit {
    pub fn new(unit_type: UnitType, side: Side, count: u64, stats: ModifiedStats, position: i64) -> Self {
        Self {
            unit_type,
            side,
            count,
            initial_count: count,
            stats,
            position,
            has_moved: false,
            has_attacked: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.count > 0
    }

    /// Ranged stacks fire with their ranged attack and target by threat
    pub fn is_ranged(&self) -> bool {
        self.stats.ranged_attack > 0
    }

    /// Per-troop attack used when striking
    pub fn attack_power(&self) -> u32 {
        if self.is_ranged() {
            self.stats.ranged_attack
        } else {
            self.stats.attack
        }
    }

    /// Farthest distance this stack can strike (never below melee reach)
    pub fn reach(&self) -> i64 {
        i64::from(self.stats.range).max(crate::battle::constants::MELEE_REACH)
    }

    pub fn distance_to(&self, other: &BattleUnit) -> i64 {
        (self.position - other.position).abs()
    }

    pub fn can_reach(&self, other: &BattleUnit) -> bool {
        self.distance_to(other) <= self.reach()
    }

    pub fn total_attack(&self) -> u64 {
        self.count * u64::from(self.stats.attack)
    }

    pub fn total_defense(&self) -> u64 {
        self.count * u64::from(self.stats.defense)
    }

    pub fn total_health(&self) -> u64 {
        self.count * u64::from(self.stats.health)
    }

    pub fn reset_turn_flags(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
    }
}

//! Battle and search constants - all tunable values in one place
//!
//! Percentages are expressed as fractions (0.05 = 5%) and stack additively
//! before being applied once.

// Research: bonus per slider level
pub const RESEARCH_BONUS_PER_LEVEL: f64 = 0.05;
pub const DRAGONRY_BONUS_PER_LEVEL: f64 = 0.10;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;
pub const MAX_RESEARCH_LEVEL: u8 = 10;

// Special items
pub const DRAGON_HEART_ATTACK_BONUS: f64 = 0.20;
pub const GLOWING_SHIELDS_DEFENSE_BONUS: f64 = 0.20;
pub const PURPLE_BONES_DRAGON_DEFENSE_BONUS: f64 = 1.00;
pub const CRIMSON_BULL_DRAGON_MULTIPLIER: f64 = 1.20;

// Walls: defense x (WALL_BASE + WALL_PER_LEVEL x level)
pub const WALL_BASE_MULTIPLIER: f64 = 0.75;
pub const WALL_PER_LEVEL: f64 = 0.05;

// Damage
pub const MIN_ATTACK_DEFENSE_RATIO: f64 = 0.3;
pub const MAX_ATTACK_DEFENSE_RATIO: f64 = 2.1;
pub const MIN_RNG: f64 = 0.8;
pub const MAX_RNG: f64 = 1.2;
pub const MELEE_REACH: i64 = 1;

// Seeded damage sequence (linear congruential, keyed by seed/round/turn)
pub const RNG_ROUND_STRIDE: u64 = 10;
pub const RNG_MULTIPLIER: u64 = 9301;
pub const RNG_INCREMENT: u64 = 49297;
pub const RNG_MODULUS: u64 = 233280;

// An attack at or above this share of its potential ends the unit's turn
pub const EFFICIENT_ATTACK_PERCENT: f64 = 20.0;
// An attack at or below this share achieved nothing and ends the turn
pub const NEGLIGIBLE_ATTACK_PERCENT: f64 = 0.001;

// Termination
pub const MAX_ROUNDS: u32 = 50;
pub const MAX_ATTACKS_PER_TURN: u32 = 50;

// Search
pub const DEFAULT_INITIAL_BOUND: u64 = 100_000;
pub const DEFAULT_MAX_BOUND: u64 = 10_000_000;
pub const DEFAULT_MAX_DOUBLING_ATTEMPTS: u32 = 5;
pub const DEFAULT_MAX_PROBES: u32 = 20;

// Debug output covers only the opening draws of a battle
pub const DEBUG_DRAW_LIMIT: u64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_window_ordered() {
        assert!(MIN_RNG < 1.0 && 1.0 < MAX_RNG);
    }

    #[test]
    fn test_ratio_window_ordered() {
        assert!(MIN_ATTACK_DEFENSE_RATIO < MAX_ATTACK_DEFENSE_RATIO);
    }

    #[test]
    fn test_wall_level_five_is_neutral() {
        let multiplier = WALL_BASE_MULTIPLIER + WALL_PER_LEVEL * 5.0;
        assert!((multiplier - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_bounds_ordered() {
        assert!(DEFAULT_INITIAL_BOUND < DEFAULT_MAX_BOUND);
        assert!(DEFAULT_MAX_DOUBLING_ATTEMPTS < DEFAULT_MAX_PROBES);
    }
}

//! Damage multiplier sources
//!
//! Every attack draws one multiplier in [0.8, 1.2]. The resolver only sees the
//! [`DamageRng`] trait, so the sequence can be swapped without touching the
//! combat rules. Reproducibility is fully captured by `(mode, seed, round,
//! turn counter)`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    MAX_RNG, MIN_RNG, RNG_INCREMENT, RNG_MODULUS, RNG_MULTIPLIER, RNG_ROUND_STRIDE,
};

/// Source of per-attack damage multipliers
pub trait DamageRng: Send {
    /// Notify the source that a new round started
    fn begin_round(&mut self, _round: u32) {}

    /// Next multiplier, always within [0.8, 1.2]
    fn next(&mut self) -> f64;
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The planner's seeded sequence
///
/// `key = seed + round * 10 + turn`, then
/// `0.8 + 0.4 * ((key * 9301 + 49297) mod 233280) / 233280`, rounded to 0.01.
/// The turn counter advances on every draw for the whole battle.
#[derive(Debug, Clone)]
pub struct SeededDamageRng {
    seed: u64,
    round: u32,
    turn: u64,
}

impl SeededDamageRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            round: 0,
            turn: 0,
        }
    }

    /// Sample for an explicit `(round, turn)` without advancing state
    pub fn sample(seed: u64, round: u32, turn: u64) -> f64 {
        let key = u128::from(seed) + u128::from(round) * u128::from(RNG_ROUND_STRIDE) + u128::from(turn);
        let residue = (key * u128::from(RNG_MULTIPLIER) + u128::from(RNG_INCREMENT))
            % u128::from(RNG_MODULUS);
        let fraction = residue as f64 / RNG_MODULUS as f64;
        round_to_hundredths(MIN_RNG + (MAX_RNG - MIN_RNG) * fraction).clamp(MIN_RNG, MAX_RNG)
    }
}

impl DamageRng for SeededDamageRng {
    fn begin_round(&mut self, round: u32) {
        self.round = round;
    }

    fn next(&mut self) -> f64 {
        let value = Self::sample(self.seed, self.round, self.turn);
        self.turn += 1;
        value
    }
}

/// Constant multiplier; makes a battle insensitive to the seed
#[derive(Debug, Clone, Copy)]
pub struct FixedDamageRng {
    value: f64,
}

impl FixedDamageRng {
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() { value } else { 1.0 };
        Self {
            value: value.clamp(MIN_RNG, MAX_RNG),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl DamageRng for FixedDamageRng {
    fn next(&mut self) -> f64 {
        self.value
    }
}

/// ChaCha-backed alternative sequence
#[derive(Debug, Clone)]
pub struct ChaChaDamageRng {
    rng: ChaCha8Rng,
}

impl ChaChaDamageRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DamageRng for ChaChaDamageRng {
    fn next(&mut self) -> f64 {
        round_to_hundredths(self.rng.gen_range(MIN_RNG..=MAX_RNG))
    }
}

/// Which multiplier source a battle uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum RngMode {
    /// The planner's seeded sequence
    Seeded,
    /// Fixed override, clamped to [0.8, 1.2]
    Fixed(f64),
    /// Seeded ChaCha8 stream
    ChaCha,
}

/// RNG mode plus seed; fully determines every multiplier of a battle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RngSpec {
    pub mode: RngMode,
    pub seed: u64,
}

impl RngSpec {
    pub fn seeded(seed: u64) -> Self {
        Self {
            mode: RngMode::Seeded,
            seed,
        }
    }

    pub fn fixed(value: f64, seed: u64) -> Self {
        Self {
            mode: RngMode::Fixed(FixedDamageRng::new(value).value()),
            seed,
        }
    }

    /// Interpret the UI's override field
    ///
    /// Empty selects the seeded sequence; anything else is parsed as a float,
    /// falling back to 1.0 when unparsable, and clamped to [0.8, 1.2].
    pub fn from_override(text: &str, seed: u64) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::seeded(seed);
        }
        let value = text.parse::<f64>().ok().filter(|v| *v != 0.0).unwrap_or(1.0);
        Self::fixed(value, seed)
    }

    /// Fixed override value, if any
    pub fn override_value(&self) -> Option<f64> {
        match self.mode {
            RngMode::Fixed(value) => Some(value),
            _ => None,
        }
    }

    /// Build a fresh multiplier source for one battle
    pub fn build(&self) -> Box<dyn DamageRng> {
        match self.mode {
            RngMode::Seeded => Box::new(SeededDamageRng::new(self.seed)),
            RngMode::Fixed(value) => Box::new(FixedDamageRng::new(value)),
            RngMode::ChaCha => Box::new(ChaChaDamageRng::new(self.seed)),
        }
    }
}

impl Default for RngSpec {
    fn default() -> Self {
        Self::seeded(0)
    }
}

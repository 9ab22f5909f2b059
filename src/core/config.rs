//! Simulator configuration with documented limits
//!
//! Every cap that bounds the cost of a battle, an optimization or a sweep is
//! collected here. Defaults reproduce the planner's published behaviour, so
//! changing them changes the numbers a sweep reports.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    DEFAULT_INITIAL_BOUND, DEFAULT_MAX_BOUND, DEFAULT_MAX_DOUBLING_ATTEMPTS, DEFAULT_MAX_PROBES,
    MAX_ATTACKS_PER_TURN, MAX_LEVEL, MAX_ROUNDS, MIN_LEVEL,
};
use crate::core::error::{Result, SimError};

/// Top-level configuration for the resolver and the search layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub battle: BattleConfig,
    pub search: SearchConfig,
    pub sweep: SweepConfig,
}

/// Termination caps for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Rounds played before the battle is declared a draw
    pub max_rounds: u32,

    /// Attacks a single unit may chain inside one turn
    ///
    /// A unit keeps attacking while its strikes are inefficient (mopping up
    /// stragglers). This cap guarantees the turn terminates.
    pub max_attacks_per_turn: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_ROUNDS,
            max_attacks_per_turn: MAX_ATTACKS_PER_TURN,
        }
    }
}

/// Limits for the bound finder and the binary search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// First troop count tried when looking for an upper bound
    pub initial_bound: u64,

    /// Largest troop count ever probed
    ///
    /// Also the fallback bound when doubling never produced a zero-loss win.
    pub max_bound: u64,

    /// Doubling probes before giving up and falling back to `max_bound`
    pub max_doubling_attempts: u32,

    /// Total resolver invocations per optimization, bound finding included
    ///
    /// At 20 probes a single optimization costs at most 20 battles, which
    /// keeps a full sweep (10 x 10 x units cells) predictable.
    pub max_probes: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_bound: DEFAULT_INITIAL_BOUND,
            max_bound: DEFAULT_MAX_BOUND,
            max_doubling_attempts: DEFAULT_MAX_DOUBLING_ATTEMPTS,
            max_probes: DEFAULT_MAX_PROBES,
        }
    }
}

/// Grid shape and worker pool for the research x target sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub research_levels: Vec<u8>,
    pub target_levels: Vec<u8>,

    /// Worker threads for the sweep; `None` uses rayon's global pool
    pub threads: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            research_levels: level_range().collect(),
            target_levels: level_range().collect(),
            threads: None,
        }
    }
}

fn level_range() -> RangeInclusive<u8> {
    MIN_LEVEL..=MAX_LEVEL
}

impl SimulatorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.battle.max_rounds == 0 {
            return Err(SimError::InvalidConfig("max_rounds must be positive".into()));
        }
        if self.battle.max_attacks_per_turn == 0 {
            return Err(SimError::InvalidConfig(
                "max_attacks_per_turn must be positive".into(),
            ));
        }

        let search = &self.search;
        if search.initial_bound == 0 {
            return Err(SimError::InvalidConfig("initial_bound must be positive".into()));
        }
        if search.initial_bound > search.max_bound {
            return Err(SimError::InvalidConfig(format!(
                "initial_bound ({}) should be <= max_bound ({})",
                search.initial_bound, search.max_bound
            )));
        }
        if search.max_probes == 0 {
            return Err(SimError::InvalidConfig("max_probes must be positive".into()));
        }

        for level in self
            .sweep
            .research_levels
            .iter()
            .chain(self.sweep.target_levels.iter())
        {
            if !level_range().contains(level) {
                return Err(SimError::InvalidConfig(format!(
                    "sweep level {} outside {}..={}",
                    level, MIN_LEVEL, MAX_LEVEL
                )));
            }
        }
        if self.sweep.threads == Some(0) {
            return Err(SimError::InvalidConfig("threads must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.battle.max_rounds, 50);
        assert_eq!(config.search.max_probes, 20);
        assert_eq!(config.sweep.research_levels.len(), 10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulatorConfig::from_toml_str(
            r#"
            [search]
            max_probes = 30

            [sweep]
            target_levels = [1, 2, 3]
            threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.search.max_probes, 30);
        assert_eq!(config.search.initial_bound, 100_000);
        assert_eq!(config.sweep.target_levels, vec![1, 2, 3]);
        assert_eq!(config.sweep.threads, Some(2));
        assert_eq!(config.battle, BattleConfig::default());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = SimulatorConfig::from_toml_str(
            r#"
            [search]
            initial_bound = 500
            max_bound = 100
            "#,
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_sweep_level_out_of_range_rejected() {
        let mut config = SimulatorConfig::default();
        config.sweep.research_levels.push(11);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = SimulatorConfig::from_toml_str("[search\nmax_probes = ");
        assert!(matches!(result, Err(SimError::TomlError(_))));
    }
}

//! Battle system - one-dimensional stack-versus-stack combat
//!
//! Key properties:
//! - Each unit type fights as one stack per side
//! - Stacks act in speed order, fastest first, once per round
//! - Damage is deterministic given the RNG mode and seed
//! - A battle never fails on numbers, only on missing configuration

pub mod constants;
pub mod execution;
pub mod log;
pub mod movement;
pub mod rng;
pub mod stats;
pub mod targeting;
pub mod units;

// Re-exports for convenient access
pub use constants::*;
pub use execution::{
    BattleOutcome, BattlePhase, BattleResolver, BattleSetup, Defenders, Winner,
};
pub use log::{group_thousands, BattleLog, LogLine, LogTag};
pub use movement::{advance_toward_nearest, plan_step, MovementResult};
pub use rng::{
    ChaChaDamageRng, DamageRng, FixedDamageRng, RngMode, RngSpec, SeededDamageRng,
};
pub use stats::{
    apply_wall, modified_stats, resolve_stats, wall_multiplier, ModifiedStats, ResearchLevels,
    SpecialItems,
};
pub use targeting::{nearest_enemy, select_target, targets_in_reach};
pub use units::{BattleUnit, Side};

pub mod config;
pub mod error;

pub use config::{BattleConfig, SearchConfig, SimulatorConfig, SweepConfig};
pub use error::{Result, SimError};

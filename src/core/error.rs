use thiserror::Error;

use crate::catalog::Terrain;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Could not determine defender troops: no garrison for {terrain} level {level}")]
    UnknownGarrison { terrain: Terrain, level: u8 },

    #[error("Defending force is empty")]
    EmptyDefenders,

    #[error("Unknown unit type: {0}")]
    UnknownUnit(String),

    #[error("Unknown terrain: {0}")]
    UnknownTerrain(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration error raised inside an optimization, already worded for the user
    #[error("{0}")]
    OptimizationFailed(String),

    #[error("Catalog error: {0}")]
    CatalogParse(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    /// Configuration errors are reported to the caller and never abort a sweep
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimError::UnknownGarrison { .. }
                | SimError::EmptyDefenders
                | SimError::UnknownUnit(_)
                | SimError::UnknownTerrain(_)
                | SimError::InvalidConfig(_)
                | SimError::OptimizationFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

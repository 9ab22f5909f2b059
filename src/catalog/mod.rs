//! Static game data: unit classes, force compositions and environment garrisons
//!
//! Tables are built once and passed by reference into the resolver and the
//! search layers.

pub mod composition;
pub mod garrison;
pub mod unit_type;

pub use composition::Composition;
pub use garrison::{GarrisonTable, Terrain};
pub use unit_type::{UnitCatalog, UnitCategory, UnitClass, UnitType};

//! Troop optimization - minimum zero-loss counts
//!
//! Layers, bottom-up:
//! - probe: one battle per candidate count, charged to a shared budget
//! - bound: doubling search for an upper limit
//! - search: binary search for the exact minimum
//! - sweep: the full research x target x unit matrix, in parallel

pub mod bound;
pub mod cancel;
pub mod probe;
pub mod scenario;
pub mod search;
pub mod sweep;

pub use bound::{find_upper_bound, UpperBound};
pub use cancel::CancelToken;
pub use probe::{ProbeSession, ProbeStop, ProbeVerdict, ResolverProbe, ZeroLossProbe};
pub use scenario::Scenario;
pub use search::{
    minimize_for_zero_losses, optimize, search_with_probe, OptimizationOutcome,
    OptimizationResult, SearchOutcome,
};
pub use sweep::{sweep_all, SweepCell, SweepEntry, SweepResult, SweepTemplate};

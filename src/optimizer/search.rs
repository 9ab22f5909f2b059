//! Minimum zero-loss troop count search
//!
//! Bound finding and binary search share one probe budget. A search that runs
//! out of probes reports the best count it confirmed, never an unconfirmed
//! guess.

use serde::{Deserialize, Serialize};

use crate::battle::execution::BattleResolver;
use crate::battle::log::group_thousands;
use crate::catalog::UnitType;
use crate::core::config::SearchConfig;
use crate::optimizer::bound::{find_upper_bound, UpperBound};
use crate::optimizer::cancel::CancelToken;
use crate::optimizer::probe::{ProbeSession, ProbeStop, ResolverProbe, ZeroLossProbe};
use crate::optimizer::scenario::Scenario;

const NOT_FOUND_MESSAGE: &str = "No minimum found within reasonable limits";

/// Binary search result before it is wrapped for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Smallest count confirmed to win without losses
    pub best: Option<u64>,
    /// The search range collapsed before the probe budget ran out
    pub converged: bool,
}

/// How an optimization ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum OptimizationOutcome {
    /// `minimum` is the exact minimum when `converged`, else the best
    /// confirmed count seen before the probe cap
    Found { minimum: u64, converged: bool },
    NotFound,
    ConfigurationError { message: String },
    Cancelled,
}

/// Result of a single optimization, with its audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub unit_name: String,
    pub outcome: OptimizationOutcome,
    pub bound: Option<UpperBound>,
    pub probes: u32,
    pub log: Vec<String>,
}

impl OptimizationResult {
    pub fn success(&self) -> bool {
        matches!(self.outcome, OptimizationOutcome::Found { .. })
    }

    pub fn minimum(&self) -> Option<u64> {
        match self.outcome {
            OptimizationOutcome::Found { minimum, .. } => Some(minimum),
            _ => None,
        }
    }

    /// One-line summary for callers that do not want the full log
    pub fn message(&self) -> String {
        match &self.outcome {
            OptimizationOutcome::Found {
                minimum,
                converged: true,
            } => format!("Found minimum: {} troops", group_thousands(*minimum)),
            OptimizationOutcome::Found {
                minimum,
                converged: false,
            } => format!("At most {} troops (search did not converge)", group_thousands(*minimum)),
            OptimizationOutcome::NotFound => NOT_FOUND_MESSAGE.to_string(),
            OptimizationOutcome::ConfigurationError { message } => message.clone(),
            OptimizationOutcome::Cancelled => "Optimization cancelled".to_string(),
        }
    }
}

/// Integer binary search in `[1, bound]`
///
/// A confirmed bound is already a candidate, so only `[1, bound - 1]` is
/// searched. Running out of probes ends the search unconverged.
pub fn minimize_for_zero_losses(
    session: &mut ProbeSession<'_>,
    bound: UpperBound,
) -> std::result::Result<SearchOutcome, ProbeStop> {
    let mut low = 1u64;
    let mut high = bound.value;
    let mut best = None;
    if bound.confirmed {
        best = Some(bound.value);
        high = bound.value.saturating_sub(1);
    }

    session.log(format!("Starting binary search between {} and {}", low, high));

    while low <= high {
        let mid = low + (high - low) / 2;
        let verdict = match session.run(mid) {
            Ok(verdict) => verdict,
            Err(ProbeStop::Exhausted) => {
                session.log(format!("Probe limit reached after {} probes", session.used()));
                return Ok(SearchOutcome {
                    best,
                    converged: false,
                });
            }
            Err(stop) => return Err(stop),
        };

        if verdict.is_zero_loss() {
            best = Some(mid);
            high = mid - 1;
            session.log(format!("Found zero losses at {}, searching lower...", mid));
        } else {
            low = mid + 1;
            session.log(format!("No zero losses at {}, searching higher...", mid));
        }
    }

    Ok(SearchOutcome {
        best,
        converged: true,
    })
}

/// Bound finding followed by binary search on an arbitrary probe
pub fn search_with_probe(
    probe: &dyn ZeroLossProbe,
    header: Vec<String>,
    config: &SearchConfig,
    cancel: Option<&CancelToken>,
) -> OptimizationResult {
    let mut session = ProbeSession::new(probe, config.max_probes);
    if let Some(token) = cancel {
        session = session.with_cancel(token);
    }
    for line in header {
        session.log(line);
    }

    let unit_name = probe.unit_name();
    let mut bound = None;
    let searched = find_upper_bound(&mut session, config).and_then(|found| {
        bound = Some(found);
        minimize_for_zero_losses(&mut session, found)
    });

    let outcome = match searched {
        Ok(SearchOutcome {
            best: Some(minimum),
            converged,
        }) => {
            session.log("");
            if converged {
                session.log(format!("MINIMUM FOUND: {}x {}", group_thousands(minimum), unit_name));
            } else {
                session.log(format!(
                    "Best confirmed count (search did not converge): {}x {}",
                    group_thousands(minimum),
                    unit_name
                ));
            }
            OptimizationOutcome::Found { minimum, converged }
        }
        Ok(SearchOutcome { best: None, .. }) | Err(ProbeStop::Exhausted) => {
            session.log("");
            session.log(NOT_FOUND_MESSAGE);
            session.log("Try increasing the upper bound or using different troops/research");
            OptimizationOutcome::NotFound
        }
        Err(ProbeStop::Cancelled) => {
            session.log("Optimization cancelled");
            OptimizationOutcome::Cancelled
        }
        Err(ProbeStop::Failed(err)) => {
            let message = err.to_string();
            session.log(format!("ERROR: {}", message));
            OptimizationOutcome::ConfigurationError { message }
        }
    };

    let probes = session.used();
    OptimizationResult {
        unit_name,
        outcome,
        bound,
        probes,
        log: session.into_log(),
    }
}

/// Minimum count of `unit` that beats `scenario` without losing a single troop
pub fn optimize(
    resolver: &BattleResolver<'_>,
    scenario: &Scenario,
    unit: UnitType,
    config: &SearchConfig,
    cancel: Option<&CancelToken>,
) -> OptimizationResult {
    let probe = ResolverProbe::new(resolver, scenario, unit);
    let header = vec![
        "=== OPTIMIZATION RESULTS ===".to_string(),
        format!("Finding minimum {} count for zero losses...", probe.unit_name()),
        format!("Target: {}", scenario.defenders.describe()),
        format!("RNG Override: {}", scenario.rng_label()),
        format!("Seed: {}", scenario.rng.seed),
        String::new(),
    ];

    let result = search_with_probe(&probe, header, config, cancel);
    tracing::info!(
        "Optimized {} against {}: {} after {} probes",
        result.unit_name,
        scenario.defenders.describe(),
        result.message(),
        result.probes
    );
    result
}

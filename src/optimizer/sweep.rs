//! Research level x target level x unit type sweep
//!
//! Every cell is an independent optimization over a scenario of its own.
//! Cells share nothing but the read-only tables behind the resolver, so they
//! run in parallel on rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::battle::execution::{BattleResolver, Defenders};
use crate::battle::log::group_thousands;
use crate::battle::rng::RngSpec;
use crate::battle::stats::{ResearchLevels, SpecialItems};
use crate::catalog::{Terrain, UnitType};
use crate::core::config::{SearchConfig, SweepConfig};
use crate::core::error::{Result, SimError};
use crate::optimizer::cancel::CancelToken;
use crate::optimizer::scenario::Scenario;
use crate::optimizer::search::{optimize, OptimizationOutcome};

/// Inputs shared by every sweep cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTemplate {
    pub terrain: Terrain,
    pub items: SpecialItems,
    pub rng: RngSpec,
}

impl SweepTemplate {
    fn scenario(&self, research_level: u8, target_level: u8) -> Scenario {
        Scenario::new(
            Defenders::garrison(self.terrain, target_level),
            ResearchLevels::uniform(research_level),
            self.items,
            self.rng,
        )
    }
}

/// One sweep result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SweepCell {
    /// `exact` is false when the probe budget ran out first; `count` is then
    /// the best confirmed count, an upper limit on the true minimum
    Minimum { count: u64, exact: bool },
    NotPossible,
    /// The cell could not be set up (e.g. no garrison for that level)
    Unavailable(String),
}

impl SweepCell {
    pub fn label(&self) -> String {
        match self {
            SweepCell::Minimum { count, exact: true } => group_thousands(*count),
            SweepCell::Minimum { count, exact: false } => format!("≤{}", group_thousands(*count)),
            SweepCell::NotPossible => "Not Possible".to_string(),
            SweepCell::Unavailable(_) => "n/a".to_string(),
        }
    }
}

/// A cell with its coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub research_level: u8,
    pub target_level: u8,
    pub unit: UnitType,
    pub cell: SweepCell,
    pub probes: u32,
}

/// The full matrix, in research level, target level, unit order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub template: SweepTemplate,
    pub units: Vec<UnitType>,
    pub research_levels: Vec<u8>,
    pub target_levels: Vec<u8>,
    pub entries: Vec<SweepEntry>,
}

impl SweepResult {
    pub fn get(&self, research_level: u8, target_level: u8, unit: UnitType) -> Option<&SweepCell> {
        self.entries
            .iter()
            .find(|e| e.research_level == research_level && e.target_level == target_level && e.unit == unit)
            .map(|e| &e.cell)
    }

    pub fn total_probes(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.probes)).sum()
    }

    /// One text table per research level
    pub fn render_table(&self, names: impl Fn(UnitType) -> String) -> String {
        let headers: Vec<String> = self.units.iter().map(|&u| names(u)).collect();
        let mut out = String::new();
        out.push_str(&format!(
            "Target: {} (Levels {})\n",
            self.template.terrain.display_name(),
            level_span(&self.target_levels)
        ));
        let rng = match self.template.rng.override_value() {
            Some(value) => format!("{:.2}", value),
            None => "Random".to_string(),
        };
        out.push_str(&format!("RNG Override: {} | Seed: {}\n", rng, self.template.rng.seed));

        for &research in &self.research_levels {
            let mut rows = vec![std::iter::once("Level".to_string())
                .chain(headers.iter().cloned())
                .collect::<Vec<_>>()];
            for &target in &self.target_levels {
                let mut row = vec![target.to_string()];
                for &unit in &self.units {
                    row.push(self.get(research, target, unit).map_or_else(String::new, SweepCell::label));
                }
                rows.push(row);
            }

            let widths: Vec<usize> = (0..rows[0].len())
                .map(|col| rows.iter().map(|r| r[col].len()).max().unwrap_or(0))
                .collect();

            out.push_str(&format!("\nResearch Level {}\n", research));
            for row in rows {
                let line = row
                    .iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                    .collect::<Vec<_>>()
                    .join(" | ");
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

fn level_span(levels: &[u8]) -> String {
    match (levels.iter().min(), levels.iter().max()) {
        (Some(lo), Some(hi)) => format!("{}-{}", lo, hi),
        _ => "none".to_string(),
    }
}

/// Run the whole sweep
///
/// Fails only when cancelled or when the worker pool cannot be built;
/// unavailable and impossible cells are recorded in the result.
pub fn sweep_all(
    resolver: &BattleResolver<'_>,
    template: &SweepTemplate,
    search: &SearchConfig,
    sweep: &SweepConfig,
    cancel: Option<&CancelToken>,
) -> Result<SweepResult> {
    let units = resolver.catalog().combat_units();
    let cells: Vec<(u8, u8, UnitType)> = sweep
        .research_levels
        .iter()
        .flat_map(|&research| {
            let units = &units;
            sweep
                .target_levels
                .iter()
                .flat_map(move |&target| units.iter().map(move |&unit| (research, target, unit)))
        })
        .collect();

    tracing::info!(
        "Sweeping {} cells ({} research levels x {} target levels x {} units) against {}",
        cells.len(),
        sweep.research_levels.len(),
        sweep.target_levels.len(),
        units.len(),
        template.terrain
    );

    let run_cells = || -> Vec<Option<SweepEntry>> {
        cells
            .par_iter()
            .map(|&(research, target, unit)| run_cell(resolver, template, search, cancel, research, target, unit))
            .collect()
    };

    let results = match sweep.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| SimError::InvalidConfig(format!("worker pool: {}", e)))?;
            pool.install(run_cells)
        }
        None => run_cells(),
    };

    if cancel.is_some_and(CancelToken::is_cancelled) {
        tracing::info!("Sweep cancelled");
        return Err(SimError::Cancelled);
    }

    let entries: Vec<SweepEntry> = results.into_iter().collect::<Option<_>>().ok_or(SimError::Cancelled)?;
    let result = SweepResult {
        template: template.clone(),
        units,
        research_levels: sweep.research_levels.clone(),
        target_levels: sweep.target_levels.clone(),
        entries,
    };
    tracing::info!("Sweep finished: {} battles simulated", result.total_probes());
    Ok(result)
}

/// One cell; `None` when cancelled
fn run_cell(
    resolver: &BattleResolver<'_>,
    template: &SweepTemplate,
    search: &SearchConfig,
    cancel: Option<&CancelToken>,
    research_level: u8,
    target_level: u8,
    unit: UnitType,
) -> Option<SweepEntry> {
    let scenario = template.scenario(research_level, target_level);
    let result = optimize(resolver, &scenario, unit, search, cancel);

    let cell = match result.outcome {
        OptimizationOutcome::Found { minimum, converged } => SweepCell::Minimum {
            count: minimum,
            exact: converged,
        },
        OptimizationOutcome::NotFound => SweepCell::NotPossible,
        OptimizationOutcome::ConfigurationError { message } => {
            tracing::warn!(
                "Research {} / level {} / {}: {}",
                research_level,
                target_level,
                unit,
                message
            );
            SweepCell::Unavailable(message)
        }
        OptimizationOutcome::Cancelled => return None,
    };

    Some(SweepEntry {
        research_level,
        target_level,
        unit,
        cell,
        probes: result.probes,
    })
}

//! Probing: one resolver run per candidate troop count
//!
//! The search layers only see the [`ZeroLossProbe`] trait. Production code
//! uses [`ResolverProbe`]; tests substitute a synthetic threshold so search
//! correctness can be checked without running battles.

use serde::{Deserialize, Serialize};

use crate::battle::execution::{BattleResolver, Winner};
use crate::battle::log::group_thousands;
use crate::catalog::UnitType;
use crate::core::error::{Result, SimError};
use crate::optimizer::cancel::CancelToken;
use crate::optimizer::scenario::Scenario;

/// What one probe found out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeVerdict {
    pub winner: Winner,
    pub initial: u64,
    pub survivors: u64,
}

impl ProbeVerdict {
    /// Attackers won and the probed unit lost nobody
    pub fn is_zero_loss(&self) -> bool {
        self.winner == Winner::Attacker && self.survivors == self.initial
    }
}

/// Answers "does `count` troops win without losses?"
pub trait ZeroLossProbe: Sync {
    fn probe(&self, count: u64) -> Result<ProbeVerdict>;

    /// Display name of the probed unit, for logs
    fn unit_name(&self) -> String;
}

/// Probe backed by a full battle resolution
pub struct ResolverProbe<'r, 'a> {
    resolver: &'r BattleResolver<'a>,
    scenario: &'r Scenario,
    unit: UnitType,
}

impl<'r, 'a> ResolverProbe<'r, 'a> {
    pub fn new(resolver: &'r BattleResolver<'a>, scenario: &'r Scenario, unit: UnitType) -> Self {
        Self {
            resolver,
            scenario,
            unit,
        }
    }
}

impl ZeroLossProbe for ResolverProbe<'_, '_> {
    fn probe(&self, count: u64) -> Result<ProbeVerdict> {
        let setup = self.scenario.single_unit_setup(self.unit, count);
        let outcome = self.resolver.resolve(&setup)?;
        Ok(ProbeVerdict {
            winner: outcome.winner,
            initial: outcome.attackers_initial.get(self.unit),
            survivors: outcome.attackers_final.get(self.unit),
        })
    }

    fn unit_name(&self) -> String {
        self.resolver.catalog().name(self.unit).to_string()
    }
}

/// Why a session stopped handing out probes
#[derive(Debug)]
pub enum ProbeStop {
    /// Probe budget used up
    Exhausted,
    Cancelled,
    /// The probe itself failed (configuration error)
    Failed(SimError),
}

/// Detailed probe lines are only written for the opening probes
const DETAILED_PROBES: u32 = 3;

/// A probe budget shared by bound finding and binary search
pub struct ProbeSession<'p> {
    probe: &'p dyn ZeroLossProbe,
    max_probes: u32,
    used: u32,
    cancel: Option<&'p CancelToken>,
    log: Vec<String>,
}

impl<'p> ProbeSession<'p> {
    pub fn new(probe: &'p dyn ZeroLossProbe, max_probes: u32) -> Self {
        Self {
            probe,
            max_probes,
            used: 0,
            cancel: None,
            log: Vec::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: &'p CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max_probes.saturating_sub(self.used)
    }

    pub fn unit_name(&self) -> String {
        self.probe.unit_name()
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn into_log(self) -> Vec<String> {
        self.log
    }

    /// Run one probe, charging it to the budget
    pub fn run(&mut self, count: u64) -> std::result::Result<ProbeVerdict, ProbeStop> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ProbeStop::Cancelled);
        }
        if self.used >= self.max_probes {
            return Err(ProbeStop::Exhausted);
        }
        self.used += 1;

        let verdict = self.probe.probe(count).map_err(ProbeStop::Failed)?;
        tracing::debug!(
            "Probe {}/{}: {} troops -> {:?}, {} of {} left",
            self.used,
            self.max_probes,
            count,
            verdict.winner,
            verdict.survivors,
            verdict.initial
        );

        if self.used <= DETAILED_PROBES {
            self.log.push(format!("Testing {} troops", group_thousands(count)));
            self.log.push(format!(
                "  Won battle: {}, initial count: {}, final count: {} ({})",
                verdict.winner == Winner::Attacker,
                verdict.initial,
                verdict.survivors,
                if verdict.is_zero_loss() { "ZERO LOSSES" } else { "HAS LOSSES" }
            ));
        }
        Ok(verdict)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Zero-loss win iff `count >= threshold`; counts every call
    pub struct ThresholdProbe {
        pub threshold: Option<u64>,
        pub calls: AtomicU32,
    }

    impl ThresholdProbe {
        pub fn new(threshold: u64) -> Self {
            Self {
                threshold: Some(threshold),
                calls: AtomicU32::new(0),
            }
        }

        pub fn never() -> Self {
            Self {
                threshold: None,
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl ZeroLossProbe for ThresholdProbe {
        fn probe(&self, count: u64) -> Result<ProbeVerdict> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let wins = self.threshold.is_some_and(|t| count >= t);
            Ok(ProbeVerdict {
                winner: if wins { Winner::Attacker } else { Winner::Defender },
                initial: count,
                survivors: if wins { count } else { 0 },
            })
        }

        fn unit_name(&self) -> String {
            "Test Unit".to_string()
        }
    }
}

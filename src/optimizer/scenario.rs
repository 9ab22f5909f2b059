//! Immutable description of what an optimization is run against

use serde::{Deserialize, Serialize};

use crate::battle::execution::{BattleSetup, Defenders};
use crate::battle::rng::RngSpec;
use crate::battle::stats::{ResearchLevels, SpecialItems};
use crate::catalog::{Composition, UnitType};

/// Everything about a battle except the attacking force
///
/// Built once per search (or per sweep cell) and never mutated; each probe
/// derives its own [`BattleSetup`] from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub defenders: Defenders,
    pub research: ResearchLevels,
    pub items: SpecialItems,
    pub rng: RngSpec,
}

impl Scenario {
    pub fn new(defenders: Defenders, research: ResearchLevels, items: SpecialItems, rng: RngSpec) -> Self {
        Self {
            defenders,
            research,
            items,
            rng,
        }
    }

    /// Battle with `count` troops of `unit` as the whole attacking army
    pub fn single_unit_setup(&self, unit: UnitType, count: u64) -> BattleSetup {
        BattleSetup {
            attackers: Composition::single(unit, count),
            research: self.research,
            items: self.items,
            defenders: self.defenders.clone(),
            rng: self.rng,
            show_debug: false,
        }
    }

    /// "Random" or the fixed override, for log headers
    pub fn rng_label(&self) -> String {
        match self.rng.override_value() {
            Some(value) => format!("{:.2}", value),
            None => "Random".to_string(),
        }
    }
}

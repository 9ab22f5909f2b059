//! Battle execution loop
//!
//! Setup -> Round (repeats) -> Finished.
//! Each round: reset flags -> order by speed -> per-unit turn (move, then
//! chained attacks) -> end check.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    DEBUG_DRAW_LIMIT, EFFICIENT_ATTACK_PERCENT, MAX_ATTACK_DEFENSE_RATIO, MAX_RNG,
    MIN_ATTACK_DEFENSE_RATIO, MIN_RNG, NEGLIGIBLE_ATTACK_PERCENT,
};
use crate::battle::log::{group_thousands, BattleLog, LogTag};
use crate::battle::movement::advance_toward_nearest;
use crate::battle::rng::{DamageRng, RngSpec};
use crate::battle::stats::{apply_wall, modified_stats, ModifiedStats, ResearchLevels, SpecialItems};
use crate::battle::targeting::{select_target, targets_in_reach};
use crate::battle::units::{BattleUnit, Side};
use crate::catalog::{Composition, GarrisonTable, Terrain, UnitCatalog, UnitType};
use crate::core::config::BattleConfig;
use crate::core::error::{Result, SimError};

/// Who the attackers face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Defenders {
    /// Environment garrison looked up in the garrison table
    Garrison { terrain: Terrain, level: u8 },
    /// Another player's army, with its own research and optional wall
    Player {
        troops: Composition,
        research: ResearchLevels,
        wall_level: Option<u8>,
    },
}

impl Defenders {
    pub fn garrison(terrain: Terrain, level: u8) -> Self {
        Defenders::Garrison { terrain, level }
    }

    /// Short description for logs ("Camp Level 3", "Enemy player")
    pub fn describe(&self) -> String {
        match self {
            Defenders::Garrison { terrain, level } => {
                format!("{} Level {}", terrain.display_name(), level)
            }
            Defenders::Player { .. } => "Enemy player".to_string(),
        }
    }
}

/// Complete input of one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub attackers: Composition,
    pub research: ResearchLevels,
    pub items: SpecialItems,
    pub defenders: Defenders,
    pub rng: RngSpec,
    /// Append RNG/damage detail for the opening draws
    #[serde(default)]
    pub show_debug: bool,
}

/// Battle verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Attacker,
    Defender,
    Draw,
}

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BattlePhase {
    #[default]
    Setup,
    Active,
    Finished,
}

/// Result of a resolved battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Winner,
    pub rounds: u32,
    pub round_cap_reached: bool,
    pub battlefield_range: i64,
    pub attackers_initial: Composition,
    pub attackers_final: Composition,
    pub defenders_initial: Composition,
    pub defenders_final: Composition,
    pub log: BattleLog,
}

impl BattleOutcome {
    pub fn attacker_won(&self) -> bool {
        self.winner == Winner::Attacker
    }

    /// Attackers won and `unit` lost nobody
    pub fn is_zero_loss_win(&self, unit: UnitType) -> bool {
        self.attacker_won() && self.attackers_final.get(unit) == self.attackers_initial.get(unit)
    }

    pub fn survivors(&self, side: Side) -> &Composition {
        match side {
            Side::Attacker => &self.attackers_final,
            Side::Defender => &self.defenders_final,
        }
    }
}

/// Outcome of a single strike
#[derive(Debug, Clone, Copy, PartialEq)]
struct StrikeReport {
    killed: u64,
    damage: f64,
    efficiency: f64,
}

impl StrikeReport {
    /// A strike ends the turn when it was worth it, achieved nothing, or
    /// dealt no damage at all. Anything in between chains another strike.
    fn ends_turn(&self) -> bool {
        self.efficiency >= EFFICIENT_ATTACK_PERCENT
            || self.efficiency <= NEGLIGIBLE_ATTACK_PERCENT
            || (self.killed == 0 && self.damage <= 0.0)
    }
}

/// Resolves battles against injected read-only tables
#[derive(Debug, Clone)]
pub struct BattleResolver<'a> {
    catalog: &'a UnitCatalog,
    garrisons: &'a GarrisonTable,
    config: BattleConfig,
}

impl<'a> BattleResolver<'a> {
    pub fn new(catalog: &'a UnitCatalog, garrisons: &'a GarrisonTable, config: BattleConfig) -> Self {
        Self {
            catalog,
            garrisons,
            config,
        }
    }

    pub fn catalog(&self) -> &'a UnitCatalog {
        self.catalog
    }

    pub fn garrisons(&self) -> &'a GarrisonTable {
        self.garrisons
    }

    /// Defending troops for a defender selection
    pub fn defender_troops(&self, defenders: &Defenders) -> Result<Composition> {
        let troops = match defenders {
            Defenders::Garrison { terrain, level } => self.garrisons.lookup(*terrain, *level)?,
            Defenders::Player { troops, .. } => *troops,
        };
        if troops.is_empty() {
            return Err(SimError::EmptyDefenders);
        }
        Ok(troops)
    }

    /// Run a battle to completion
    ///
    /// Fails only on configuration errors (unknown garrison, empty defending
    /// force); every numeric edge case resolves as "no damage".
    pub fn resolve(&self, setup: &BattleSetup) -> Result<BattleOutcome> {
        let defender_troops = self.defender_troops(&setup.defenders)?;

        let mut state = BattleState::new(self.catalog, &self.config, setup, defender_troops);
        state.log_setup(setup);
        state.phase = BattlePhase::Active;

        while state.phase == BattlePhase::Active {
            state.run_round();
        }

        let outcome = state.into_outcome();
        tracing::debug!(
            "Battle finished after {} rounds: {:?} ({} attackers left, {} defenders left)",
            outcome.rounds,
            outcome.winner,
            outcome.attackers_final.total(),
            outcome.defenders_final.total()
        );
        Ok(outcome)
    }
}

/// Private mutable state of one battle
struct BattleState<'a> {
    catalog: &'a UnitCatalog,
    config: &'a BattleConfig,
    units: Vec<BattleUnit>,
    battlefield_range: i64,
    round: u32,
    phase: BattlePhase,
    winner: Winner,
    round_cap_reached: bool,
    rng: Box<dyn DamageRng>,
    draws: u64,
    show_debug: bool,
    log: BattleLog,
}

impl<'a> BattleState<'a> {
    fn new(
        catalog: &'a UnitCatalog,
        config: &'a BattleConfig,
        setup: &BattleSetup,
        defender_troops: Composition,
    ) -> Self {
        let mut stacks: Vec<(UnitType, Side, u64, ModifiedStats)> = Vec::new();

        for (unit, count) in setup.attackers.iter() {
            let stats = modified_stats(catalog, unit, &setup.research, &setup.items);
            stacks.push((unit, Side::Attacker, count, stats));
        }

        let (defender_research, wall_level) = match &setup.defenders {
            Defenders::Garrison { .. } => (ResearchLevels::default(), None),
            Defenders::Player {
                research,
                wall_level,
                ..
            } => (*research, *wall_level),
        };
        for (unit, count) in defender_troops.iter() {
            let mut stats = modified_stats(catalog, unit, &defender_research, &SpecialItems::default());
            if let Some(wall) = wall_level {
                stats = apply_wall(stats, wall);
            }
            stacks.push((unit, Side::Defender, count, stats));
        }

        let battlefield_range = stacks
            .iter()
            .map(|(_, _, _, stats)| i64::from(stats.range))
            .max()
            .unwrap_or(0);

        let units = stacks
            .into_iter()
            .map(|(unit, side, count, stats)| {
                let position = match side {
                    Side::Attacker => 0,
                    Side::Defender => battlefield_range,
                };
                BattleUnit::new(unit, side, count, stats, position)
            })
            .collect();

        Self {
            catalog,
            config,
            units,
            battlefield_range,
            round: 0,
            phase: BattlePhase::Setup,
            winner: Winner::Draw,
            round_cap_reached: false,
            rng: setup.rng.build(),
            draws: 0,
            show_debug: setup.show_debug,
            log: BattleLog::new(),
        }
    }

    fn name(&self, unit: UnitType) -> &'a str {
        self.catalog.name(unit)
    }

    fn army_line(&self, side: Side) -> String {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .map(|u| format!("{}x {}", group_thousands(u.count), self.name(u.unit_type)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn log_setup(&mut self, setup: &BattleSetup) {
        let mut lines: Vec<(LogTag, String)> = vec![
            (LogTag::Neutral, "Battle Setup:".to_string()),
            (
                LogTag::Neutral,
                format!("- Battlefield length: {}", self.battlefield_range),
            ),
        ];
        match setup.rng.override_value() {
            Some(value) => lines.push((LogTag::Neutral, format!("- RNG override: {:.2}", value))),
            None => lines.push((LogTag::Neutral, format!("- Random seed: {}", setup.rng.seed))),
        }
        lines.push((
            LogTag::Attacker,
            format!("- Attacker's Army: {}", self.army_line(Side::Attacker)),
        ));
        lines.push((
            LogTag::Defender,
            format!(
                "- Defender's Army ({}): {}",
                setup.defenders.describe(),
                self.army_line(Side::Defender)
            ),
        ));
        let items = setup.items.active_descriptions();
        if !items.is_empty() {
            lines.push((
                LogTag::Neutral,
                format!("- Active Special Items: {}", items.join(", ")),
            ));
        }

        lines.push((LogTag::Neutral, String::new()));
        lines.push((LogTag::Attacker, "Attacker's Modified Stats:".to_string()));
        lines.extend(self.stat_lines(Side::Attacker));

        if let Defenders::Player { wall_level, .. } = &setup.defenders {
            lines.push((LogTag::Defender, "Defender's Modified Stats:".to_string()));
            if let Some(wall) = wall_level {
                lines.push((LogTag::Defender, format!("- Wall level: {}", wall)));
            }
            lines.extend(self.stat_lines(Side::Defender));
        }

        lines.push((LogTag::Neutral, self.range_origin_line()));
        lines.push((LogTag::Neutral, String::new()));

        for (tag, text) in lines {
            self.log.push_tagged(tag, text);
        }
    }

    fn stat_lines(&self, side: Side) -> Vec<(LogTag, String)> {
        let tag = LogTag::from(side);
        let mut lines = Vec::new();
        for unit in self.units.iter().filter(|u| u.side == side) {
            let Some(base) = self.catalog.get(unit.unit_type) else {
                lines.push((tag, format!("- {}: unknown unit, fighting with no stats", unit.unit_type)));
                continue;
            };
            let s = &unit.stats;
            lines.push((tag, format!("- {}:", base.name)));
            lines.push((tag, format!("  Attack: {} → {}", base.attack, s.attack)));
            lines.push((tag, format!("  Defense: {} → {}", base.defense, s.defense)));
            lines.push((tag, format!("  Health: {} → {}", base.health, s.health)));
            lines.push((tag, format!("  Speed: {} → {}", base.speed, s.speed)));
            if base.range > 0 {
                lines.push((tag, format!("  Range: {} → {}", base.range, s.range)));
            }
            if base.ranged_attack > 0 {
                lines.push((
                    tag,
                    format!("  Ranged Attack: {} → {}", base.ranged_attack, s.ranged_attack),
                ));
            }
        }
        lines
    }

    fn range_origin_line(&self) -> String {
        if self.battlefield_range == 0 {
            return "Melee combat only (battlefield length: 0)".to_string();
        }

        let mut origins = Vec::new();
        for (side, label) in [(Side::Attacker, "Attackers"), (Side::Defender, "Defenders")] {
            let names: Vec<&str> = self
                .units
                .iter()
                .filter(|u| u.side == side && i64::from(u.stats.range) == self.battlefield_range)
                .map(|u| self.name(u.unit_type))
                .collect();
            if !names.is_empty() {
                origins.push(format!("{} ({})", label, names.join(", ")));
            }
        }

        if origins.is_empty() {
            format!("Battlefield length set to {}", self.battlefield_range)
        } else {
            format!(
                "Battlefield length set to {} by {}",
                self.battlefield_range,
                origins.join(" and ")
            )
        }
    }

    /// Play one round, then check for the end of the battle
    fn run_round(&mut self) {
        self.round += 1;
        self.rng.begin_round(self.round);
        self.log.push(format!("=== ROUND {} ===", self.round));

        for unit in &mut self.units {
            unit.reset_turn_flags();
        }

        // Fastest first; the stable sort keeps insertion order on ties
        let mut order: Vec<usize> = (0..self.units.len())
            .filter(|&i| self.units[i].is_alive())
            .collect();
        order.sort_by_key(|&i| Reverse(self.units[i].stats.speed));

        for idx in order {
            if self.units[idx].is_alive() {
                self.take_turn(idx);
            }
        }

        let attackers_alive = self.side_total(Side::Attacker);
        let defenders_alive = self.side_total(Side::Defender);

        if attackers_alive == 0 || defenders_alive == 0 {
            self.winner = match (attackers_alive, defenders_alive) {
                (0, 0) => Winner::Draw,
                (0, _) => Winner::Defender,
                _ => Winner::Attacker,
            };
            self.finish();
        } else if self.round >= self.config.max_rounds {
            self.winner = Winner::Draw;
            self.round_cap_reached = true;
            self.finish();
        } else {
            self.log.blank();
        }
    }

    fn take_turn(&mut self, idx: usize) {
        let mut targets = targets_in_reach(&self.units, idx);

        if targets.is_empty() {
            let count = self.units[idx].count;
            if let Some(step) = advance_toward_nearest(&mut self.units, idx, self.battlefield_range) {
                let unit = &self.units[idx];
                let side = unit.side;
                let text = format!(
                    "{}x {} moves from {} to {}",
                    group_thousands(count),
                    self.name(unit.unit_type),
                    step.from,
                    step.to
                );
                self.log.push_tagged(side.into(), text);
                targets = targets_in_reach(&self.units, idx);
            }
        }

        let mut attacks = 0;
        while attacks < self.config.max_attacks_per_turn && self.units[idx].is_alive() {
            let Some(target) = select_target(&self.units, idx, &targets) else {
                break;
            };
            attacks += 1;

            let report = self.strike(idx, target);
            self.units[idx].has_attacked = true;
            if report.ends_turn() {
                break;
            }
            targets = targets_in_reach(&self.units, idx);
        }
    }

    /// Resolve one attack of `units[attacker]` on `units[target]`
    fn strike(&mut self, attacker: usize, target: usize) -> StrikeReport {
        let (attacker_type, side, ranged, power, count) = {
            let unit = &self.units[attacker];
            (unit.unit_type, unit.side, unit.is_ranged(), unit.attack_power(), unit.count)
        };

        let defense = f64::from(self.units[target].stats.defense);
        let power = f64::from(power);
        let ratio = if defense > 0.0 {
            (power / defense).clamp(MIN_ATTACK_DEFENSE_RATIO, MAX_ATTACK_DEFENSE_RATIO)
        } else {
            MAX_ATTACK_DEFENSE_RATIO
        };

        let multiplier = self.rng.next();
        self.draws += 1;

        let base = power * count as f64;
        let raw_damage = (base * ratio * multiplier).round();

        let target_unit = &mut self.units[target];
        let health = f64::from(target_unit.stats.health);
        let damage = if health > 0.0 {
            raw_damage.min(target_unit.count as f64 * health)
        } else {
            0.0
        };

        let killed = if damage > 0.0 {
            ((damage / health).floor() as u64).max(1).min(target_unit.count)
        } else {
            0
        };
        target_unit.count -= killed;
        let remaining = target_unit.count;
        let target_type = target_unit.unit_type;

        let potential = base * ratio * MAX_RNG;
        let efficiency = if potential > 0.0 {
            damage / potential * 100.0
        } else {
            0.0
        };

        if self.show_debug && self.draws <= DEBUG_DRAW_LIMIT {
            let text = format!(
                "DEBUG: {} RNG={:.3}, Min={}, Max={}, Actual={}, Pct={:.2}%",
                self.name(attacker_type),
                multiplier,
                group_thousands((base * ratio * MIN_RNG).round() as u64),
                group_thousands((base * ratio * MAX_RNG).round() as u64),
                group_thousands(damage as u64),
                efficiency
            );
            self.log.push(text);
        }

        let text = format!(
            "{} attacks {} using {} attack. {} were killed, {} remaining ({:.2}%)",
            self.name(attacker_type),
            self.name(target_type),
            if ranged { "Ranged" } else { "Melee" },
            group_thousands(killed),
            group_thousands(remaining),
            efficiency
        );
        self.log.push_tagged(side.into(), text);

        StrikeReport {
            killed,
            damage,
            efficiency,
        }
    }

    fn side_total(&self, side: Side) -> u64 {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .map(|u| u.count)
            .sum()
    }

    fn finish(&mut self) {
        self.phase = BattlePhase::Finished;

        self.log.blank();
        self.log.push("=== BATTLE ENDED ===");
        let verdict = if self.round_cap_reached {
            "The battle reached the maximum number of rounds and was declared a draw!"
        } else {
            match self.winner {
                Winner::Attacker => "The attackers have won the battle!",
                Winner::Defender => "The defenders have won the battle!",
                Winner::Draw => "The battle ended in a draw!",
            }
        };
        self.log.push(verdict);

        self.log.blank();
        self.log.push("=== FINAL FORCES ===");
        for side in [Side::Attacker, Side::Defender] {
            let mut survivors: Vec<&BattleUnit> = self
                .units
                .iter()
                .filter(|u| u.side == side && u.is_alive())
                .collect();
            survivors.sort_by_key(|u| Reverse(self.catalog.power(u.unit_type)));
            let lines: Vec<String> = survivors
                .iter()
                .map(|u| format!("{}: {}x {}", side.label(), u.count, self.name(u.unit_type)))
                .collect();
            for line in lines {
                self.log.push_tagged(side.into(), line);
            }
        }
    }

    fn composition(&self, side: Side, initial: bool) -> Composition {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .map(|u| (u.unit_type, if initial { u.initial_count } else { u.count }))
            .collect()
    }

    fn into_outcome(self) -> BattleOutcome {
        BattleOutcome {
            winner: self.winner,
            rounds: self.round,
            round_cap_reached: self.round_cap_reached,
            battlefield_range: self.battlefield_range,
            attackers_initial: self.composition(Side::Attacker, true),
            attackers_final: self.composition(Side::Attacker, false),
            defenders_initial: self.composition(Side::Defender, true),
            defenders_final: self.composition(Side::Defender, false),
            log: self.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (UnitCatalog, GarrisonTable) {
        (UnitCatalog::with_defaults(), GarrisonTable::with_defaults())
    }

    fn setup(attackers: Composition, defenders: Defenders, rng: RngSpec) -> BattleSetup {
        BattleSetup {
            attackers,
            research: ResearchLevels::default(),
            items: SpecialItems::default(),
            defenders,
            rng,
            show_debug: false,
        }
    }

    fn player(troops: Composition) -> Defenders {
        Defenders::Player {
            troops,
            research: ResearchLevels::default(),
            wall_level: None,
        }
    }

    #[test]
    fn test_strike_report_continuation_rule() {
        let efficient = StrikeReport { killed: 10, damage: 500.0, efficiency: 20.0 };
        let negligible = StrikeReport { killed: 1, damage: 1.0, efficiency: 0.0005 };
        let mop_up = StrikeReport { killed: 3, damage: 50.0, efficiency: 5.0 };
        let nothing = StrikeReport { killed: 0, damage: 0.0, efficiency: 0.0 };
        assert!(efficient.ends_turn());
        assert!(negligible.ends_turn());
        assert!(nothing.ends_turn());
        assert!(!mop_up.ends_turn());
    }

    #[test]
    fn test_camp_one_scenario_is_deterministic() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::single(UnitType::Conscript, 500),
            Defenders::garrison(Terrain::Camp, 1),
            RngSpec::from_override("1.0", 1234),
        );

        let first = resolver.resolve(&setup).unwrap();
        let second = resolver.resolve(&setup).unwrap();
        assert_eq!(first, second);
        assert!(first.log.contains("=== FINAL FORCES ==="));
        assert_eq!(first.battlefield_range, 0);
        assert!(first.log.contains("Melee combat only"));
    }

    #[test]
    fn test_overwhelming_force_wins_without_losses() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        // Giants outpace porters and one strike covers 10 * 45 health
        let setup = setup(
            Composition::single(UnitType::Giant, 10),
            player(Composition::single(UnitType::Porter, 10)),
            RngSpec::fixed(1.0, 0),
        );
        let outcome = resolver.resolve(&setup).unwrap();
        assert_eq!(outcome.winner, Winner::Attacker);
        assert!(outcome.is_zero_loss_win(UnitType::Giant));
        assert_eq!(outcome.rounds, 1);
        assert!(outcome.log.contains("The attackers have won the battle!"));
        assert!(outcome.log.contains("Attacker: 10x Giant"));
    }

    #[test]
    fn test_empty_attackers_lose() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::new(),
            Defenders::garrison(Terrain::Forest, 1),
            RngSpec::seeded(3),
        );
        let outcome = resolver.resolve(&setup).unwrap();
        assert_eq!(outcome.winner, Winner::Defender);
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_unknown_garrison_is_reported() {
        let (catalog, _) = tables();
        let garrisons = GarrisonTable::new();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::single(UnitType::Conscript, 5),
            Defenders::garrison(Terrain::Camp, 1),
            RngSpec::seeded(3),
        );
        let err = resolver.resolve(&setup).unwrap_err();
        assert!(matches!(err, SimError::UnknownGarrison { level: 1, .. }));
    }

    #[test]
    fn test_empty_player_defenders_rejected() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::single(UnitType::Conscript, 5),
            player(Composition::new()),
            RngSpec::seeded(3),
        );
        assert!(matches!(resolver.resolve(&setup), Err(SimError::EmptyDefenders)));
    }

    #[test]
    fn test_zero_health_defenders_force_round_cap_draw() {
        let mut catalog = UnitCatalog::with_defaults();
        let mut ghost = catalog.get(UnitType::Spy).cloned().unwrap();
        ghost.health = 0;
        ghost.attack = 0;
        catalog.insert(UnitType::Spy, ghost);
        let garrisons = GarrisonTable::new();
        let config = BattleConfig {
            max_rounds: 5,
            ..Default::default()
        };
        let resolver = BattleResolver::new(&catalog, &garrisons, config);
        let setup = setup(
            Composition::single(UnitType::Conscript, 10),
            player(Composition::single(UnitType::Spy, 10)),
            RngSpec::fixed(1.0, 0),
        );
        let outcome = resolver.resolve(&setup).unwrap();
        assert_eq!(outcome.winner, Winner::Draw);
        assert!(outcome.round_cap_reached);
        assert_eq!(outcome.rounds, 5);
        assert_eq!(outcome.defenders_final.get(UnitType::Spy), 10);
        assert!(outcome.log.contains("=== FINAL FORCES ==="));
    }

    #[test]
    fn test_ranged_battlefield_and_positions() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::single(UnitType::LongbowMan, 100),
            player(Composition::single(UnitType::Conscript, 10)),
            RngSpec::fixed(1.0, 0),
        );
        let outcome = resolver.resolve(&setup).unwrap();
        assert_eq!(outcome.battlefield_range, 1200);
        assert!(outcome.log.contains("Battlefield length set to 1200 by Attackers (Longbow Man)"));
        assert!(outcome.log.contains("using Ranged attack"));
    }

    #[test]
    fn test_wall_shows_in_defender_stats() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let setup = setup(
            Composition::single(UnitType::Giant, 1),
            Defenders::Player {
                troops: Composition::single(UnitType::Halberdier, 1),
                research: ResearchLevels::default(),
                wall_level: Some(10),
            },
            RngSpec::fixed(1.0, 0),
        );
        let outcome = resolver.resolve(&setup).unwrap();
        assert!(outcome.log.contains("- Wall level: 10"));
        assert!(outcome.log.contains("  Defense: 40 → 50"));
    }

    #[test]
    fn test_debug_lines_limited_to_opening_draws() {
        let (catalog, garrisons) = tables();
        let resolver = BattleResolver::new(&catalog, &garrisons, BattleConfig::default());
        let mut setup = setup(
            Composition::single(UnitType::Conscript, 500),
            Defenders::garrison(Terrain::Camp, 2),
            RngSpec::seeded(99),
        );
        setup.show_debug = true;
        let outcome = resolver.resolve(&setup).unwrap();
        let debug_lines = outcome
            .log
            .lines
            .iter()
            .filter(|l| l.text.starts_with("DEBUG:"))
            .count();
        assert!(debug_lines > 0 && debug_lines <= 10);
    }

    #[test]
    fn test_debug_lines_stop_after_tenth_draw() {
        let mut catalog = UnitCatalog::with_defaults();
        let mut ghost = catalog.get(UnitType::Spy).cloned().unwrap();
        ghost.health = 0;
        ghost.attack = 0;
        catalog.insert(UnitType::Spy, ghost);
        let garrisons = GarrisonTable::new();
        let config = BattleConfig {
            max_rounds: 30,
            ..Default::default()
        };
        let resolver = BattleResolver::new(&catalog, &garrisons, config);
        let mut setup = setup(
            Composition::single(UnitType::Conscript, 10),
            player(Composition::single(UnitType::Spy, 10)),
            RngSpec::fixed(1.0, 0),
        );
        setup.show_debug = true;

        let outcome = resolver.resolve(&setup).unwrap();
        let attacks = outcome.log.lines.iter().filter(|l| l.text.contains(" attacks ")).count();
        let debug_lines = outcome
            .log
            .lines
            .iter()
            .filter(|l| l.text.starts_with("DEBUG:"))
            .count();
        assert!(attacks > 10);
        assert_eq!(debug_lines, 10);
    }

    fn round_one_attacks(outcome: &BattleOutcome, tag: LogTag) -> usize {
        outcome
            .log
            .lines
            .iter()
            .skip_while(|l| l.text != "=== ROUND 1 ===")
            .skip(1)
            .take_while(|l| !l.text.starts_with("=== "))
            .filter(|l| l.tag == tag && l.text.contains(" attacks "))
            .count()
    }

    #[test]
    fn test_attack_cap_stops_chained_strikes() {
        let (catalog, garrisons) = tables();
        let setup = setup(
            Composition::single(UnitType::Conscript, 30_000),
            Defenders::garrison(Terrain::Camp, 1),
            RngSpec::fixed(1.0, 0),
        );

        // Wiping the porters is a mop-up strike, so the turn chains into the
        // camp conscripts before they can act
        let chained = BattleResolver::new(&catalog, &garrisons, BattleConfig::default())
            .resolve(&setup)
            .unwrap();
        assert!(chained.is_zero_loss_win(UnitType::Conscript));
        assert!(round_one_attacks(&chained, LogTag::Attacker) >= 2);

        let capped_config = BattleConfig {
            max_attacks_per_turn: 1,
            ..Default::default()
        };
        let capped = BattleResolver::new(&catalog, &garrisons, capped_config)
            .resolve(&setup)
            .unwrap();
        assert_eq!(round_one_attacks(&capped, LogTag::Attacker), 1);
        assert!(round_one_attacks(&capped, LogTag::Defender) >= 1);
        assert!(!capped.is_zero_loss_win(UnitType::Conscript));
    }
}

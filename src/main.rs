//! ROA Sim - Entry Point
//!
//! Command line front end: run a single battle, find the minimum zero-loss
//! troop count for one unit, or sweep the whole research x target matrix.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use roa_sim::battle::{BattleResolver, BattleSetup, Defenders, ResearchLevels, RngSpec, SpecialItems};
use roa_sim::catalog::{Composition, GarrisonTable, Terrain, UnitCatalog, UnitType};
use roa_sim::core::error::{Result, SimError};
use roa_sim::core::SimulatorConfig;
use roa_sim::optimizer::{optimize, sweep_all, OptimizationOutcome, Scenario, SweepTemplate};

/// Battle simulator and troop optimizer
#[derive(Parser, Debug)]
#[command(name = "roa-sim")]
#[command(about = "Simulate battles and find minimum zero-loss troop counts")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Simulator configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Replacement unit catalog (TOML)
    #[arg(long, global = true)]
    units: Option<PathBuf>,

    /// Replacement garrison table (TOML)
    #[arg(long, global = true)]
    garrisons: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a single battle and print its log
    Battle {
        /// Attacking troops as unit=count (repeatable)
        #[arg(long = "attacker", short = 'a', value_parser = parse_troops, required = true)]
        attackers: Vec<(UnitType, u64)>,

        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Append RNG and damage detail for the first draws
        #[arg(long)]
        debug: bool,

        /// Wrap attacker/defender lines in tags for colouring
        #[arg(long)]
        tagged: bool,
    },
    /// Find the minimum count of one unit that wins without losses
    Optimize {
        /// Unit to optimize
        #[arg(long)]
        unit: UnitType,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Minimum counts for every research level, target level and unit
    Sweep {
        /// Terrain to sweep
        #[arg(long, default_value = "camp")]
        terrain: Terrain,

        #[command(flatten)]
        items: ItemArgs,

        #[command(flatten)]
        rng: RngArgs,

        /// Worker threads (overrides the configuration file)
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    #[command(flatten)]
    research: ResearchArgs,

    #[command(flatten)]
    items: ItemArgs,

    #[command(flatten)]
    rng: RngArgs,

    /// Garrison terrain
    #[arg(long, default_value = "camp")]
    terrain: Terrain,

    /// Garrison level
    #[arg(long, default_value_t = 1)]
    level: u8,

    /// Fight an enemy player instead of a garrison: unit=count (repeatable)
    #[arg(long = "enemy", value_parser = parse_troops)]
    enemy: Vec<(UnitType, u64)>,

    /// Research level applied to every axis of the enemy player
    #[arg(long, default_value_t = 0)]
    enemy_research: u8,

    /// Enemy player's wall level
    #[arg(long)]
    wall: Option<u8>,
}

#[derive(Args, Debug)]
struct ResearchArgs {
    /// Set every research axis at once
    #[arg(long)]
    research_all: Option<u8>,

    #[arg(long, default_value_t = 0)]
    metallurgy: u8,

    #[arg(long, default_value_t = 0)]
    medicine: u8,

    #[arg(long, default_value_t = 0)]
    weapons_calibration: u8,

    #[arg(long, default_value_t = 0)]
    rapid_deployment: u8,

    #[arg(long, default_value_t = 0)]
    dragonry: u8,
}

#[derive(Args, Debug)]
struct ItemArgs {
    /// +20% dragon attack
    #[arg(long)]
    crimson_bull: bool,

    /// +20% troop defense
    #[arg(long)]
    glowing_shields: bool,

    /// +100% dragon defense
    #[arg(long)]
    purple_bones: bool,

    /// +20% troop attack
    #[arg(long)]
    dragon_heart: bool,
}

#[derive(Args, Debug)]
struct RngArgs {
    /// Fixed damage multiplier; empty selects the seeded sequence
    #[arg(long, default_value = "")]
    rng_override: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_troops(text: &str) -> std::result::Result<(UnitType, u64), String> {
    let (unit, count) = text
        .split_once('=')
        .ok_or_else(|| format!("expected unit=count, got '{}'", text))?;
    let unit = unit.parse::<UnitType>().map_err(|e| e.to_string())?;
    let count = count
        .trim()
        .replace(',', "")
        .parse::<u64>()
        .map_err(|e| format!("invalid count '{}': {}", count, e))?;
    Ok((unit, count))
}

impl ResearchArgs {
    fn levels(&self) -> ResearchLevels {
        match self.research_all {
            Some(level) => ResearchLevels::uniform(level),
            None => ResearchLevels {
                metallurgy: self.metallurgy,
                medicine: self.medicine,
                weapons_calibration: self.weapons_calibration,
                rapid_deployment: self.rapid_deployment,
                dragonry: self.dragonry,
            },
        }
    }
}

impl ItemArgs {
    fn items(&self) -> SpecialItems {
        SpecialItems {
            crimson_bull: self.crimson_bull,
            glowing_shields: self.glowing_shields,
            purple_bones: self.purple_bones,
            dragon_heart: self.dragon_heart,
        }
    }
}

impl RngArgs {
    fn spec(&self) -> RngSpec {
        let seed = self.seed.unwrap_or_else(rand::random);
        RngSpec::from_override(&self.rng_override, seed)
    }
}

impl ScenarioArgs {
    fn scenario(&self) -> Scenario {
        let defenders = if self.enemy.is_empty() {
            Defenders::garrison(self.terrain, self.level)
        } else {
            Defenders::Player {
                troops: self.enemy.iter().copied().collect(),
                research: ResearchLevels::uniform(self.enemy_research),
                wall_level: self.wall,
            }
        };
        Scenario::new(defenders, self.research.levels(), self.items.items(), self.rng.spec())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roa_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    let catalog = match &cli.units {
        Some(path) => UnitCatalog::load_from_toml(path)?,
        None => UnitCatalog::with_defaults(),
    };
    let garrisons = match &cli.garrisons {
        Some(path) => GarrisonTable::load_from_toml(path)?,
        None => GarrisonTable::with_defaults(),
    };

    let resolver = BattleResolver::new(&catalog, &garrisons, config.battle.clone());

    match cli.command {
        Command::Battle {
            attackers,
            scenario,
            debug,
            tagged,
        } => {
            let scenario = scenario.scenario();
            let setup = BattleSetup {
                attackers: attackers.into_iter().collect::<Composition>(),
                research: scenario.research,
                items: scenario.items,
                defenders: scenario.defenders,
                rng: scenario.rng,
                show_debug: debug,
            };
            let outcome = resolver.resolve(&setup)?;
            match cli.format {
                OutputFormat::Json => print_json(&outcome)?,
                OutputFormat::Text if tagged => println!("{}", outcome.log.render_tagged()),
                OutputFormat::Text => println!("{}", outcome.log.render()),
            }
        }
        Command::Optimize { unit, scenario } => {
            let scenario = scenario.scenario();
            let result = optimize(&resolver, &scenario, unit, &config.search, None);
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => println!("{}", result.log.join("\n")),
            }
            if let OptimizationOutcome::ConfigurationError { message } = result.outcome {
                return Err(SimError::OptimizationFailed(message));
            }
        }
        Command::Sweep {
            terrain,
            items,
            rng,
            threads,
        } => {
            if threads.is_some() {
                config.sweep.threads = threads;
            }
            let template = SweepTemplate {
                terrain,
                items: items.items(),
                rng: rng.spec(),
            };
            let result = sweep_all(&resolver, &template, &config.search, &config.sweep, None)?;
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print!("{}", result.render_table(|u| catalog.name(u).to_string())),
            }
        }
    }

    Ok(())
}

//! Unit types and their base statistics
//!
//! The catalog is immutable once built and is shared by reference with every
//! resolver call.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Troop type that can appear in an army
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitType {
    // Tier 1
    Porter,     // Carrier, barely fights
    Conscript,  // Cheap line infantry
    Spy,        // Fragile
    Halberdier, // Solid infantry

    // Tier 2-3
    Minotaur,
    LongbowMan, // Long-range archer

    // Tier 4
    SwiftStrikeDragon, // Fastest unit on the field
    ArmoredTransport,  // Heavy siege carrier
    Giant,
    FireMirror,   // Siege artillery, longest range
    BattleDragon, // Armored dragon
}

impl UnitType {
    pub const COUNT: usize = 11;

    /// Every unit type in catalog order (also battle insertion order)
    pub const ALL: [UnitType; UnitType::COUNT] = [
        UnitType::Porter,
        UnitType::Conscript,
        UnitType::Spy,
        UnitType::Halberdier,
        UnitType::Minotaur,
        UnitType::LongbowMan,
        UnitType::SwiftStrikeDragon,
        UnitType::ArmoredTransport,
        UnitType::Giant,
        UnitType::FireMirror,
        UnitType::BattleDragon,
    ];

    /// Position in [`UnitType::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable camelCase identifier used in config files and on the command line
    pub fn key(self) -> &'static str {
        match self {
            UnitType::Porter => "porter",
            UnitType::Conscript => "conscript",
            UnitType::Spy => "spy",
            UnitType::Halberdier => "halberdier",
            UnitType::Minotaur => "minotaur",
            UnitType::LongbowMan => "longbowMan",
            UnitType::SwiftStrikeDragon => "swiftStrikeDragon",
            UnitType::ArmoredTransport => "armoredTransport",
            UnitType::Giant => "giant",
            UnitType::FireMirror => "fireMirror",
            UnitType::BattleDragon => "battleDragon",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UnitType {
    type Err = SimError;

    /// Accepts `swiftStrikeDragon`, `swift_strike_dragon` or `Swift Strike Dragon`
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        UnitType::ALL
            .into_iter()
            .find(|unit| normalize(unit.key()) == wanted)
            .ok_or_else(|| SimError::UnknownUnit(s.to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Broad combat role; gates which research and item bonuses apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Infantry,
    Ranged,
    Cavalry,
    Dragon,
    Siege,
}

impl UnitCategory {
    /// Ranged and siege units receive range and ranged-attack bonuses
    pub fn is_ranged(self) -> bool {
        matches!(self, UnitCategory::Ranged | UnitCategory::Siege)
    }

    pub fn is_dragon(self) -> bool {
        self == UnitCategory::Dragon
    }
}

/// Static catalog entry for a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitClass {
    pub name: String,
    pub tier: u8,
    pub category: UnitCategory,
    pub attack: u32,
    pub ranged_attack: u32,
    pub health: u32,
    pub defense: u32,
    pub speed: u32,
    /// Attack range; 0 = melee only
    pub range: u32,
    pub load: u32,
    pub upkeep: u32,
    /// Overall power rating, used to order final-force listings
    pub power: u32,
    /// Pure carriers are excluded from sweeps
    #[serde(default)]
    pub carrier: bool,
}

impl UnitClass {
    /// Can this unit be optimized for in a sweep?
    pub fn is_combat_capable(&self) -> bool {
        self.attack > 0 && !self.carrier
    }
}

#[allow(clippy::too_many_arguments)]
fn class(
    name: &str,
    tier: u8,
    category: UnitCategory,
    attack: u32,
    ranged_attack: u32,
    health: u32,
    defense: u32,
    speed: u32,
    range: u32,
    load: u32,
    upkeep: u32,
    power: u32,
) -> UnitClass {
    UnitClass {
        name: name.to_string(),
        tier,
        category,
        attack,
        ranged_attack,
        health,
        defense,
        speed,
        range,
        load,
        upkeep,
        power,
        carrier: false,
    }
}

/// Read-only table of unit classes keyed by [`UnitType`]
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCatalog {
    classes: [Option<UnitClass>; UnitType::COUNT],
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl UnitCatalog {
    /// Create an empty catalog
    pub fn empty() -> Self {
        Self {
            classes: Default::default(),
        }
    }

    /// The built-in unit table
    pub fn with_defaults() -> Self {
        use UnitCategory::*;

        let mut catalog = Self::empty();
        let mut porter = class("Porter", 1, Infantry, 1, 0, 45, 10, 100, 0, 200, 2, 1);
        porter.carrier = true;
        catalog.insert(UnitType::Porter, porter);
        catalog.insert(
            UnitType::Conscript,
            class("Conscript", 1, Infantry, 10, 0, 75, 10, 200, 0, 20, 3, 1),
        );
        catalog.insert(UnitType::Spy, class("Spy", 1, Infantry, 5, 0, 10, 5, 150, 0, 0, 5, 2));
        catalog.insert(
            UnitType::Halberdier,
            class("Halberdier", 1, Infantry, 40, 0, 150, 40, 300, 0, 40, 6, 2),
        );
        catalog.insert(
            UnitType::Minotaur,
            class("Minotaur", 3, Infantry, 70, 0, 225, 45, 275, 0, 30, 7, 3),
        );
        catalog.insert(
            UnitType::LongbowMan,
            class("Longbow Man", 2, Ranged, 5, 80, 75, 30, 250, 1200, 25, 9, 4),
        );
        catalog.insert(
            UnitType::SwiftStrikeDragon,
            class("Swift Strike Dragon", 4, Dragon, 150, 0, 300, 60, 1000, 0, 100, 18, 5),
        );
        catalog.insert(
            UnitType::ArmoredTransport,
            class("Armored Transport", 3, Siege, 5, 0, 750, 200, 150, 0, 5000, 10, 6),
        );
        catalog.insert(
            UnitType::Giant,
            class("Giant", 4, Infantry, 1000, 0, 4000, 400, 120, 0, 45, 100, 9),
        );
        catalog.insert(
            UnitType::FireMirror,
            class("Fire Mirror", 4, Siege, 20, 1200, 1500, 30, 50, 1500, 75, 250, 10),
        );
        catalog.insert(
            UnitType::BattleDragon,
            class("Battle Dragon", 4, Dragon, 300, 0, 1500, 300, 750, 0, 80, 35, 7),
        );
        catalog
    }

    /// Add or replace a unit class
    pub fn insert(&mut self, unit: UnitType, class: UnitClass) {
        self.classes[unit.index()] = Some(class);
    }

    pub fn get(&self, unit: UnitType) -> Option<&UnitClass> {
        self.classes[unit.index()].as_ref()
    }

    /// Display name, falling back to the unit key when the class is missing
    pub fn name(&self, unit: UnitType) -> &str {
        self.get(unit).map_or(unit.key(), |class| class.name.as_str())
    }

    /// Power rating (0 when the class is missing)
    pub fn power(&self, unit: UnitType) -> u32 {
        self.get(unit).map_or(0, |class| class.power)
    }

    /// Unit types worth optimizing: positive attack and not a pure carrier
    pub fn combat_units(&self) -> Vec<UnitType> {
        UnitType::ALL
            .into_iter()
            .filter(|&unit| self.get(unit).is_some_and(UnitClass::is_combat_capable))
            .collect()
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string
    ///
    /// Units not listed in the document are absent from the catalog and
    /// resolve to all-zero stats.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlCatalog = toml::from_str(content)?;

        let mut catalog = Self::empty();
        for entry in toml_data.units {
            let unit: UnitType = entry.key.parse()?;
            if catalog.get(unit).is_some() {
                return Err(SimError::CatalogParse(format!(
                    "duplicate unit entry: {}",
                    unit
                )));
            }
            catalog.insert(unit, entry.class);
        }
        Ok(catalog)
    }
}

/// TOML representation of a unit catalog
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    units: Vec<TomlUnit>,
}

#[derive(Debug, Deserialize)]
struct TomlUnit {
    key: String,
    #[serde(flatten)]
    class: UnitClass,
}

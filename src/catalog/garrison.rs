//! Environment garrisons: terrain x level -> defending troops

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::composition::Composition;
use crate::catalog::unit_type::UnitType;
use crate::core::error::{Result, SimError};

/// Environment target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Camp,
    Forest,
    Savanna,
    Lake,
    Mountain,
    Hills,
    Plains,
}

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Camp,
        Terrain::Forest,
        Terrain::Savanna,
        Terrain::Lake,
        Terrain::Mountain,
        Terrain::Hills,
        Terrain::Plains,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Terrain::Camp => "camp",
            Terrain::Forest => "forest",
            Terrain::Savanna => "savanna",
            Terrain::Lake => "lake",
            Terrain::Mountain => "mountain",
            Terrain::Hills => "hills",
            Terrain::Plains => "plains",
        }
    }

    /// Capitalized name for logs ("Camp")
    pub fn display_name(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Wild terrains share one garrison table
    pub fn is_wild(self) -> bool {
        self != Terrain::Camp
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Terrain {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Terrain::ALL
            .into_iter()
            .find(|terrain| terrain.key() == wanted)
            .ok_or_else(|| SimError::UnknownTerrain(s.to_string()))
    }
}

/// Opaque lookup of environment garrisons
#[derive(Debug, Clone, Default)]
pub struct GarrisonTable {
    entries: AHashMap<(Terrain, u8), Composition>,
}

impl GarrisonTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Camp levels 1-10 plus the shared wilds table
    pub fn with_defaults() -> Self {
        use UnitType::*;

        let camp: [&[(UnitType, u64)]; 10] = [
            &[(Porter, 1500), (Conscript, 500)],
            &[(Porter, 3000), (Conscript, 1500), (Spy, 500), (Halberdier, 1000)],
            &[
                (Porter, 6000),
                (Conscript, 2000),
                (Spy, 1000),
                (Halberdier, 2000),
                (Minotaur, 1000),
            ],
            &[
                (Porter, 15000),
                (Conscript, 5000),
                (Spy, 2000),
                (Halberdier, 4000),
                (Minotaur, 2000),
                (LongbowMan, 1500),
            ],
            &[
                (Porter, 300000),
                (Conscript, 10000),
                (Spy, 5000),
                (Halberdier, 10000),
                (Minotaur, 4000),
                (LongbowMan, 3000),
                (SwiftStrikeDragon, 2000),
            ],
            &[
                (Porter, 45000),
                (Conscript, 15000),
                (Spy, 10000),
                (Halberdier, 20000),
                (Minotaur, 15000),
                (LongbowMan, 1000),
                (SwiftStrikeDragon, 4000),
            ],
            &[
                (Porter, 90000),
                (Conscript, 30000),
                (Spy, 15000),
                (Halberdier, 30000),
                (Minotaur, 20000),
                (LongbowMan, 15000),
                (SwiftStrikeDragon, 8000),
                (ArmoredTransport, 2000),
            ],
            &[
                (Porter, 180000),
                (Conscript, 60000),
                (Spy, 30000),
                (Halberdier, 60000),
                (Minotaur, 30000),
                (LongbowMan, 30000),
                (SwiftStrikeDragon, 20000),
                (ArmoredTransport, 4000),
            ],
            &[
                (Porter, 350000),
                (Conscript, 120000),
                (Spy, 60000),
                (Halberdier, 120000),
                (Minotaur, 60000),
                (LongbowMan, 45000),
                (SwiftStrikeDragon, 40000),
                (ArmoredTransport, 8000),
                (Giant, 5000),
            ],
            &[
                (Porter, 750000),
                (Conscript, 250000),
                (Spy, 120000),
                (Halberdier, 250000),
                (Minotaur, 120000),
                (LongbowMan, 90000),
                (SwiftStrikeDragon, 60000),
                (ArmoredTransport, 16000),
                (Giant, 10000),
                (FireMirror, 10000),
                (BattleDragon, 10000),
            ],
        ];

        // Every wild level fields all eleven types
        let wilds: [[u64; UnitType::COUNT]; 10] = [
            [5000, 2500, 1000, 500, 250, 100, 50, 25, 12, 5, 2],
            [10000, 5000, 2000, 1000, 500, 200, 100, 50, 25, 10, 5],
            [20000, 10000, 4000, 2000, 1000, 400, 200, 100, 50, 20, 10],
            [40000, 20000, 8000, 4000, 2000, 800, 400, 200, 100, 40, 20],
            [80000, 40000, 16000, 8000, 4000, 1600, 800, 400, 200, 80, 40],
            [120000, 60000, 24000, 12000, 6000, 2400, 1200, 600, 300, 120, 60],
            [180000, 90000, 36000, 18000, 9000, 3600, 1800, 900, 450, 180, 90],
            [270000, 135000, 54000, 27000, 13500, 5400, 2700, 1350, 675, 270, 135],
            [400000, 200000, 80000, 40000, 20000, 8000, 4000, 2000, 1000, 400, 200],
            [600000, 300000, 120000, 60000, 30000, 12000, 6000, 3000, 1500, 600, 300],
        ];

        let mut table = Self::new();
        for (level, troops) in (1u8..).zip(camp) {
            table.insert(Terrain::Camp, level, troops.iter().copied().collect());
        }
        for terrain in Terrain::ALL.into_iter().filter(|t| t.is_wild()) {
            for (level, counts) in (1u8..).zip(wilds.iter()) {
                let troops = UnitType::ALL.into_iter().zip(counts.iter().copied()).collect();
                table.insert(terrain, level, troops);
            }
        }
        table
    }

    pub fn insert(&mut self, terrain: Terrain, level: u8, troops: Composition) {
        self.entries.insert((terrain, level), troops);
    }

    /// Defending troops for a terrain and level
    pub fn lookup(&self, terrain: Terrain, level: u8) -> Result<Composition> {
        self.entries
            .get(&(terrain, level))
            .copied()
            .ok_or(SimError::UnknownGarrison { terrain, level })
    }

    /// Levels available for a terrain, ascending
    pub fn levels(&self, terrain: Terrain) -> Vec<u8> {
        let mut levels: Vec<u8> = self
            .entries
            .keys()
            .filter(|(t, _)| *t == terrain)
            .map(|&(_, level)| level)
            .collect();
        levels.sort_unstable();
        levels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load garrisons from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse garrisons from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlGarrisons = toml::from_str(content)?;

        let mut table = Self::new();
        for entry in toml_data.garrisons {
            let terrain: Terrain = entry.terrain.parse()?;
            let mut troops = Composition::new();
            for (key, count) in entry.troops {
                troops.set(key.parse()?, count);
            }
            table.insert(terrain, entry.level, troops);
        }
        Ok(table)
    }
}

/// TOML representation of the garrison table
#[derive(Debug, Deserialize)]
struct TomlGarrisons {
    garrisons: Vec<TomlGarrison>,
}

#[derive(Debug, Deserialize)]
struct TomlGarrison {
    terrain: String,
    level: u8,
    troops: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camp_level_one() {
        let table = GarrisonTable::with_defaults();
        let troops = table.lookup(Terrain::Camp, 1).unwrap();
        assert_eq!(troops.get(UnitType::Porter), 1500);
        assert_eq!(troops.get(UnitType::Conscript), 500);
        assert_eq!(troops.total(), 2000);
    }

    #[test]
    fn test_wilds_share_one_table() {
        let table = GarrisonTable::with_defaults();
        let forest = table.lookup(Terrain::Forest, 7).unwrap();
        let plains = table.lookup(Terrain::Plains, 7).unwrap();
        assert_eq!(forest, plains);
        assert_eq!(forest.get(UnitType::BattleDragon), 90);
    }

    #[test]
    fn test_every_terrain_has_ten_levels() {
        let table = GarrisonTable::with_defaults();
        for terrain in Terrain::ALL {
            assert_eq!(table.levels(terrain), (1..=10).collect::<Vec<u8>>());
        }
        assert_eq!(table.len(), 70);
    }

    #[test]
    fn test_missing_level_is_configuration_error() {
        let table = GarrisonTable::with_defaults();
        let err = table.lookup(Terrain::Camp, 11).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Could not determine defender troops"));
    }

    #[test]
    fn test_terrain_parse_and_display() {
        assert_eq!("Savanna".parse::<Terrain>().unwrap(), Terrain::Savanna);
        assert_eq!(Terrain::Hills.display_name(), "Hills");
        assert!("swamp".parse::<Terrain>().is_err());
    }

    #[test]
    fn test_parse_toml_garrisons() {
        let table = GarrisonTable::parse_toml(
            r#"
            [[garrisons]]
            terrain = "lake"
            level = 2
            troops = { spy = 40, longbowMan = 12 }
            "#,
        )
        .unwrap();

        let troops = table.lookup(Terrain::Lake, 2).unwrap();
        assert_eq!(troops.get(UnitType::Spy), 40);
        assert_eq!(troops.get(UnitType::LongbowMan), 12);
        assert!(table.lookup(Terrain::Lake, 1).is_err());
    }
}

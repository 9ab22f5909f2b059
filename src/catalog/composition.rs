//! Per-type troop counts for one side of a battle

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::unit_type::UnitType;

/// Troop counts indexed by [`UnitType`]
///
/// Serializes as a map of unit key to count, omitting empty entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<UnitType, u64>", into = "BTreeMap<UnitType, u64>")]
pub struct Composition {
    counts: [u64; UnitType::COUNT],
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// A force made of a single unit type
    pub fn single(unit: UnitType, count: u64) -> Self {
        Self::new().with(unit, count)
    }

    /// Builder-style setter
    pub fn with(mut self, unit: UnitType, count: u64) -> Self {
        self.set(unit, count);
        self
    }

    pub fn get(&self, unit: UnitType) -> u64 {
        self.counts[unit.index()]
    }

    pub fn set(&mut self, unit: UnitType, count: u64) {
        self.counts[unit.index()] = count;
    }

    /// Total troops across all types
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Present unit types with their counts, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (UnitType, u64)> + '_ {
        UnitType::ALL
            .into_iter()
            .map(|unit| (unit, self.get(unit)))
            .filter(|&(_, count)| count > 0)
    }
}

impl FromIterator<(UnitType, u64)> for Composition {
    fn from_iter<I: IntoIterator<Item = (UnitType, u64)>>(iter: I) -> Self {
        let mut composition = Self::new();
        for (unit, count) in iter {
            composition.set(unit, composition.get(unit) + count);
        }
        composition
    }
}

impl From<BTreeMap<UnitType, u64>> for Composition {
    fn from(map: BTreeMap<UnitType, u64>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Composition> for BTreeMap<UnitType, u64> {
    fn from(composition: Composition) -> Self {
        composition.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_skips_empty_types() {
        let force = Composition::new()
            .with(UnitType::Giant, 3)
            .with(UnitType::Porter, 10);
        let present: Vec<_> = force.iter().collect();
        assert_eq!(present, vec![(UnitType::Porter, 10), (UnitType::Giant, 3)]);
        assert_eq!(force.total(), 13);
    }

    #[test]
    fn test_from_iter_accumulates() {
        let force: Composition = vec![(UnitType::Spy, 2), (UnitType::Spy, 5)]
            .into_iter()
            .collect();
        assert_eq!(force.get(UnitType::Spy), 7);
    }

    #[test]
    fn test_json_uses_unit_keys() {
        let force = Composition::single(UnitType::SwiftStrikeDragon, 42);
        let json = serde_json::to_string(&force).unwrap();
        assert_eq!(json, r#"{"swiftStrikeDragon":42}"#);
        let back: Composition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, force);
    }
}

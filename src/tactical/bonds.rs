//! Squad bonds as an id-pair relation table
//!
//! Bonds live here, outside the units they describe. Units never hold
//! references to each other.

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

/// Unordered pairs of bonded units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BondRegistry {
    pairs: Vec<(UnitId, UnitId)>,
}

impl BondRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bond; self-bonds and duplicates are rejected
    pub fn bond(&mut self, a: UnitId, b: UnitId) -> bool {
        if a == b || self.are_bonded(a, b) {
            return false;
        }
        self.pairs.push((a, b));
        true
    }

    /// Remove a bond if present
    pub fn sever(&mut self, a: UnitId, b: UnitId) -> bool {
        let before = self.pairs.len();
        self.pairs
            .retain(|&(x, y)| !((x == a && y == b) || (x == b && y == a)));
        self.pairs.len() < before
    }

    pub fn are_bonded(&self, a: UnitId, b: UnitId) -> bool {
        self.pairs
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Every unit bonded to this one, in registration order
    pub fn bondmates(&self, unit: UnitId) -> Vec<UnitId> {
        self.pairs
            .iter()
            .filter_map(|&(x, y)| {
                if x == unit {
                    Some(y)
                } else if y == unit {
                    Some(x)
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

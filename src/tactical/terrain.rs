//! Tile terrain kinds and their movement costs
//!
//! Kinds are additive flags on a position, not exclusive tile types - a
//! flooded, electrified floor carries both kinds and both surcharges.

use serde::{Deserialize, Serialize};

/// A terrain kind present on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainKind {
    #[default]
    Open,        // No surcharge
    Stairs,      // Slow climb
    Ladder,      // Slower climb
    Water,       // Wading
    Frost,       // Slick footing
    Acid,        // Corrosive pool
    Fire,        // Burning ground
    Electrified, // Live current
    Corrosion,   // Crumbling, caustic surface
    Radiation,   // Heavily contaminated
}

impl TerrainKind {
    /// Additional movement cost on top of the base cost (additive)
    pub fn movement_cost_modifier(&self) -> u32 {
        match self {
            TerrainKind::Open => 0,
            TerrainKind::Stairs => 1,
            TerrainKind::Ladder => 2,
            TerrainKind::Water => 1,
            TerrainKind::Frost => 1,
            TerrainKind::Acid => 2,
            TerrainKind::Fire => 2,
            TerrainKind::Electrified => 2,
            TerrainKind::Corrosion => 2,
            TerrainKind::Radiation => 3,
        }
    }

    /// Is this kind an environmental hazard?
    pub fn is_hazardous(&self) -> bool {
        matches!(
            self,
            TerrainKind::Acid
                | TerrainKind::Fire
                | TerrainKind::Electrified
                | TerrainKind::Corrosion
                | TerrainKind::Radiation
                | TerrainKind::Frost
        )
    }
}

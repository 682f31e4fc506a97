//! Grid positions and spatial queries
//!
//! Square grid, integer coordinates, one height level per tile. Line of
//! sight is endpoint-flag only - no ray trace across intermediate tiles.
//! That is the ruleset, not an approximation awaiting a fix.

use serde::{Deserialize, Serialize};

use crate::tactical::constants::{
    BASE_MOVE_COST, ELEVATED_MIN_HEIGHT, HEIGHT_ACCURACY_PER_LEVEL, HEIGHT_ADVANTAGE_THRESHOLD,
    HEIGHT_DAMAGE_PER_LEVEL, LOS_BLOCK_HEIGHT, ROOFTOP_MIN_HEIGHT,
};
use crate::tactical::terrain::TerrainKind;

/// A tile location: grid coordinates, height level, and tile flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
    /// Height level, ground = 0
    pub height: i32,
    /// Terrain kinds present on this tile (additive, not exclusive)
    pub terrain: Vec<TerrainKind>,
    /// Tile cannot be entered
    pub blocks_movement: bool,
    /// Tile blocks sight regardless of height
    pub blocks_sight: bool,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            height: 0,
            terrain: Vec::new(),
            blocks_movement: false,
            blocks_sight: false,
        }
    }

    pub fn at_height(x: i32, y: i32, height: i32) -> Self {
        Self { height, ..Self::new(x, y) }
    }

    /// Straight-line distance including height, rounded to an integer
    pub fn distance3d(&self, other: &GridPosition) -> i32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dh = (self.height - other.height) as f64;
        (dx * dx + dy * dy + dh * dh).sqrt().round() as i32
    }

    /// Straight-line distance ignoring height, rounded to an integer
    ///
    /// Range and adjacency checks use this, so elevation never changes
    /// what a weapon can reach.
    pub fn distance2d(&self, other: &GridPosition) -> i32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt().round() as i32
    }

    /// Rounded 2D distance of exactly 1; diagonals round down to 1 and count
    pub fn is_adjacent(&self, other: &GridPosition) -> bool {
        self.distance2d(other) == 1
    }

    pub fn within_range(&self, other: &GridPosition, range: i32) -> bool {
        self.distance2d(other) <= range
    }

    /// Does this tile block sight (explicit flag or high elevation)?
    pub fn blocks_line_of_sight(&self) -> bool {
        self.blocks_sight || self.height >= LOS_BLOCK_HEIGHT
    }

    /// Endpoint check only: sight fails iff either end blocks it
    pub fn has_line_of_sight(&self, other: &GridPosition) -> bool {
        !self.blocks_line_of_sight() && !other.blocks_line_of_sight()
    }

    pub fn is_elevated(&self) -> bool {
        self.height >= ELEVATED_MIN_HEIGHT
    }

    pub fn has_height_advantage(&self) -> bool {
        self.height >= HEIGHT_ADVANTAGE_THRESHOLD
    }

    pub fn is_rooftop(&self) -> bool {
        self.height >= ROOFTOP_MIN_HEIGHT
    }

    /// Any hazardous terrain kind on this tile?
    pub fn is_hazardous(&self) -> bool {
        self.terrain.iter().any(|k| k.is_hazardous())
    }

    /// Cost to enter this tile: base plus every terrain surcharge
    pub fn movement_cost(&self) -> u32 {
        BASE_MOVE_COST + self.terrain.iter().map(|k| k.movement_cost_modifier()).sum::<u32>()
    }

    /// Move this position to a new height level
    ///
    /// Elevation predicates (`is_elevated`, `has_height_advantage`,
    /// `blocks_line_of_sight`) are computed from `height`, so they can
    /// never go stale after this.
    pub fn set_height(&mut self, height: i32) {
        self.height = height;
    }
}

/// Accuracy and damage bonus for shooting from `height_diff` levels above
///
/// One-directional: shooting uphill never takes a penalty here, it just
/// gets nothing.
pub fn height_advantage_bonus(height_diff: i32) -> (i32, i32) {
    if height_diff >= HEIGHT_ADVANTAGE_THRESHOLD {
        (
            height_diff * HEIGHT_ACCURACY_PER_LEVEL,
            height_diff * HEIGHT_DAMAGE_PER_LEVEL,
        )
    } else {
        (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance3d_symmetric_and_zero() {
        let a = GridPosition::at_height(2, -3, 1);
        let b = GridPosition::at_height(-5, 7, 4);
        assert_eq!(a.distance3d(&b), b.distance3d(&a));
        assert_eq!(a.distance3d(&a), 0);
    }

    #[test]
    fn test_distance3d_345_triangle() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::new(3, 4);
        assert_eq!(a.distance3d(&b), 5);
    }

    #[test]
    fn test_distance3d_counts_height() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::at_height(0, 0, 2);
        assert_eq!(a.distance3d(&b), 2);
    }

    #[test]
    fn test_distance2d_ignores_height() {
        let a = GridPosition::at_height(0, 0, 5);
        let b = GridPosition::new(3, 4);
        assert_eq!(a.distance2d(&b), 5);
        assert_eq!(a.distance2d(&a), 0);
    }

    #[test]
    fn test_adjacency_ignores_height() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::at_height(1, 0, 3);
        assert!(a.is_adjacent(&b));
        assert!(!a.is_adjacent(&a));
    }

    #[test]
    fn test_diagonal_rounds_to_adjacent() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::new(1, 1);
        assert_eq!(a.distance2d(&b), 1); // sqrt(2) rounds down
        assert!(a.is_adjacent(&b));
        assert!(!a.is_adjacent(&GridPosition::new(2, 0)));
    }

    #[test]
    fn test_within_range_boundary() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::new(6, 0);
        assert!(a.within_range(&b, 6));
        assert!(!a.within_range(&b, 5));
    }

    #[test]
    fn test_los_endpoint_flags_only() {
        let a = GridPosition::new(0, 0);
        let far = GridPosition::new(40, 0);
        assert!(a.has_line_of_sight(&far));

        let mut walled = GridPosition::new(40, 0);
        walled.blocks_sight = true;
        assert!(!a.has_line_of_sight(&walled));
    }

    #[test]
    fn test_high_tiles_block_los() {
        let a = GridPosition::new(0, 0);
        let rooftop = GridPosition::at_height(5, 0, 2);
        assert!(!a.has_line_of_sight(&rooftop));
        assert!(!rooftop.has_line_of_sight(&a));

        let ledge = GridPosition::at_height(5, 0, 1);
        assert!(a.has_line_of_sight(&ledge));
    }

    #[test]
    fn test_height_advantage_threshold() {
        assert_eq!(height_advantage_bonus(0), (0, 0));
        assert_eq!(height_advantage_bonus(1), (0, 0));
        assert_eq!(height_advantage_bonus(2), (20, 2));
        assert_eq!(height_advantage_bonus(3), (30, 3));
    }

    #[test]
    fn test_no_penalty_from_below() {
        assert_eq!(height_advantage_bonus(-2), (0, 0));
    }

    #[test]
    fn test_movement_cost_additive() {
        let mut pos = GridPosition::new(0, 0);
        assert_eq!(pos.movement_cost(), 1);

        pos.terrain = vec![TerrainKind::Water, TerrainKind::Electrified];
        assert_eq!(pos.movement_cost(), 4); // 1 base + 1 water + 2 electrified
    }

    #[test]
    fn test_set_height_updates_predicates() {
        let mut pos = GridPosition::new(0, 0);
        assert!(!pos.is_elevated());
        assert!(!pos.blocks_line_of_sight());

        pos.set_height(2);
        assert!(pos.is_elevated());
        assert!(pos.has_height_advantage());
        assert!(pos.blocks_line_of_sight());
        assert!(!pos.is_rooftop());
    }
}

//! Fixed combat rule numbers - rule shape, not tuning
//!
//! Tunable pacing values live in `core::config`. Everything here is part of
//! the rules contract and is relied on by replay compatibility; change a
//! number here and old action scripts stop reproducing.

// Height advantage
pub const HEIGHT_ADVANTAGE_THRESHOLD: i32 = 2;
pub const HEIGHT_ACCURACY_PER_LEVEL: i32 = 10;
pub const HEIGHT_DAMAGE_PER_LEVEL: i32 = 1;

// Elevation bands (tile height, ground = 0)
pub const ELEVATED_MIN_HEIGHT: i32 = 1;
pub const ROOFTOP_MIN_HEIGHT: i32 = 3;
pub const LOS_BLOCK_HEIGHT: i32 = 2;

// Flank detection arc (degrees, strict open interval)
pub const FLANK_ARC_MIN_DEG: f64 = 45.0;
pub const FLANK_ARC_MAX_DEG: f64 = 135.0;

// Action economy
pub const PISTOL_FIRE_COST: f32 = 0.5;
pub const BASE_MOVE_COST: u32 = 1;

// Damage
pub const DEFAULT_CRIT_MULTIPLIER: f32 = 2.0;

// Percentile rolls are uniform 1..=100 inclusive
pub const ROLL_MIN: i32 = 1;
pub const ROLL_MAX: i32 = 100;

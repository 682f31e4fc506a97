//! Vantage - deterministic tactical combat core for squad-based strategy games

pub mod core;
pub mod equipment;
pub mod tactical;

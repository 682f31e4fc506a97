pub mod config;
pub mod error;
pub mod types;

pub use config::EncounterConfig;
pub use error::{Result, VantageError};
pub use types::{CoverId, Faction, Turn, UnitId};

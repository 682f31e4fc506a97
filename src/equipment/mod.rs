//! Equipment profiles: weapons, armor, ammunition
//!
//! All gear is data with catalog constructors. No gear subtypes.

pub mod ammo;
pub mod armor;
pub mod weapons;

pub use ammo::{AmmoProfile, StatusPayload};
pub use armor::ArmorProfile;
pub use weapons::{WeaponClass, WeaponProfile, WeaponTech};

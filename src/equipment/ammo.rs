//! Ammunition profiles and their on-hit status payloads
//!
//! A payload is just another effect application routed through the status
//! engine - resistance and immunity apply to it like any other source.

use serde::{Deserialize, Serialize};

use crate::tactical::status::EffectKind;

/// Status rider carried by a round; rolled per damaging hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub kind: EffectKind,
    pub intensity: i32,
    pub duration: i32,
    /// Percent chance the rider applies on a damaging hit
    pub chance: i32,
}

/// Loaded ammunition type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoProfile {
    pub name: String,
    pub damage_bonus: i32,
    pub accuracy_bonus: i32,
    pub payload: Option<StatusPayload>,
}

impl AmmoProfile {
    /// Common ammo: standard rounds
    pub fn standard() -> Self {
        Self {
            name: "Standard Rounds".into(),
            damage_bonus: 0,
            accuracy_bonus: 0,
            payload: None,
        }
    }

    /// Common ammo: armor-piercing rounds
    pub fn armor_piercing() -> Self {
        Self {
            name: "AP Rounds".into(),
            damage_bonus: 2,
            accuracy_bonus: 0,
            payload: None,
        }
    }

    /// Common ammo: tracer rounds (easier follow-up, no extra punch)
    pub fn tracer() -> Self {
        Self {
            name: "Tracer Rounds".into(),
            damage_bonus: 0,
            accuracy_bonus: 10,
            payload: None,
        }
    }

    /// Payload ammo: incendiary rounds
    pub fn incendiary() -> Self {
        Self {
            name: "Incendiary Rounds".into(),
            damage_bonus: 1,
            accuracy_bonus: 0,
            payload: Some(StatusPayload {
                kind: EffectKind::Burning,
                intensity: 2,
                duration: 2,
                chance: 75,
            }),
        }
    }

    /// Payload ammo: toxin-coated rounds
    pub fn toxic() -> Self {
        Self {
            name: "Toxic Rounds".into(),
            damage_bonus: 0,
            accuracy_bonus: 0,
            payload: Some(StatusPayload {
                kind: EffectKind::Poisoned,
                intensity: 2,
                duration: 3,
                chance: 66,
            }),
        }
    }

    /// Payload ammo: caustic rounds (armor shredding over time)
    pub fn caustic() -> Self {
        Self {
            name: "Caustic Rounds".into(),
            damage_bonus: 1,
            accuracy_bonus: 0,
            payload: Some(StatusPayload {
                kind: EffectKind::Acid,
                intensity: 2,
                duration: 2,
                chance: 66,
            }),
        }
    }

    /// Payload ammo: concussive rounds
    pub fn concussive() -> Self {
        Self {
            name: "Concussive Rounds".into(),
            damage_bonus: 0,
            accuracy_bonus: -5,
            payload: Some(StatusPayload {
                kind: EffectKind::Stunned,
                intensity: 1,
                duration: 1,
                chance: 50,
            }),
        }
    }
}

impl Default for AmmoProfile {
    fn default() -> Self {
        Self::standard()
    }
}

//! Weapon profiles for the attack pipeline
//!
//! Class decides the action-point cost shape (sidearm vs pool-draining);
//! tech tier adds fixed accuracy/damage on top of the profile numbers.

use serde::{Deserialize, Serialize};

/// Weapon class - drives action cost and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    /// Sidearm; the only class with a fractional fire cost
    Pistol,
    /// Standard long arm
    Rifle,
    /// Short range, heavy hit
    Shotgun,
    /// Long range, high crit
    Sniper,
    /// Area weapon
    Launcher,
    /// Melee
    Blade,
}

/// Manufacturing tier - fixed bonus table, not per-weapon tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeaponTech {
    #[default]
    Conventional,
    Laser,
    Plasma,
    Alien,
}

impl WeaponTech {
    /// Accuracy added by the tier
    pub fn accuracy_bonus(&self) -> i32 {
        match self {
            WeaponTech::Conventional => 0,
            WeaponTech::Laser => 5,
            WeaponTech::Plasma => 10,
            WeaponTech::Alien => 15,
        }
    }

    /// Damage added by the tier
    pub fn damage_bonus(&self) -> i32 {
        match self {
            WeaponTech::Conventional => 0,
            WeaponTech::Laser => 1,
            WeaponTech::Plasma => 2,
            WeaponTech::Alien => 3,
        }
    }
}

/// Complete weapon profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    pub class: WeaponClass,
    pub tech: WeaponTech,
    pub base_damage: i32,
    pub bonus_damage: i32,
    /// Accuracy the weapon itself contributes to a shot
    pub accuracy: i32,
    pub crit_bonus: i32,
    /// Maximum 2D firing distance in tiles
    pub range: i32,
    /// Blast radius in tiles; 0 = single target
    pub area_radius: i32,
    /// Splash dealt to cover objects per resolved shot
    pub cover_damage: i32,
}

impl WeaponProfile {
    /// Damage before height, crit, and armor: base + bonus + tier
    pub fn total_damage(&self) -> i32 {
        self.base_damage + self.bonus_damage + self.tech.damage_bonus()
    }

    /// Accuracy contribution: profile + tier
    pub fn total_accuracy(&self) -> i32 {
        self.accuracy + self.tech.accuracy_bonus()
    }

    pub fn is_area(&self) -> bool {
        self.area_radius > 0
    }

    /// Common weapon: service pistol
    pub fn pistol() -> Self {
        Self {
            name: "Service Pistol".into(),
            class: WeaponClass::Pistol,
            tech: WeaponTech::Conventional,
            base_damage: 8,
            bonus_damage: 0,
            accuracy: 5,
            crit_bonus: 10,
            range: 8,
            area_radius: 0,
            cover_damage: 1,
        }
    }

    /// Common weapon: assault rifle
    pub fn rifle() -> Self {
        Self {
            name: "Assault Rifle".into(),
            class: WeaponClass::Rifle,
            tech: WeaponTech::Conventional,
            base_damage: 12,
            bonus_damage: 2,
            accuracy: 0,
            crit_bonus: 10,
            range: 14,
            area_radius: 0,
            cover_damage: 2,
        }
    }

    /// Common weapon: combat shotgun
    pub fn shotgun() -> Self {
        Self {
            name: "Combat Shotgun".into(),
            class: WeaponClass::Shotgun,
            tech: WeaponTech::Conventional,
            base_damage: 16,
            bonus_damage: 2,
            accuracy: -5,
            crit_bonus: 20,
            range: 6,
            area_radius: 0,
            cover_damage: 3,
        }
    }

    /// Common weapon: marksman rifle
    pub fn sniper_rifle() -> Self {
        Self {
            name: "Marksman Rifle".into(),
            class: WeaponClass::Sniper,
            tech: WeaponTech::Conventional,
            base_damage: 15,
            bonus_damage: 3,
            accuracy: 10,
            crit_bonus: 25,
            range: 22,
            area_radius: 0,
            cover_damage: 2,
        }
    }

    /// Common weapon: grenade launcher (radius 2 blast)
    pub fn grenade_launcher() -> Self {
        Self {
            name: "Grenade Launcher".into(),
            class: WeaponClass::Launcher,
            tech: WeaponTech::Conventional,
            base_damage: 14,
            bonus_damage: 0,
            accuracy: 0,
            crit_bonus: 0,
            range: 10,
            area_radius: 2,
            cover_damage: 10,
        }
    }

    /// Common weapon: combat knife
    pub fn combat_knife() -> Self {
        Self {
            name: "Combat Knife".into(),
            class: WeaponClass::Blade,
            tech: WeaponTech::Conventional,
            base_damage: 10,
            bonus_damage: 0,
            accuracy: 0,
            crit_bonus: 15,
            range: 1,
            area_radius: 0,
            cover_damage: 0,
        }
    }

    /// Tiered weapon: plasma rifle
    pub fn plasma_rifle() -> Self {
        Self {
            name: "Plasma Rifle".into(),
            tech: WeaponTech::Plasma,
            base_damage: 14,
            ..Self::rifle()
        }
    }
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self::rifle()
    }
}

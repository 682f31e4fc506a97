//! Armor profiles and acid degradation
//!
//! Reduction is flat per hit. Acid shreds it permanently; a corroded-out
//! plate carrier stops nothing even if the wearer still looks armored.

use serde::{Deserialize, Serialize};

/// Worn armor with a flat damage reduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorProfile {
    pub name: String,
    /// Flat damage subtracted from every hit while intact
    pub damage_reduction: i32,
    /// Structural integrity; at 0 the armor stops contributing
    pub durability: i32,
    /// Accumulated corrosion, subtracted from the reduction
    pub shredded: i32,
}

impl ArmorProfile {
    /// Reduction actually applied to a hit
    pub fn effective_reduction(&self) -> i32 {
        if self.durability <= 0 {
            return 0;
        }
        (self.damage_reduction - self.shredded).max(0)
    }

    /// Has corrosion or damage taken this armor out of play?
    pub fn is_compromised(&self) -> bool {
        self.durability <= 0 || self.effective_reduction() == 0
    }

    /// Corrode the armor: shreds reduction and eats durability
    pub fn corrode(&mut self, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.shredded += amount;
        self.durability = (self.durability - amount).max(0);
    }

    /// No armor worn
    pub fn none() -> Self {
        Self {
            name: "Unarmored".into(),
            damage_reduction: 0,
            durability: 0,
            shredded: 0,
        }
    }

    /// Common armor: kevlar vest
    pub fn kevlar_vest() -> Self {
        Self {
            name: "Kevlar Vest".into(),
            damage_reduction: 5,
            durability: 40,
            shredded: 0,
        }
    }

    /// Common armor: plated carrier
    pub fn plated_carrier() -> Self {
        Self {
            name: "Plated Carrier".into(),
            damage_reduction: 8,
            durability: 60,
            shredded: 0,
        }
    }

    /// Common armor: nano-weave suit
    pub fn nano_weave() -> Self {
        Self {
            name: "Nano-weave Suit".into(),
            damage_reduction: 12,
            durability: 80,
            shredded: 0,
        }
    }

    /// Common armor: alien carapace
    pub fn alien_carapace() -> Self {
        Self {
            name: "Alien Carapace".into(),
            damage_reduction: 10,
            durability: 70,
            shredded: 0,
        }
    }
}

impl Default for ArmorProfile {
    fn default() -> Self {
        Self::none()
    }
}

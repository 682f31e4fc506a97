//! Cover objects: one-way lifecycle, bonus degradation, flank geometry
//!
//! The flank arc is a fixed 90-degree wedge measured with atan2, open at
//! both ends. Replay compatibility depends on reproducing it exactly, so
//! resist the urge to swap in a facing-relative model.

use serde::{Deserialize, Serialize};

use ahash::AHashMap;

use crate::core::types::CoverId;
use crate::tactical::constants::{FLANK_ARC_MAX_DEG, FLANK_ARC_MIN_DEG};
use crate::tactical::grid::GridPosition;

/// Cover kind - the merged legacy table, kept as data
///
/// Several variants overlap in value; they came from two generations of
/// map content and both still appear in shipped layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CoverKind {
    #[default]
    None,
    Light,
    Heavy,
    Full,
    Flanked,
    FullCover,
    HalfCover,
    LowCover,
    DeepCover,
}

impl CoverKind {
    /// Base (defense, dodge) bonuses - static policy table
    pub fn base_bonuses(&self) -> (i32, i32) {
        match self {
            CoverKind::None => (0, 0),
            CoverKind::Light => (20, 10),
            CoverKind::Heavy => (40, 20),
            CoverKind::Full => (45, 25),
            CoverKind::Flanked => (0, 0),
            CoverKind::FullCover => (40, 20),
            CoverKind::HalfCover => (20, 10),
            CoverKind::LowCover => (15, 5),
            CoverKind::DeepCover => (50, 30),
        }
    }
}

/// Bonus attribute a cover object can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverBonus {
    Defense,
    Dodge,
}

/// Lifecycle state; transitions are one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverCondition {
    Active,
    Damaged,
    Destroyed,
}

/// A destructible cover object on a tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverState {
    pub id: CoverId,
    pub position: GridPosition,
    pub kind: CoverKind,
    pub condition: CoverCondition,
    pub durability: i32,
    pub max_durability: i32,
    pub bonuses: AHashMap<CoverBonus, i32>,
    /// Partial cover protects only on a successful chance roll per attack
    pub partial: bool,
    pub partial_chance: i32,
}

impl CoverState {
    /// Build active cover with the kind's table bonuses at full durability
    pub fn new(position: GridPosition, kind: CoverKind, max_durability: i32) -> Self {
        let (defense, dodge) = kind.base_bonuses();
        let mut bonuses = AHashMap::new();
        bonuses.insert(CoverBonus::Defense, defense);
        bonuses.insert(CoverBonus::Dodge, dodge);

        let max_durability = max_durability.max(1);
        Self {
            id: CoverId::new(),
            position,
            kind,
            condition: CoverCondition::Active,
            durability: max_durability,
            max_durability,
            bonuses,
            partial: false,
            partial_chance: 0,
        }
    }

    /// Mark this cover partial with the given protection chance
    pub fn with_partial(mut self, chance: i32) -> Self {
        self.partial = true;
        self.partial_chance = chance.clamp(0, 100);
        self
    }

    pub fn is_destroyed(&self) -> bool {
        self.condition == CoverCondition::Destroyed
    }

    /// Bonus lookup; destroyed cover grants nothing, ever
    pub fn cover_bonus(&self, attribute: CoverBonus) -> i32 {
        if self.is_destroyed() {
            return 0;
        }
        self.bonuses.get(&attribute).copied().unwrap_or(0)
    }

    /// Apply damage; returns whether the cover is destroyed afterwards
    ///
    /// Surviving damage scales every bonus by `1 - fraction * 0.5`, so
    /// heavy chips degrade protection fast while scratches barely matter.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_destroyed() {
            return true;
        }
        if amount <= 0 {
            return false;
        }

        self.durability -= amount;
        if self.durability <= 0 {
            self.destroy();
            return true;
        }

        self.condition = CoverCondition::Damaged;
        let fraction = amount as f64 / self.max_durability as f64;
        let factor = 1.0 - fraction * 0.5;
        for bonus in self.bonuses.values_mut() {
            *bonus = ((*bonus as f64) * factor).round().max(0.0) as i32;
        }
        false
    }

    fn destroy(&mut self) {
        self.condition = CoverCondition::Destroyed;
        self.durability = 0;
        self.kind = CoverKind::None;
        self.bonuses.clear();
        self.partial = false;
        self.partial_chance = 0;
    }

    /// Is an attacker at this position inside the flank arc?
    ///
    /// Destroyed cover is flanked from everywhere. Otherwise the bearing
    /// from the cover to the attacker must fall strictly inside
    /// (45, 135) degrees.
    pub fn is_flanked_from(&self, attacker: &GridPosition) -> bool {
        if self.is_destroyed() {
            return true;
        }
        let dx = (attacker.x - self.position.x) as f64;
        let dy = (attacker.y - self.position.y) as f64;
        let angle = dy.atan2(dx).to_degrees();
        angle > FLANK_ARC_MIN_DEG && angle < FLANK_ARC_MAX_DEG
    }

    /// Swap in a new kind: table bonuses, full durability, active again
    pub fn upgrade(&mut self, kind: CoverKind) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let (defense, dodge) = kind.base_bonuses();
        self.kind = kind;
        self.bonuses.insert(CoverBonus::Defense, defense);
        self.bonuses.insert(CoverBonus::Dodge, dodge);
        self.durability = self.max_durability;
        self.condition = CoverCondition::Active;
        true
    }

    /// Restore durability; never resurrects, never restores scaled bonuses
    pub fn repair(&mut self, amount: i32) -> bool {
        if self.is_destroyed() || amount <= 0 {
            return false;
        }
        if self.durability >= self.max_durability {
            return false;
        }
        self.durability = (self.durability + amount).min(self.max_durability);
        if self.durability == self.max_durability {
            self.condition = CoverCondition::Active;
        }
        true
    }
}

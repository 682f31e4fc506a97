//! Status effect engine
//!
//! One instance per kind per unit. Stacking accumulates intensity and keeps
//! the longer duration. Interactions are a fixed, ordered rule list - never
//! inferred from effect metadata.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use ahash::{AHashMap, AHashSet};

use crate::tactical::constants::{ROLL_MAX, ROLL_MIN};

/// Closed set of effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Burning,
    Poisoned,
    Acid,
    Stunned,
    Panicked,
    Suppressed,
    Healing,
}

impl EffectKind {
    /// Does this effect take the unit out of the fight while active?
    pub fn is_incapacitating(&self) -> bool {
        matches!(self, EffectKind::Stunned | EffectKind::Panicked)
    }

    /// Does this effect deal per-turn damage?
    pub fn is_damage_over_time(&self) -> bool {
        matches!(self, EffectKind::Burning | EffectKind::Poisoned)
    }
}

/// One live effect on a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub intensity: i32,
    /// Turns left; meaningless when `permanent`
    pub remaining: i32,
    pub permanent: bool,
}

impl StatusEffect {
    pub fn new(kind: EffectKind, duration: i32, intensity: i32) -> Self {
        Self {
            kind,
            intensity,
            remaining: duration,
            permanent: false,
        }
    }

    pub fn permanent(kind: EffectKind, intensity: i32) -> Self {
        Self {
            kind,
            intensity,
            remaining: 0,
            permanent: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.permanent || self.remaining > 0
    }
}

/// What one interaction pass removed or weakened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub removed: Vec<EffectKind>,
    pub weakened: Vec<EffectKind>,
}

/// A unit's owned effect list plus its resistance/immunity tables
///
/// The tables are persistent unit state (gear, capabilities); applying an
/// effect never resets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSet {
    effects: Vec<StatusEffect>,
    resistance: AHashMap<EffectKind, i32>,
    immunities: AHashSet<EffectKind>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect through the full gate: immunity, resistance roll,
    /// stack-or-insert. Returns whether anything landed.
    pub fn apply(
        &mut self,
        effect: StatusEffect,
        max_intensity: i32,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        if self.immunities.contains(&effect.kind) {
            return false;
        }

        let resistance = self.resistance_of(effect.kind);
        if resistance > 0 && rng.gen_range(ROLL_MIN..=ROLL_MAX) <= resistance {
            return false;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            if existing.intensity >= max_intensity {
                return false;
            }
            existing.intensity = (existing.intensity + effect.intensity).min(max_intensity);
            existing.remaining = existing.remaining.max(effect.remaining);
            existing.permanent = existing.permanent || effect.permanent;
            return true;
        }

        let mut effect = effect;
        effect.intensity = effect.intensity.min(max_intensity);
        self.effects.push(effect);
        true
    }

    pub fn remove(&mut self, kind: EffectKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.effects.len() < before
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// 0 when the effect is absent
    pub fn intensity_of(&self, kind: EffectKind) -> i32 {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.intensity)
            .unwrap_or(0)
    }

    /// 0 when the effect is absent
    pub fn remaining_of(&self, kind: EffectKind) -> i32 {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining)
            .unwrap_or(0)
    }

    pub fn is_incapacitated(&self) -> bool {
        self.effects.iter().any(|e| e.kind.is_incapacitating())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    // --- resistance / immunity tables ---

    pub fn resistance_of(&self, kind: EffectKind) -> i32 {
        self.resistance.get(&kind).copied().unwrap_or(0)
    }

    /// Add (or stack) percent resistance against a kind, clamped 0..=100
    pub fn add_resistance(&mut self, kind: EffectKind, percent: i32) {
        let entry = self.resistance.entry(kind).or_insert(0);
        *entry = (*entry + percent).clamp(0, 100);
    }

    pub fn grant_immunity(&mut self, kind: EffectKind) {
        self.immunities.insert(kind);
    }

    pub fn is_immune(&self, kind: EffectKind) -> bool {
        self.immunities.contains(&kind)
    }

    // --- per-turn maintenance ---

    /// Run the fixed interaction rules, in order:
    /// 1. Burning present with Stunned present: the shock burns the stun off.
    /// 2. Healing present with Poisoned present: poison intensity drops by 1,
    ///    removed at 0.
    pub fn run_interactions(&mut self) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();

        if self.has(EffectKind::Burning) && self.has(EffectKind::Stunned) {
            self.remove(EffectKind::Stunned);
            outcome.removed.push(EffectKind::Stunned);
        }

        if self.has(EffectKind::Healing) {
            if let Some(poisoned) = self
                .effects
                .iter_mut()
                .find(|e| e.kind == EffectKind::Poisoned)
            {
                poisoned.intensity -= 1;
                if poisoned.intensity <= 0 {
                    self.remove(EffectKind::Poisoned);
                    outcome.removed.push(EffectKind::Poisoned);
                } else {
                    outcome.weakened.push(EffectKind::Poisoned);
                }
            }
        }

        outcome
    }

    /// Decrement non-permanent durations; returns the kinds that expired
    pub fn tick_durations(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            if !effect.permanent {
                effect.remaining -= 1;
                if effect.remaining <= 0 {
                    expired.push(effect.kind);
                }
            }
        }
        self.effects.retain(|e| e.permanent || e.remaining > 0);
        expired
    }
}

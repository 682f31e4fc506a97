//! Support abilities: cures, stims, mind shields
//!
//! Abilities are data records with a per-ability cure chance. Using one is
//! an encounter action with the same silent-rejection shape as any other.

use serde::{Deserialize, Serialize};

use crate::tactical::status::EffectKind;

/// Closed set of usable abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Medikit,
    Stimulant,
    Mindshield,
}

/// One ability's numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityProfile {
    pub kind: AbilityKind,
    pub name: String,
    /// Percent chance the cure takes when the target kind matches
    pub cure_chance: i32,
    pub cures: Vec<EffectKind>,
    pub action_cost: f32,
    /// Turns before this ability can be used again
    pub cooldown: i32,
    /// Maximum 2D distance to the target
    pub range: i32,
}

impl AbilityProfile {
    pub fn of(kind: AbilityKind) -> Self {
        match kind {
            AbilityKind::Medikit => Self::medikit(),
            AbilityKind::Stimulant => Self::stimulant(),
            AbilityKind::Mindshield => Self::mindshield(),
        }
    }

    /// Field dressing: clears chemical and burn effects, always works
    pub fn medikit() -> Self {
        Self {
            kind: AbilityKind::Medikit,
            name: "Medikit".into(),
            cure_chance: 100,
            cures: vec![EffectKind::Burning, EffectKind::Poisoned, EffectKind::Acid],
            action_cost: 1.0,
            cooldown: 2,
            range: 1,
        }
    }

    /// Combat stim: shakes off stuns, usually
    pub fn stimulant() -> Self {
        Self {
            kind: AbilityKind::Stimulant,
            name: "Stimulant".into(),
            cure_chance: 75,
            cures: vec![EffectKind::Stunned],
            action_cost: 1.0,
            cooldown: 3,
            range: 1,
        }
    }

    /// Psionic dampener: steadies a panicked or suppressed mind
    pub fn mindshield() -> Self {
        Self {
            kind: AbilityKind::Mindshield,
            name: "Mindshield".into(),
            cure_chance: 100,
            cures: vec![EffectKind::Panicked, EffectKind::Suppressed],
            action_cost: 1.0,
            cooldown: 4,
            range: 4,
        }
    }

    pub fn can_cure(&self, kind: EffectKind) -> bool {
        self.cures.contains(&kind)
    }
}

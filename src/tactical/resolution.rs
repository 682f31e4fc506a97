//! Single-target attack resolution
//!
//! One documented pipeline, executed in a fixed order: accuracy, defense,
//! hit roll, dodge roll, crit roll, damage. Every roll comes from the
//! caller's seeded stream, so a replay with the same seed lands the same
//! shots.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::EncounterConfig;
use crate::equipment::ammo::{AmmoProfile, StatusPayload};
use crate::equipment::armor::ArmorProfile;
use crate::equipment::weapons::WeaponProfile;
use crate::tactical::constants::{ROLL_MAX, ROLL_MIN};
use crate::tactical::cover::{CoverBonus, CoverState};
use crate::tactical::grid::{height_advantage_bonus, GridPosition};
use crate::tactical::units::Unit;

/// Context the attack happens in, resolved by the caller beforehand
#[derive(Debug, Clone, Copy, Default)]
pub struct SituationalModifiers {
    /// Attacker fires from concealment
    pub attacker_concealed: bool,
    /// Attacker fires while suppressed
    pub attacker_suppressed: bool,
    /// A bonded ally stands within bond range of the attacker
    pub bonded_ally_nearby: bool,
    /// Defender hunkered this turn
    pub defender_hunkered: bool,
    /// Overwatch reaction fire; reaction shots never crit
    pub reaction_shot: bool,
}

/// Result of one resolved attack
///
/// Neither combatant is mutated. The caller applies `damage` and the
/// triggered `payload`, then handles cover splash.
#[derive(Debug, Clone, Default)]
pub struct AttackOutcome {
    pub hit: bool,
    pub dodged: bool,
    pub critical: bool,
    pub damage: i32,
    /// Final clamped to-hit chance, recorded for logs and previews
    pub hit_chance: i32,
    /// Ammo payload that passed its chance roll on a damaging hit
    pub payload: Option<StatusPayload>,
}

/// Sum every accuracy source: stats, weapon, ammo, height, situation
pub fn assemble_accuracy(
    attacker: &Unit,
    weapon: &WeaponProfile,
    ammo: &AmmoProfile,
    height_diff: i32,
    situational: &SituationalModifiers,
    config: &EncounterConfig,
) -> i32 {
    let mut accuracy = attacker.stats.accuracy + weapon.total_accuracy() + ammo.accuracy_bonus;
    accuracy += height_advantage_bonus(height_diff).0;
    if situational.attacker_concealed {
        accuracy += config.concealment_accuracy_bonus;
    }
    if situational.bonded_ally_nearby {
        accuracy += config.bond_accuracy_bonus;
    }
    if situational.attacker_suppressed {
        accuracy -= config.suppression_accuracy_penalty;
    }
    accuracy
}

/// Does this cover protect against an attack from `attacker_pos`?
///
/// Destroyed and flanked cover never protects. Partial cover protects
/// only on a successful chance roll, taken once per attack so defense
/// and dodge see the same answer.
pub fn cover_applies(
    cover: &CoverState,
    attacker_pos: &GridPosition,
    rng: &mut ChaCha8Rng,
) -> bool {
    if cover.is_destroyed() || cover.is_flanked_from(attacker_pos) {
        return false;
    }
    if cover.partial {
        return rng.gen_range(ROLL_MIN..=ROLL_MAX) <= cover.partial_chance;
    }
    true
}

/// Clamp accuracy minus defense into the configured hit-chance window
pub fn hit_chance(accuracy: i32, defense: i32, config: &EncounterConfig) -> i32 {
    (accuracy - defense).clamp(config.min_hit_chance, config.max_hit_chance)
}

/// Total damage: weapon and ammo and height, crit multiplier, then armor
pub fn compute_damage(
    weapon: &WeaponProfile,
    ammo: &AmmoProfile,
    height_diff: i32,
    critical: bool,
    crit_multiplier: f32,
    armor: &ArmorProfile,
) -> i32 {
    let mut raw = weapon.total_damage() + ammo.damage_bonus + height_advantage_bonus(height_diff).1;
    if critical {
        raw = (raw as f32 * crit_multiplier).round() as i32;
    }
    (raw - armor.effective_reduction()).max(0)
}

/// Run the full attack pipeline
///
/// Roll order is fixed: cover applicability (partial cover only), hit,
/// dodge, crit, payload. A miss stops the sequence, so later rolls are
/// never consumed for attacks that cannot use them.
pub fn resolve_attack(
    attacker: &Unit,
    defender: &Unit,
    weapon: &WeaponProfile,
    ammo: &AmmoProfile,
    cover: Option<&CoverState>,
    situational: &SituationalModifiers,
    config: &EncounterConfig,
    rng: &mut ChaCha8Rng,
) -> AttackOutcome {
    let height_diff = attacker.position.height - defender.position.height;
    let accuracy = assemble_accuracy(attacker, weapon, ammo, height_diff, situational, config);

    let protected = match cover {
        Some(state) => cover_applies(state, &attacker.position, rng),
        None => false,
    };

    let mut defense = defender.stats.defense;
    let mut dodge = defender.stats.dodge;
    if protected {
        if let Some(state) = cover {
            defense += state.cover_bonus(CoverBonus::Defense);
            dodge += state.cover_bonus(CoverBonus::Dodge);
        }
    }
    if situational.defender_hunkered {
        defense += config.hunker_defense_bonus;
    }

    let chance = hit_chance(accuracy, defense, config);
    let mut outcome = AttackOutcome {
        hit_chance: chance,
        ..Default::default()
    };

    if rng.gen_range(ROLL_MIN..=ROLL_MAX) > chance {
        return outcome;
    }
    outcome.hit = true;

    if rng.gen_range(ROLL_MIN..=ROLL_MAX) <= dodge {
        outcome.dodged = true;
        return outcome;
    }

    if !situational.reaction_shot {
        let crit_target = attacker.stats.crit_chance + weapon.crit_bonus;
        outcome.critical = rng.gen_range(ROLL_MIN..=ROLL_MAX) <= crit_target;
    }

    outcome.damage = compute_damage(
        weapon,
        ammo,
        height_diff,
        outcome.critical,
        attacker.stats.crit_multiplier,
        &defender.armor,
    );

    if let Some(payload) = &ammo.payload {
        if outcome.damage > 0 && rng.gen_range(ROLL_MIN..=ROLL_MAX) <= payload.chance {
            outcome.payload = Some(payload.clone());
        }
    }

    outcome
}

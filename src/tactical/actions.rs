//! Action kinds, costs, and per-action gating
//!
//! The cost asymmetry is the rule, not a bug: a sidearm shot nicks the
//! pool, everything else drains whatever is left, however little.

use serde::{Deserialize, Serialize};

use crate::equipment::weapons::{WeaponClass, WeaponProfile};
use crate::tactical::constants::PISTOL_FIRE_COST;
use crate::tactical::status::EffectKind;
use crate::tactical::units::Unit;

/// What a unit can attempt on its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Fire,
    Overwatch,
    UseAbility,
    Hunker,
}

/// Gate an action against the unit's state
///
/// Stunned and panicked block everything. Suppression only forbids
/// settling into overwatch; a suppressed unit can still move or shoot
/// (with the accuracy penalty applied elsewhere).
pub fn can_perform(unit: &Unit, action: ActionKind) -> bool {
    if !unit.can_act() {
        return false;
    }
    match action {
        ActionKind::Overwatch => !unit.effects.has(EffectKind::Suppressed),
        _ => true,
    }
}

/// Action points a shot with this weapon costs from the given pool
pub fn fire_cost(weapon: &WeaponProfile, remaining: f32) -> f32 {
    match weapon.class {
        WeaponClass::Pistol => PISTOL_FIRE_COST,
        _ => remaining,
    }
}

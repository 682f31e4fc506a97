//! Combat event records
//!
//! Every mutation appends one typed event. The log is part of replay
//! output: same seed, same script, same log, byte for byte.

use serde::{Deserialize, Serialize};

use crate::core::types::{CoverId, Turn, UnitId};
use crate::tactical::abilities::AbilityKind;
use crate::tactical::status::EffectKind;

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub turn: Turn,
    pub event_type: CombatEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEventType {
    UnitSpawned { unit_id: UnitId },
    CoverPlaced { cover_id: CoverId },
    UnitsBonded { a: UnitId, b: UnitId },
    UnitMoved { unit_id: UnitId },
    AttackResolved { attacker: UnitId, defender: UnitId, hit: bool, critical: bool, damage: i32 },
    AreaAttackResolved { attacker: UnitId, targets: usize },
    AbilityUsed { unit_id: UnitId, ability: AbilityKind },
    UnitKilled { unit_id: UnitId },
    UnitRevived { unit_id: UnitId },
    CoverDamaged { cover_id: CoverId },
    CoverDestroyed { cover_id: CoverId },
    EffectApplied { unit_id: UnitId, kind: EffectKind },
    EffectExpired { unit_id: UnitId, kind: EffectKind },
    EffectCured { unit_id: UnitId, kind: EffectKind },
    OverwatchSet { unit_id: UnitId },
    OverwatchTriggered { watcher: UnitId, target: UnitId },
    UnitHunkered { unit_id: UnitId },
    UnitConcealed { unit_id: UnitId },
    TurnAdvanced { turn: Turn },
}

/// Append-only event history for an encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: CombatEventType, description: String, turn: Turn) {
        self.events.push(CombatEvent {
            turn,
            event_type,
            description,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

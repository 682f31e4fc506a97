//! Tactical combat core - grid, cover, status effects, attack resolution
//!
//! NOT a game engine: no pathfinding, no AI, no rendering. The encounter
//! takes scripted actions, resolves them through one documented pipeline,
//! and reports typed results and events, deterministically per seed.

pub mod abilities;
pub mod actions;
pub mod bonds;
pub mod constants;
pub mod cover;
pub mod encounter;
pub mod events;
pub mod grid;
pub mod resolution;
pub mod status;
pub mod terrain;
pub mod units;

// Re-exports for convenient access
pub use abilities::{AbilityKind, AbilityProfile};
pub use actions::{can_perform, fire_cost, ActionKind};
pub use bonds::BondRegistry;
pub use constants::*;
pub use cover::{CoverBonus, CoverCondition, CoverKind, CoverState};
pub use encounter::{
    AreaAttackResult, AttackResult, CureResult, EncounterState, MoveResult, ReactionShot,
    TurnReport,
};
pub use events::{CombatEvent, CombatEventType, EventLog};
pub use grid::{height_advantage_bonus, GridPosition};
pub use resolution::{
    assemble_accuracy, compute_damage, cover_applies, hit_chance, resolve_attack, AttackOutcome,
    SituationalModifiers,
};
pub use status::{EffectKind, EffectSet, InteractionOutcome, StatusEffect};
pub use terrain::TerrainKind;
pub use units::{Capability, CombatStats, StatusTickReport, Unit, UnitKind};

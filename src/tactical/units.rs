//! Units: one record for every fighter on the grid
//!
//! No unit hierarchy. Kind is a dispatch tag, capabilities are data, and
//! kind-specific numbers live in stat tables. A ruler is a row, not a
//! subclass.

use serde::{Deserialize, Serialize};

use ahash::AHashMap;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{Faction, UnitId};
use crate::equipment::ammo::AmmoProfile;
use crate::equipment::armor::ArmorProfile;
use crate::equipment::weapons::WeaponProfile;
use crate::tactical::abilities::AbilityKind;
use crate::tactical::constants::DEFAULT_CRIT_MULTIPLIER;
use crate::tactical::grid::GridPosition;
use crate::tactical::status::{EffectKind, EffectSet, InteractionOutcome, StatusEffect};

/// Unit archetype - a tag, never a class hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Soldier,
    Alien,
    Vip,
    Ruler,
}

/// Optional capability data; adjusts numbers, never behavior shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Psionic discipline: immune to panic
    Psionics,
    /// Reflex training: much better overwatch trigger
    Bladestorm,
    /// Can enter concealment
    Stealth,
}

/// Combat statistics shared by every unit kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub accuracy: i32,
    pub defense: i32,
    pub dodge: i32,
    pub crit_chance: i32,
    pub crit_multiplier: f32,
    /// Percent chance an overwatch reaction actually fires
    pub overwatch_chance: i32,
}

impl CombatStats {
    /// Kind defaults - configuration data, not per-class code
    pub fn default_for(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Soldier => Self {
                accuracy: 70,
                defense: 0,
                dodge: 10,
                crit_chance: 10,
                crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
                overwatch_chance: 50,
            },
            UnitKind::Alien => Self {
                accuracy: 65,
                defense: 5,
                dodge: 15,
                crit_chance: 15,
                crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
                overwatch_chance: 40,
            },
            UnitKind::Vip => Self {
                accuracy: 40,
                defense: 0,
                dodge: 20,
                crit_chance: 0,
                crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
                overwatch_chance: 0,
            },
            UnitKind::Ruler => Self {
                accuracy: 80,
                defense: 15,
                dodge: 25,
                crit_chance: 20,
                crit_multiplier: 2.5,
                overwatch_chance: 60,
            },
        }
    }
}

/// What one status-effect phase did to a unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusTickReport {
    pub interactions: InteractionOutcome,
    pub damage_taken: i32,
    pub healed: i32,
    pub armor_shredded: i32,
    pub expired: Vec<EffectKind>,
    pub died: bool,
}

/// A fighter on the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    pub capabilities: Vec<Capability>,
    pub faction: Faction,

    // Position
    pub position: GridPosition,

    // Vitals
    pub max_health: i32,
    pub health: i32,
    pub alive: bool,

    // Action economy
    pub action_points: f32,

    // Combat
    pub stats: CombatStats,
    pub weapon: WeaponProfile,
    pub armor: ArmorProfile,
    pub ammo: AmmoProfile,

    // Stances
    pub overwatch: bool,
    pub concealed: bool,
    pub hunkered: bool,

    // Owned state
    pub effects: EffectSet,
    pub cooldowns: AHashMap<AbilityKind, i32>,
}

impl Unit {
    /// Build a unit of a kind with its default stats and no gear opinions
    pub fn new(name: &str, kind: UnitKind, faction: Faction, position: GridPosition) -> Self {
        let max_health = match kind {
            UnitKind::Soldier => 50,
            UnitKind::Alien => 45,
            UnitKind::Vip => 30,
            UnitKind::Ruler => 120,
        };
        Self {
            id: UnitId::new(),
            name: name.to_string(),
            kind,
            capabilities: Vec::new(),
            faction,
            position,
            max_health,
            health: max_health,
            alive: true,
            action_points: 0.0,
            stats: CombatStats::default_for(kind),
            weapon: WeaponProfile::default(),
            armor: ArmorProfile::default(),
            ammo: AmmoProfile::default(),
            overwatch: false,
            concealed: false,
            hunkered: false,
            effects: EffectSet::new(),
            cooldowns: AHashMap::new(),
        }
    }

    /// Common loadout: rifle soldier in a kevlar vest
    pub fn soldier(name: &str, faction: Faction, position: GridPosition) -> Self {
        let mut unit = Self::new(name, UnitKind::Soldier, faction, position);
        unit.weapon = WeaponProfile::rifle();
        unit.armor = ArmorProfile::kevlar_vest();
        unit
    }

    /// Common loadout: plasma alien in carapace
    pub fn alien(name: &str, faction: Faction, position: GridPosition) -> Self {
        let mut unit = Self::new(name, UnitKind::Alien, faction, position);
        unit.weapon = WeaponProfile::plasma_rifle();
        unit.armor = ArmorProfile::alien_carapace();
        unit
    }

    /// Common loadout: unarmored VIP with a sidearm
    pub fn vip(name: &str, faction: Faction, position: GridPosition) -> Self {
        let mut unit = Self::new(name, UnitKind::Vip, faction, position);
        unit.weapon = WeaponProfile::pistol();
        unit
    }

    /// Attach a capability and apply its stat adjustments
    pub fn with_capability(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Psionics => self.effects.grant_immunity(EffectKind::Panicked),
            Capability::Bladestorm => self.stats.overwatch_chance += 25,
            Capability::Stealth => {}
        }
        self.capabilities.push(capability);
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Alive, has points, and no incapacitating effect
    pub fn can_act(&self) -> bool {
        self.alive && self.action_points > 0.0 && !self.effects.is_incapacitated()
    }

    /// Apply damage; returns true if the unit died from this hit
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.alive || amount <= 0 {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.alive = false;
            self.overwatch = false;
            self.concealed = false;
            self.hunkered = false;
            return true;
        }
        false
    }

    /// Restore health on a living unit, clamped to max
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.alive || amount <= 0 {
            return 0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// The one distinct transition back from death
    ///
    /// Rejected on living units. Restores clamped health and nothing else;
    /// whatever effects were on the body stay on it.
    pub fn revive(&mut self, health: i32) -> bool {
        if self.alive {
            return false;
        }
        self.alive = true;
        self.health = health.clamp(1, self.max_health);
        true
    }

    // --- action points ---

    /// Spend points, clamped at zero
    pub fn spend_action_points(&mut self, amount: f32) {
        self.action_points = (self.action_points - amount).max(0.0);
    }

    /// Turn-start reset: fresh pool, transient stances drop
    pub fn reset_action_points(&mut self, pool: f32) {
        self.action_points = pool;
        self.overwatch = false;
        self.hunkered = false;
    }

    // --- suppression contract ---

    pub fn is_suppressed(&self) -> bool {
        self.effects.has(EffectKind::Suppressed)
    }

    pub fn suppression_turns_remaining(&self) -> i32 {
        self.effects.remaining_of(EffectKind::Suppressed)
    }

    /// Route suppression through the normal effect gate
    pub fn apply_suppression(
        &mut self,
        turns: i32,
        max_intensity: i32,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        self.effects.apply(
            StatusEffect::new(EffectKind::Suppressed, turns, 1),
            max_intensity,
            rng,
        )
    }

    pub fn remove_suppression(&mut self) -> bool {
        self.effects.remove(EffectKind::Suppressed)
    }

    // --- per-turn maintenance ---

    /// Interaction rules, damage-over-time ticks, then duration expiry
    ///
    /// A unit that dies mid-phase freezes immediately: later ticks and the
    /// expiry pass do not run on the corpse.
    pub fn update_status_effects(&mut self) -> StatusTickReport {
        let mut report = StatusTickReport {
            interactions: self.effects.run_interactions(),
            ..Default::default()
        };

        for kind in [EffectKind::Burning, EffectKind::Poisoned] {
            let intensity = self.effects.intensity_of(kind);
            if intensity > 0 {
                report.damage_taken += intensity;
                if self.take_damage(intensity) {
                    report.died = true;
                    return report;
                }
            }
        }

        let shred = self.effects.intensity_of(EffectKind::Acid);
        if shred > 0 {
            self.armor.corrode(shred);
            report.armor_shredded = shred;
        }

        let mend = self.effects.intensity_of(EffectKind::Healing);
        if mend > 0 {
            report.healed = self.heal(mend);
        }

        report.expired = self.effects.tick_durations();
        report
    }

    /// Decrement ability cooldowns, dropping finished ones
    pub fn tick_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining -= 1;
        }
        self.cooldowns.retain(|_, remaining| *remaining > 0);
    }

    pub fn cooldown_remaining(&self, ability: AbilityKind) -> i32 {
        self.cooldowns.get(&ability).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn soldier() -> Unit {
        Unit::soldier("Vasquez", Faction::Player, GridPosition::new(0, 0))
    }

    #[test]
    fn test_spawn_uses_kind_table() {
        let unit = soldier();
        assert_eq!(unit.stats.accuracy, 70);
        assert_eq!(unit.health, unit.max_health);
        assert!(unit.alive);
        assert_eq!(unit.action_points, 0.0); // pool arrives at turn start
    }

    #[test]
    fn test_damage_and_death() {
        let mut unit = soldier();
        assert!(!unit.take_damage(unit.max_health - 1));
        assert!(unit.alive);
        assert!(unit.take_damage(1));
        assert!(!unit.alive);
        assert_eq!(unit.health, 0);
    }

    #[test]
    fn test_dead_unit_cannot_act() {
        let mut unit = soldier();
        unit.reset_action_points(2.0);
        unit.take_damage(1000);
        assert!(!unit.can_act());
        assert!(!unit.take_damage(10)); // corpse takes no further transitions
        assert_eq!(unit.heal(10), 0);
    }

    #[test]
    fn test_death_clears_stances() {
        let mut unit = soldier();
        unit.overwatch = true;
        unit.concealed = true;
        unit.hunkered = true;
        unit.take_damage(1000);
        assert!(!unit.overwatch && !unit.concealed && !unit.hunkered);
    }

    #[test]
    fn test_revive_is_distinct_transition() {
        let mut unit = soldier();
        assert!(!unit.revive(10)); // living units reject it
        unit.take_damage(1000);
        assert!(unit.revive(10));
        assert!(unit.alive);
        assert_eq!(unit.health, 10);
        assert!(!unit.revive(10)); // second revive rejected
    }

    #[test]
    fn test_revive_clamps_health() {
        let mut unit = soldier();
        unit.take_damage(1000);
        assert!(unit.revive(9999));
        assert_eq!(unit.health, unit.max_health);
    }

    #[test]
    fn test_incapacitated_cannot_act() {
        let mut unit = soldier();
        unit.reset_action_points(2.0);
        assert!(unit.can_act());
        unit.effects
            .apply(StatusEffect::new(EffectKind::Stunned, 1, 1), 10, &mut rng());
        assert!(!unit.can_act());
    }

    #[test]
    fn test_zero_pool_cannot_act() {
        let mut unit = soldier();
        unit.reset_action_points(1.0);
        unit.spend_action_points(1.0);
        assert!(!unit.can_act());
    }

    #[test]
    fn test_spend_clamps_at_zero() {
        let mut unit = soldier();
        unit.reset_action_points(0.5);
        unit.spend_action_points(2.0);
        assert_eq!(unit.action_points, 0.0);
    }

    #[test]
    fn test_reset_drops_transient_stances() {
        let mut unit = soldier();
        unit.overwatch = true;
        unit.hunkered = true;
        unit.concealed = true;
        unit.reset_action_points(2.0);
        assert!(!unit.overwatch);
        assert!(!unit.hunkered);
        assert!(unit.concealed); // concealment survives until the unit fires
        assert_eq!(unit.action_points, 2.0);
    }

    #[test]
    fn test_suppression_contract() {
        let mut unit = soldier();
        assert!(!unit.is_suppressed());
        assert!(unit.apply_suppression(2, 10, &mut rng()));
        assert!(unit.is_suppressed());
        assert_eq!(unit.suppression_turns_remaining(), 2);
        assert!(unit.remove_suppression());
        assert!(!unit.is_suppressed());
        assert_eq!(unit.suppression_turns_remaining(), 0);
    }

    #[test]
    fn test_psionics_blocks_panic() {
        let mut unit = soldier().with_capability(Capability::Psionics);
        assert!(!unit
            .effects
            .apply(StatusEffect::new(EffectKind::Panicked, 3, 1), 10, &mut rng()));
        assert!(!unit.effects.has(EffectKind::Panicked));
    }

    #[test]
    fn test_bladestorm_sharpens_overwatch() {
        let base = soldier().stats.overwatch_chance;
        let unit = soldier().with_capability(Capability::Bladestorm);
        assert_eq!(unit.stats.overwatch_chance, base + 25);
    }

    #[test]
    fn test_burning_ticks_damage() {
        let mut unit = soldier();
        unit.effects
            .apply(StatusEffect::new(EffectKind::Burning, 2, 3), 10, &mut rng());
        let report = unit.update_status_effects();
        assert_eq!(report.damage_taken, 3);
        assert_eq!(unit.health, unit.max_health - 3);
        assert!(!report.died);
    }

    #[test]
    fn test_dot_can_kill_and_freezes() {
        let mut unit = soldier();
        unit.health = 2;
        unit.effects
            .apply(StatusEffect::new(EffectKind::Burning, 3, 5), 10, &mut rng());
        unit.effects
            .apply(StatusEffect::new(EffectKind::Healing, 3, 5), 10, &mut rng());
        let report = unit.update_status_effects();
        assert!(report.died);
        assert!(!unit.alive);
        assert_eq!(report.healed, 0); // healing never ran on the corpse
        assert!(unit.effects.has(EffectKind::Burning)); // frozen, not expired
    }

    #[test]
    fn test_acid_shreds_armor() {
        let mut unit = soldier();
        let reduction_before = unit.armor.effective_reduction();
        unit.effects
            .apply(StatusEffect::new(EffectKind::Acid, 2, 2), 10, &mut rng());
        let report = unit.update_status_effects();
        assert_eq!(report.armor_shredded, 2);
        assert_eq!(unit.armor.effective_reduction(), reduction_before - 2);
    }

    #[test]
    fn test_healing_restores_health() {
        let mut unit = soldier();
        unit.take_damage(10);
        unit.effects
            .apply(StatusEffect::new(EffectKind::Healing, 2, 4), 10, &mut rng());
        let report = unit.update_status_effects();
        assert_eq!(report.healed, 4);
        assert_eq!(unit.health, unit.max_health - 6);
    }

    #[test]
    fn test_cooldowns_tick_to_zero() {
        let mut unit = soldier();
        unit.cooldowns.insert(AbilityKind::Medikit, 2);
        unit.tick_cooldowns();
        assert_eq!(unit.cooldown_remaining(AbilityKind::Medikit), 1);
        unit.tick_cooldowns();
        assert_eq!(unit.cooldown_remaining(AbilityKind::Medikit), 0);
        assert!(unit.cooldowns.is_empty());
    }
}

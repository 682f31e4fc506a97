//! Encounter configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Fixed combat rules (flank arc,
//! height thresholds, weapon cost asymmetry) are not tunable and live in
//! `tactical::constants`.

use serde::{Deserialize, Serialize};

/// Tunable configuration for one encounter
///
/// These values have been tuned against the reference skirmish scenarios.
/// Changing them shifts pacing and lethality but never rule shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    // === ACTION ECONOMY ===
    /// Action points every living unit is reset to at turn start
    ///
    /// Two points lets a unit move and still fire a pistol-class weapon,
    /// or commit the whole pool to a heavy shot. Fractional values work;
    /// the pool itself is fractional.
    pub default_action_points: f32,

    // === HIT CHANCE CLAMPS ===
    /// Floor for computed hit chance (percent)
    ///
    /// Keeps a wildly outmatched shot from becoming literally impossible,
    /// so the roll stream stays meaningful for every attack.
    pub min_hit_chance: i32,

    /// Ceiling for computed hit chance (percent)
    ///
    /// Keeps a stacked shot from becoming an auto-hit; a 1-in-100 whiff
    /// always remains.
    pub max_hit_chance: i32,

    // === STATUS EFFECTS ===
    /// Cap on a single effect's stacked intensity
    ///
    /// Stacking the same kind accumulates intensity up to this cap;
    /// applications against a capped instance are rejected outright.
    pub max_effect_intensity: i32,

    // === SQUAD BONDS ===
    /// Maximum 2D distance at which a bonded ally steadies the shooter
    pub bond_range: i32,

    /// Accuracy bonus while a bonded ally is within `bond_range`
    pub bond_accuracy_bonus: i32,

    // === STEALTH ===
    /// Accuracy bonus for an attack made while concealed
    ///
    /// Applied once; firing breaks concealment.
    pub concealment_accuracy_bonus: i32,

    // === SUPPRESSION ===
    /// Accuracy penalty while suppressed
    ///
    /// Large on purpose: suppression is area denial, not damage.
    pub suppression_accuracy_penalty: i32,

    // === HUNKER ===
    /// Extra defense while hunkered behind non-destroyed cover
    ///
    /// Cleared at the unit's next action-point reset.
    pub hunker_defense_bonus: i32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            // Action economy
            default_action_points: 2.0,

            // Hit chance clamps (1..=99 keeps both tails live)
            min_hit_chance: 1,
            max_hit_chance: 99,

            // Status effects
            max_effect_intensity: 10,

            // Bonds
            bond_range: 4,
            bond_accuracy_bonus: 5,

            // Stealth
            concealment_accuracy_bonus: 25,

            // Suppression
            suppression_accuracy_penalty: 30,

            // Hunker
            hunker_defense_bonus: 30,
        }
    }
}

impl EncounterConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.default_action_points <= 0.0 {
            return Err(format!(
                "default_action_points ({}) must be positive",
                self.default_action_points
            ));
        }

        if self.min_hit_chance < 0 || self.max_hit_chance > 100 {
            return Err(format!(
                "hit chance clamps ({}..{}) must stay within 0..=100",
                self.min_hit_chance, self.max_hit_chance
            ));
        }

        if self.min_hit_chance >= self.max_hit_chance {
            return Err(format!(
                "min_hit_chance ({}) should be < max_hit_chance ({})",
                self.min_hit_chance, self.max_hit_chance
            ));
        }

        if self.max_effect_intensity < 1 {
            return Err("max_effect_intensity must be at least 1".into());
        }

        if self.bond_range < 0
            || self.bond_accuracy_bonus < 0
            || self.concealment_accuracy_bonus < 0
            || self.suppression_accuracy_penalty < 0
            || self.hunker_defense_bonus < 0
        {
            return Err("modifier magnitudes must be non-negative".into());
        }

        Ok(())
    }

    /// Parse a config from TOML text, then validate it
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: EncounterConfig =
            toml::from_str(content).map_err(|e| format!("Failed to parse tuning TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a named tuning file from `data/tuning/{name}.toml`
    pub fn load(name: &str) -> Result<Self, String> {
        let path = tuning_path(name);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read tuning file {:?}: {}", path, e))?;
        Self::from_toml_str(&content)
    }
}

/// Path to a named tuning file
fn tuning_path(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from("data/tuning").join(format!("{}.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EncounterConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_clamps_rejected() {
        let mut config = EncounterConfig::default();
        config.min_hit_chance = 90;
        config.max_hit_chance = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nonpositive_pool_rejected() {
        let mut config = EncounterConfig::default();
        config.default_action_points = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = EncounterConfig::from_toml_str("default_action_points = 3.0\n")
            .expect("partial tuning should parse");
        assert_eq!(config.default_action_points, 3.0);
        assert_eq!(config.max_hit_chance, 99);
    }

    #[test]
    fn test_default_tuning_file_loads() {
        let config = EncounterConfig::load("default").expect("default tuning should load");
        assert!(config.validate().is_ok());
    }
}

//! Organism tuning parameters
//!
//! Every constant the kernel uses lives here, grouped by concern. The
//! defaults reproduce the reference organism; presets can be stored as RON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::organism::BorderlinePolicy;
use crate::store::CollisionPolicy;

/// Errors raised while building or loading an [`OrganismConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to parse organism config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize organism config: {0}")]
    Serialize(#[from] ron::Error),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete organism configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismConfig {
    /// Fixed RNG seed; `None` draws a fresh one per organism
    #[serde(default)]
    pub seed: Option<u64>,

    /// Voxel count above which the per-voxel pass runs on the rayon pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    #[serde(default)]
    pub body: BodyParams,

    #[serde(default)]
    pub pulse: PulseParams,

    #[serde(default)]
    pub emotion: EmotionParams,

    #[serde(default)]
    pub creature: CreatureParams,

    #[serde(default)]
    pub compatibility: CompatibilityParams,

    #[serde(default)]
    pub integration: IntegrationParams,

    #[serde(default)]
    pub rejection: RejectionParams,
}

fn default_parallel_threshold() -> usize {
    20_000
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel_threshold: default_parallel_threshold(),
            body: BodyParams::default(),
            pulse: PulseParams::default(),
            emotion: EmotionParams::default(),
            creature: CreatureParams::default(),
            compatibility: CompatibilityParams::default(),
            integration: IntegrationParams::default(),
            rejection: RejectionParams::default(),
        }
    }
}

/// Body size and growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    /// Voxels grown at construction (default: 50 000)
    pub voxel_count: usize,
    /// Store cell edge length
    pub resolution: f32,
    pub collision_policy: CollisionPolicy,
    /// Share of voxels in the spherical core, the rest forms dendrites
    pub core_fraction: f32,
    pub dendrite_branches: usize,
    /// Radius multiplier over the equivalent-volume sphere
    pub radius_scale: f32,
    pub center: [f32; 3],
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            voxel_count: 50_000,
            resolution: 1.0,
            collision_policy: CollisionPolicy::Overwrite,
            core_fraction: 0.7,
            dendrite_branches: 12,
            radius_scale: 2.0,
            center: [0.0; 3],
        }
    }
}

/// Breathing animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Hz
    pub frequency: f32,
    pub amplitude: f32,
    /// Voxels closer than this to the center do not breathe
    pub min_distance: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            amplitude: 0.03,
            min_distance: 0.1,
        }
    }
}

/// Per-tick emotional dynamics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionParams {
    /// Initial global emotion (joy, fear, anger, peace)
    pub initial: [f32; 4],
    /// Trauma healed per second
    pub trauma_heal_rate: f32,
    /// Per-tick blend of voxel emotion toward the global emotion
    pub coevolution_rate: f32,
    /// Peace gained per second by the global emotion
    pub peace_drift_rate: f32,
    /// Gaussian sigma for body semantic jitter
    pub semantic_jitter: f32,
}

impl Default for EmotionParams {
    fn default() -> Self {
        Self {
            initial: [0.4, 0.1, 0.1, 0.4],
            trauma_heal_rate: 0.02,
            coevolution_rate: 0.01,
            peace_drift_rate: 0.01,
            semantic_jitter: 0.05,
        }
    }
}

/// File creature sizing and travel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureParams {
    pub min_voxels: usize,
    pub max_voxels: usize,
    /// Voxels per bit of file size (`log2(size + 1) * scale`)
    pub voxels_per_bit: f32,
    /// Radius multiplier over the equivalent-volume sphere
    pub radius_scale: f32,
    /// Units per second
    pub speed: f32,
    /// Remaining distance at which a creature counts as arrived
    pub arrival_distance: f32,
    /// Spawn distance in organism radii
    pub spawn_distance: f32,
    /// Gaussian sigma for per-voxel emotion jitter
    pub emotion_jitter: f32,
}

impl Default for CreatureParams {
    fn default() -> Self {
        Self {
            min_voxels: 500,
            max_voxels: 2000,
            voxels_per_bit: 100.0,
            radius_scale: 1.5,
            speed: 50.0,
            arrival_distance: 1.0,
            spawn_distance: 3.0,
            emotion_jitter: 0.05,
        }
    }
}

/// Compatibility thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityParams {
    pub semantic_weight: f32,
    pub emotion_weight: f32,
    /// Semantic similarity above which a creature may integrate
    pub integrate_threshold: f32,
    /// Semantic similarity below which a creature is always rejected
    pub reject_threshold: f32,
    /// Emotion distance above which the moods count as mismatched
    pub emotion_mismatch_distance: f32,
    pub severity_base: f32,
    pub severity_floor: f32,
    pub borderline: BorderlinePolicy,
}

impl Default for CompatibilityParams {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            emotion_weight: 0.3,
            integrate_threshold: 0.3,
            reject_threshold: 0.0,
            emotion_mismatch_distance: 0.5,
            severity_base: 0.8,
            severity_floor: 0.3,
            borderline: BorderlinePolicy::Integrate,
        }
    }
}

/// Effects of a successful integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationParams {
    pub voxel_energy_boost: f32,
    pub voxel_joy_boost: f32,
    /// Weight of the creature in the new base semantic
    pub semantic_rate: f32,
    pub global_joy_boost: f32,
    /// Warmth zone in organism radii
    pub warmth_radius: f32,
    pub warmth_energy: f32,
}

impl Default for IntegrationParams {
    fn default() -> Self {
        Self {
            voxel_energy_boost: 0.2,
            voxel_joy_boost: 0.3,
            semantic_rate: 0.05,
            global_joy_boost: 0.1,
            warmth_radius: 0.5,
            warmth_energy: 0.1,
        }
    }
}

/// Effects of a rejection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionParams {
    /// Trauma zone in organism radii
    pub zone_radius: f32,
    /// `atrophy = base + per_severity * severity`
    pub atrophy_base: f32,
    pub atrophy_per_severity: f32,
    pub voxel_fear_boost: f32,
    pub voxel_anger_boost: f32,
    pub global_fear_boost: f32,
    pub global_anger_boost: f32,
    pub global_joy_loss: f32,
    pub global_joy_floor: f32,
}

impl Default for RejectionParams {
    fn default() -> Self {
        Self {
            zone_radius: 0.3,
            atrophy_base: 0.05,
            atrophy_per_severity: 0.15,
            voxel_fear_boost: 0.2,
            voxel_anger_boost: 0.3,
            global_fear_boost: 0.15,
            global_anger_boost: 0.2,
            global_joy_loss: 0.1,
            global_joy_floor: 0.05,
        }
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {}", value),
        ))
    }
}

impl OrganismConfig {
    /// Config with a fixed body size, everything else default
    pub fn with_voxels(voxel_count: usize) -> Self {
        Self {
            body: BodyParams {
                voxel_count,
                ..BodyParams::default()
            },
            ..Self::default()
        }
    }

    /// Same config with a fixed seed
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject parameter combinations the kernel cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.body.voxel_count == 0 {
            return Err(ConfigError::invalid("body.voxel_count", "must be non-zero"));
        }
        check_positive("body.resolution", self.body.resolution)?;
        check_unit("body.core_fraction", self.body.core_fraction)?;
        check_positive("body.radius_scale", self.body.radius_scale)?;

        check_positive("pulse.min_distance", self.pulse.min_distance)?;
        if self.pulse.frequency < 0.0 || self.pulse.amplitude < 0.0 {
            return Err(ConfigError::invalid(
                "pulse",
                "frequency and amplitude must be non-negative",
            ));
        }

        let initial = self.emotion.initial;
        if initial.iter().any(|v| !(0.0..=1.0).contains(v)) || initial.iter().sum::<f32>() <= 0.0 {
            return Err(ConfigError::invalid(
                "emotion.initial",
                "channels must be within [0, 1] with a positive sum",
            ));
        }
        check_unit("emotion.coevolution_rate", self.emotion.coevolution_rate)?;

        let creature = &self.creature;
        if creature.min_voxels == 0 || creature.min_voxels > creature.max_voxels {
            return Err(ConfigError::invalid(
                "creature.min_voxels",
                format!(
                    "must be in 1..=max_voxels ({}), got {}",
                    creature.max_voxels, creature.min_voxels
                ),
            ));
        }
        check_positive("creature.radius_scale", creature.radius_scale)?;
        check_positive("creature.arrival_distance", creature.arrival_distance)?;
        if creature.speed < 0.0 {
            return Err(ConfigError::invalid("creature.speed", "must be non-negative"));
        }

        let compat = &self.compatibility;
        if compat.reject_threshold > compat.integrate_threshold {
            return Err(ConfigError::invalid(
                "compatibility.reject_threshold",
                "must not exceed integrate_threshold",
            ));
        }

        check_unit("integration.semantic_rate", self.integration.semantic_rate)?;
        check_positive("rejection.zone_radius", self.rejection.zone_radius)?;
        let max_atrophy = self.rejection.atrophy_base + self.rejection.atrophy_per_severity;
        check_unit("rejection.atrophy_base", self.rejection.atrophy_base)?;
        check_unit("rejection.atrophy_base + atrophy_per_severity", max_atrophy)?;

        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Small, fast body for previews and tests
    pub fn preset_seedling() -> Self {
        Self {
            body: BodyParams {
                voxel_count: 1_000,
                ..BodyParams::default()
            },
            ..Self::default()
        }
    }

    /// Strict immune system: uncertain creatures are rejected
    pub fn preset_wary() -> Self {
        Self {
            compatibility: CompatibilityParams {
                borderline: BorderlinePolicy::Reject,
                ..CompatibilityParams::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrganismConfig::default();
        assert_eq!(config.body.voxel_count, 50_000);
        assert_eq!(config.body.resolution, 1.0);
        assert_eq!(config.pulse.frequency, 0.5);
        assert_eq!(config.emotion.initial, [0.4, 0.1, 0.1, 0.4]);
        assert_eq!(config.creature.speed, 50.0);
        assert_eq!(config.compatibility.borderline, BorderlinePolicy::Integrate);
        assert_eq!(config.body.collision_policy, CollisionPolicy::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_matches_empty_ron() {
        let parsed = OrganismConfig::from_ron_str("()").expect("Failed to parse");
        assert_eq!(OrganismConfig::default(), parsed);
        assert_eq!(OrganismConfig::default().parallel_threshold, 20_000);
        assert_eq!(OrganismConfig::with_voxels(500).parallel_threshold, 20_000);
    }

    #[test]
    fn test_presets_validate() {
        assert!(OrganismConfig::preset_seedling().validate().is_ok());
        assert!(OrganismConfig::preset_wary().validate().is_ok());
        assert_eq!(
            OrganismConfig::preset_wary().compatibility.borderline,
            BorderlinePolicy::Reject
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = OrganismConfig::with_voxels(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "body.voxel_count", .. })
        ));

        config.body.voxel_count = 100;
        config.body.resolution = 0.0;
        assert!(config.validate().is_err());

        config.body.resolution = 1.0;
        config.creature.min_voxels = 3000;
        assert!(config.validate().is_err());

        config.creature.min_voxels = 500;
        config.rejection.atrophy_per_severity = 0.99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = OrganismConfig::preset_wary().seeded(99);
        let text = config.to_ron_string().expect("Failed to serialize");
        let parsed = OrganismConfig::from_ron_str(&text).expect("Failed to deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = OrganismConfig::from_ron_str("(seed: Some(7), body: (voxel_count: 1200, collision_policy: KeepExisting))")
            .expect("Failed to parse");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.body.voxel_count, 1200);
        assert_eq!(config.body.collision_policy, CollisionPolicy::KeepExisting);
        assert_eq!(config.pulse, PulseParams::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = OrganismConfig::from_ron_str("(seed: nope)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

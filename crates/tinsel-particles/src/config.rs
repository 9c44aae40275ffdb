//! Tree configuration, validation, and change classification
//!
//! `TreeConfig` is an immutable value handed to the system whenever a setting
//! changes. Fields split into two groups with different costs:
//! - structural (count, kind ratios, seed): the whole particle set is regenerated
//! - cosmetic (colors, sizes, theme, intensity): appearance is rewritten in place
//!   and every position stays exactly where it was

use serde::{Deserialize, Serialize};
use std::path::Path;
use tinsel_core::{Color, Result, TinselError};

use crate::degradation::Degradation;
use crate::theme::LightTheme;

/// Hard upper bound on generated particles
pub const MAX_PARTICLES: usize = 15_000;
pub const LIGHT_QUANTITY_RANGE: (f32, f32) = (0.0, 0.30);
pub const ORNAMENT_QUANTITY_RANGE: (f32, f32) = (0.0, 0.15);
pub const LIGHT_SIZE_RANGE: (f32, f32) = (0.5, 4.0);
pub const ORNAMENT_SIZE_RANGE: (f32, f32) = (0.5, 2.5);
pub const LIGHT_INTENSITY_RANGE: (f32, f32) = (0.1, 10.0);

/// Default layout seed
pub const DEFAULT_SEED: u32 = 0x7EE5_2024;

/// User-facing tree settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Total particle count. Signed so out-of-range input can be clamped
    /// instead of rejected.
    pub particle_count: i64,
    pub leaf_color: Color,
    pub light_theme: LightTheme,
    pub custom_light_color: Color,
    pub light_intensity: f32,
    pub light_size: f32,
    /// Fraction of particles that are lights
    pub light_quantity: f32,
    pub ornament_size: f32,
    /// Fraction of particles that are ornaments
    pub ornament_quantity: f32,
    pub ornament_color: Color,
    pub ornament_color_2: Color,
    pub ornament_two_tone: bool,
    /// Layout seed
    pub seed: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            particle_count: 5_500,
            leaf_color: Color::from_hex(0x1F4F28),
            light_theme: LightTheme::Classic,
            custom_light_color: Color::from_hex(0xFFDD00),
            light_intensity: 2.0,
            light_size: 1.4,
            light_quantity: 0.08,
            ornament_size: 1.2,
            ornament_quantity: 0.05,
            ornament_color: Color::from_hex(0xFFD700),
            ornament_color_2: Color::from_hex(0xC0C0C0),
            ornament_two_tone: false,
            seed: DEFAULT_SEED,
        }
    }
}

/// How a configuration update affects the particle set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Unchanged,
    /// Colors/sizes/theme only: recolor in place, positions untouched
    Cosmetic,
    /// Count, ratio, or seed: regenerate every particle
    Structural,
}

impl TreeConfig {
    /// Parse from a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Particle count after clamping to `0..=MAX_PARTICLES`
    pub fn effective_count(&self) -> usize {
        self.particle_count.clamp(0, MAX_PARTICLES as i64) as usize
    }

    /// Clamp every field to its valid range.
    ///
    /// Non-finite values fall back to the default. The per-kind ratio ranges
    /// keep the decoration share at or below 0.45, so the ratios can never sum
    /// past 1. Each adjustment is returned (and logged) as a
    /// [`Degradation::InvalidConfiguration`].
    pub fn sanitize(&self) -> (TreeConfig, Vec<Degradation>) {
        let defaults = Self::default();
        let mut issues = Vec::new();
        let mut out = self.clone();

        let count = self.effective_count();
        if count as i64 != self.particle_count {
            issues.push(Degradation::InvalidConfiguration {
                field: "particle_count",
                requested: self.particle_count as f64,
                applied: count as f64,
            });
            out.particle_count = count as i64;
        }

        out.light_quantity = clamp_field(
            "light_quantity",
            self.light_quantity,
            LIGHT_QUANTITY_RANGE,
            defaults.light_quantity,
            &mut issues,
        );
        out.ornament_quantity = clamp_field(
            "ornament_quantity",
            self.ornament_quantity,
            ORNAMENT_QUANTITY_RANGE,
            defaults.ornament_quantity,
            &mut issues,
        );
        out.light_size = clamp_field(
            "light_size",
            self.light_size,
            LIGHT_SIZE_RANGE,
            defaults.light_size,
            &mut issues,
        );
        out.ornament_size = clamp_field(
            "ornament_size",
            self.ornament_size,
            ORNAMENT_SIZE_RANGE,
            defaults.ornament_size,
            &mut issues,
        );
        out.light_intensity = clamp_field(
            "light_intensity",
            self.light_intensity,
            LIGHT_INTENSITY_RANGE,
            defaults.light_intensity,
            &mut issues,
        );

        for issue in &issues {
            issue.log();
        }
        (out, issues)
    }

    /// Classify the update from `old` to `new`.
    ///
    /// Every field is listed explicitly, so adding a field to `TreeConfig`
    /// fails to compile until it is assigned to one of the two groups.
    pub fn classify_change(old: &TreeConfig, new: &TreeConfig) -> ConfigChange {
        let TreeConfig {
            particle_count,
            leaf_color,
            light_theme,
            custom_light_color,
            light_intensity,
            light_size,
            light_quantity,
            ornament_size,
            ornament_quantity,
            ornament_color,
            ornament_color_2,
            ornament_two_tone,
            seed,
        } = new;

        let structural = *particle_count != old.particle_count
            || *light_quantity != old.light_quantity
            || *ornament_quantity != old.ornament_quantity
            || *seed != old.seed;
        if structural {
            return ConfigChange::Structural;
        }

        let cosmetic = *leaf_color != old.leaf_color
            || *light_theme != old.light_theme
            || *custom_light_color != old.custom_light_color
            || *light_intensity != old.light_intensity
            || *light_size != old.light_size
            || *ornament_size != old.ornament_size
            || *ornament_color != old.ornament_color
            || *ornament_color_2 != old.ornament_color_2
            || *ornament_two_tone != old.ornament_two_tone;
        if cosmetic {
            ConfigChange::Cosmetic
        } else {
            ConfigChange::Unchanged
        }
    }
}

fn clamp_field(
    field: &'static str,
    value: f32,
    (min, max): (f32, f32),
    fallback: f32,
    issues: &mut Vec<Degradation>,
) -> f32 {
    let applied = if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    };
    // NaN != NaN, so non-finite input is always reported
    if applied != value {
        issues.push(Degradation::InvalidConfiguration {
            field,
            requested: value as f64,
            applied: applied as f64,
        });
    }
    applied
}

/// Engine tuning that is not exposed as a user setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTuning {
    /// Exponential approach rate toward the active target, per second
    pub smoothing_rate: f32,
    /// Base twinkle angular frequency for lights, radians per second
    pub twinkle_speed: f32,
    /// Wall-time budget for one regeneration, in milliseconds
    pub regen_budget_ms: f64,
    /// Lowest count an overrun may cap generation to
    pub min_effective_cap: usize,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            smoothing_rate: 2.5,
            twinkle_speed: 3.0,
            regen_budget_ms: 12.0,
            min_effective_cap: 2_500,
        }
    }
}

impl EngineTuning {
    /// Reject tuning the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing_rate.is_finite() && self.smoothing_rate > 0.0) {
            return Err(TinselError::ConfigError(format!(
                "engine.smoothing_rate must be positive, got {}",
                self.smoothing_rate
            )));
        }
        if !self.twinkle_speed.is_finite() || self.twinkle_speed < 0.0 {
            return Err(TinselError::ConfigError(format!(
                "engine.twinkle_speed must be zero or positive, got {}",
                self.twinkle_speed
            )));
        }
        if self.regen_budget_ms.is_nan() || self.regen_budget_ms <= 0.0 {
            return Err(TinselError::ConfigError(format!(
                "engine.regen_budget_ms must be positive, got {}",
                self.regen_budget_ms
            )));
        }
        Ok(())
    }
}

/// On-disk description of a tree: settings, tuning, and photo references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Opaque image references (paths, URLs); an empty string is a photo
    /// slot with no image
    pub photos: Vec<String>,
    pub tree: TreeConfig,
    pub engine: EngineTuning,
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scene: SceneConfig = toml::from_str(s)?;
        scene.engine.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_in_range() {
        let (sanitized, issues) = TreeConfig::default().sanitize();
        assert!(issues.is_empty());
        assert_eq!(sanitized, TreeConfig::default());
    }

    #[test]
    fn negative_count_and_wild_ratios_clamp() {
        let config = TreeConfig {
            particle_count: -40,
            light_quantity: 0.9,
            ornament_quantity: 0.8,
            ..Default::default()
        };
        let (sanitized, issues) = config.sanitize();
        assert_eq!(sanitized.particle_count, 0);
        assert!((sanitized.light_quantity - 0.30).abs() < 1e-6);
        assert!((sanitized.ornament_quantity - 0.15).abs() < 1e-6);
        assert!(sanitized.light_quantity + sanitized.ornament_quantity <= 1.0);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn count_above_max_clamps() {
        let config = TreeConfig {
            particle_count: 1_000_000,
            ..Default::default()
        };
        assert_eq!(config.effective_count(), MAX_PARTICLES);
        let (sanitized, _) = config.sanitize();
        assert_eq!(sanitized.particle_count, MAX_PARTICLES as i64);
    }

    #[test]
    fn nan_falls_back_to_default() {
        let config = TreeConfig {
            light_size: f32::NAN,
            ..Default::default()
        };
        let (sanitized, issues) = config.sanitize();
        assert!((sanitized.light_size - 1.4).abs() < 1e-6);
        assert!(matches!(
            issues.as_slice(),
            [Degradation::InvalidConfiguration { field: "light_size", .. }]
        ));
    }

    #[test]
    fn classify_structural_fields() {
        let base = TreeConfig::default();
        let count = TreeConfig {
            particle_count: 6000,
            ..base.clone()
        };
        let ratio = TreeConfig {
            light_quantity: 0.1,
            ..base.clone()
        };
        let seed = TreeConfig {
            seed: 1,
            ..base.clone()
        };
        assert_eq!(TreeConfig::classify_change(&base, &count), ConfigChange::Structural);
        assert_eq!(TreeConfig::classify_change(&base, &ratio), ConfigChange::Structural);
        assert_eq!(TreeConfig::classify_change(&base, &seed), ConfigChange::Structural);
    }

    #[test]
    fn classify_cosmetic_fields() {
        let base = TreeConfig::default();
        let cosmetic = [
            TreeConfig {
                leaf_color: Color::RED,
                ..base.clone()
            },
            TreeConfig {
                light_theme: LightTheme::Warm,
                ..base.clone()
            },
            TreeConfig {
                light_size: 2.0,
                ..base.clone()
            },
            TreeConfig {
                ornament_two_tone: true,
                ..base.clone()
            },
            TreeConfig {
                light_intensity: 5.0,
                ..base.clone()
            },
        ];
        for c in &cosmetic {
            assert_eq!(TreeConfig::classify_change(&base, c), ConfigChange::Cosmetic);
        }
        assert_eq!(
            TreeConfig::classify_change(&base, &base.clone()),
            ConfigChange::Unchanged
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = TreeConfig::from_toml_str(
            r##"
particle_count = 5000
light_theme = "custom"
custom_light_color = "#ff0000"
"##,
        )
        .unwrap();
        assert_eq!(config.particle_count, 5000);
        assert_eq!(config.light_theme, LightTheme::Custom);
        assert_eq!(config.custom_light_color, Color::RED);
        assert!((config.light_quantity - 0.08).abs() < 1e-6);
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let err = TreeConfig::from_toml_str("leaf_color = \"green\"").unwrap_err();
        assert!(matches!(err, tinsel_core::TinselError::TomlParseError(_)));
    }

    #[test]
    fn scene_config_round_trips_through_toml() {
        let scene = SceneConfig {
            photos: vec!["family.jpg".into(), String::new()],
            ..Default::default()
        };
        let text = scene.to_toml_string().unwrap();
        let back = SceneConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, scene);
    }

    #[test]
    fn scene_config_reads_sections() {
        let scene = SceneConfig::from_toml_str(
            r#"
photos = ["a.png"]

[tree]
particle_count = 2500
ornament_two_tone = true

[engine]
smoothing_rate = 4.0
"#,
        )
        .unwrap();
        assert_eq!(scene.photos.len(), 1);
        assert_eq!(scene.tree.particle_count, 2500);
        assert!(scene.tree.ornament_two_tone);
        assert!((scene.engine.smoothing_rate - 4.0).abs() < 1e-6);
        assert_eq!(scene.engine.min_effective_cap, 2_500);
    }

    #[test]
    fn bad_engine_tuning_is_rejected() {
        let err = SceneConfig::from_toml_str("[engine]\nsmoothing_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, tinsel_core::TinselError::ConfigError(_)));
        assert!(EngineTuning::default().validate().is_ok());
    }
}

//! Light themes and per-particle color resolution

use serde::{Deserialize, Serialize};
use tinsel_core::{Color, TinselError};

use crate::config::TreeConfig;
use crate::formation::STAR_LIGHT_EVERY;
use crate::particle::ParticleKind;

/// Named palette selection for string lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightTheme {
    /// Cyan, pink, orange, white
    #[default]
    Classic,
    /// Red, gold, orange
    Warm,
    /// Blue, cyan, purple
    Cool,
    /// Full spectrum
    Rainbow,
    /// Single user-chosen color
    Custom,
}

const CLASSIC: &[u32] = &[0x00E5FF, 0xFF4FA3, 0xFF9A1F, 0xFFFFFF];
const WARM: &[u32] = &[0xFF2A2A, 0xFFD700, 0xFF8C00];
const COOL: &[u32] = &[0x1E6BFF, 0x00E5FF, 0x9B4DFF];
const RAINBOW: &[u32] = &[
    0xFF0000, 0xFF7F00, 0xFFFF00, 0x00FF00, 0x0000FF, 0x4B0082, 0x9400D3,
];

impl LightTheme {
    pub const ALL: [LightTheme; 5] = [
        LightTheme::Classic,
        LightTheme::Warm,
        LightTheme::Cool,
        LightTheme::Rainbow,
        LightTheme::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LightTheme::Classic => "classic",
            LightTheme::Warm => "warm",
            LightTheme::Cool => "cool",
            LightTheme::Rainbow => "rainbow",
            LightTheme::Custom => "custom",
        }
    }

    /// Parse a theme name (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, TinselError> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| TinselError::InvalidEnumValue {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(|t| t.name().to_string()).collect(),
            })
    }

    /// Fixed palette as 0xRRGGBB values. Empty for `Custom`.
    pub fn palette(&self) -> &'static [u32] {
        match self {
            LightTheme::Classic => CLASSIC,
            LightTheme::Warm => WARM,
            LightTheme::Cool => COOL,
            LightTheme::Rainbow => RAINBOW,
            LightTheme::Custom => &[],
        }
    }
}

/// Color of the `ordinal`-th light under `theme`.
///
/// Palette entries are cycled by ordinal, so every entry covers either
/// `n / len` or `n / len + 1` lights and none dominates.
pub fn resolve_light_color(ordinal: u32, theme: LightTheme, custom: Color) -> Color {
    let palette = theme.palette();
    if palette.is_empty() {
        return custom;
    }
    Color::from_hex(palette[ordinal as usize % palette.len()])
}

/// Color of the `ordinal`-th ornament: alternates by parity in two-tone mode
pub fn resolve_ornament_color(ordinal: u32, primary: Color, secondary: Color, two_tone: bool) -> Color {
    if two_tone && ordinal % 2 == 1 {
        secondary
    } else {
        primary
    }
}

/// Base color for a particle of `kind` at `ordinal` within its family.
/// Pure function of its inputs; calling it again yields the same color.
pub fn resolve_color(kind: ParticleKind, ordinal: u32, config: &TreeConfig) -> Color {
    match kind {
        ParticleKind::Leaf | ParticleKind::LeafCube => config.leaf_color,
        ParticleKind::Ornament => resolve_ornament_color(
            ordinal,
            config.ornament_color,
            config.ornament_color_2,
            config.ornament_two_tone,
        ),
        ParticleKind::Light | ParticleKind::StarLight => resolve_light_color(
            light_cycle_index(kind, ordinal),
            config.light_theme,
            config.custom_light_color,
        ),
    }
}

/// Position of a light within its own kind. Every `STAR_LIGHT_EVERY`-th
/// garland ordinal is a star, so cycling the palette by garland ordinal
/// would pin stars to whichever entries share that stride.
fn light_cycle_index(kind: ParticleKind, ordinal: u32) -> u32 {
    let stars_up_to = ordinal / STAR_LIGHT_EVERY + 1;
    match kind {
        ParticleKind::StarLight => ordinal / STAR_LIGHT_EVERY,
        _ => ordinal.saturating_sub(stars_up_to),
    }
}

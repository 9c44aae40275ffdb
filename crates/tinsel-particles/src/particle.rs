//! Particle types: generated records, kind bookkeeping, and GPU instance data

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tinsel_core::{Color, ParticleId, Result, Vec3};

use crate::formation::Silhouette;

/// What a particle depicts. Fixed at creation; decides which visual and
/// animation rules apply (only lights twinkle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Leaf,
    /// Box-shaped leaf
    LeafCube,
    Ornament,
    Light,
    /// Star-shaped light
    StarLight,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 5] = [
        ParticleKind::Leaf,
        ParticleKind::LeafCube,
        ParticleKind::Ornament,
        ParticleKind::Light,
        ParticleKind::StarLight,
    ];

    pub fn is_leaf(&self) -> bool {
        matches!(self, ParticleKind::Leaf | ParticleKind::LeafCube)
    }

    pub fn is_light(&self) -> bool {
        matches!(self, ParticleKind::Light | ParticleKind::StarLight)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleKind::Leaf => "leaf",
            ParticleKind::LeafCube => "leaf_cube",
            ParticleKind::Ornament => "ornament",
            ParticleKind::Light => "light",
            ParticleKind::StarLight => "star_light",
        }
    }

    /// Numeric tag packed into GPU instances
    pub fn shader_tag(&self) -> u32 {
        match self {
            ParticleKind::Leaf => 0,
            ParticleKind::LeafCube => 1,
            ParticleKind::Ornament => 2,
            ParticleKind::Light => 3,
            ParticleKind::StarLight => 4,
        }
    }
}

/// One generated particle.
///
/// Geometry (`kind`, both positions, `rotation_seed`, `size_jitter`) is fixed
/// when the set is generated. Appearance (`scale`, `base_color`,
/// `emissive_intensity`) is derived from the configuration and may be
/// rewritten in place without touching geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleRecord {
    pub id: ParticleId,
    pub kind: ParticleKind,
    /// Index of this particle within its family (leaves, ornaments or
    /// lights); drives palette cycling and two-tone parity.
    pub ordinal: u32,
    pub tree_position: Vec3,
    pub scatter_position: Vec3,
    pub scale: Vec3,
    pub rotation_seed: Vec3,
    pub base_color: Color,
    pub emissive_intensity: Option<f32>,
    /// Multiplicative size variation, fixed at generation
    #[serde(skip)]
    pub size_jitter: f32,
}

impl ParticleRecord {
    /// The apex star is the first light of the set
    pub fn is_topper(&self) -> bool {
        self.kind == ParticleKind::StarLight && self.ordinal == 0
    }

    /// Active target for the given macro-state
    pub fn target(&self, exploded: bool) -> Vec3 {
        if exploded {
            self.scatter_position
        } else {
            self.tree_position
        }
    }
}

/// Per-kind population of a particle set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub leaves: usize,
    pub leaf_cubes: usize,
    pub ornaments: usize,
    pub lights: usize,
    pub star_lights: usize,
}

impl KindCounts {
    pub fn from_records(records: &[ParticleRecord]) -> Self {
        let mut counts = Self::default();
        for r in records {
            counts.add(r.kind);
        }
        counts
    }

    pub fn add(&mut self, kind: ParticleKind) {
        match kind {
            ParticleKind::Leaf => self.leaves += 1,
            ParticleKind::LeafCube => self.leaf_cubes += 1,
            ParticleKind::Ornament => self.ornaments += 1,
            ParticleKind::Light => self.lights += 1,
            ParticleKind::StarLight => self.star_lights += 1,
        }
    }

    pub fn get(&self, kind: ParticleKind) -> usize {
        match kind {
            ParticleKind::Leaf => self.leaves,
            ParticleKind::LeafCube => self.leaf_cubes,
            ParticleKind::Ornament => self.ornaments,
            ParticleKind::Light => self.lights,
            ParticleKind::StarLight => self.star_lights,
        }
    }

    /// Leaf-family total (Leaf + LeafCube)
    pub fn leaf_family(&self) -> usize {
        self.leaves + self.leaf_cubes
    }

    /// Light-family total (Light + StarLight)
    pub fn light_family(&self) -> usize {
        self.lights + self.star_lights
    }

    pub fn total(&self) -> usize {
        self.leaf_family() + self.ornaments + self.light_family()
    }
}

/// A complete generated formation. Swapped into the system as a whole;
/// never mutated structurally after generation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParticleSet {
    /// Regeneration counter this set was produced for
    pub generation: u64,
    pub silhouette: Silhouette,
    pub counts: KindCounts,
    pub records: Vec<ParticleRecord>,
}

impl ParticleSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleRecord> {
        self.records.get(id.index())
    }

    /// Pretty JSON dump of the whole set, for inspection and tooling
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// GPU instance data for one rendered particle or card.
/// 64 bytes, 4 rows of vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// xyz = world position, w = emissive intensity
    pub position_emissive: [f32; 4],
    /// xyz = scale, w = kind tag (5 = photo card)
    pub scale_kind: [f32; 4],
    /// xyz = Euler rotation in radians, w = highlight flag
    pub rotation_flags: [f32; 4],
    /// rgba
    pub color: [f32; 4],
}

/// Kind tag used for photo-card instances
pub const CARD_SHADER_TAG: u32 = 5;

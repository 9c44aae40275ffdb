//! Procedural tree and scatter formations
//!
//! Generation is split in two passes:
//! - geometry: kinds, tree/scatter positions, rotation seeds, size jitter.
//!   Depends only on count, kind ratios and seed.
//! - appearance: color, scale, emissive. Depends only on cosmetic settings
//!   and can be re-run on an existing set without moving anything.
//!
//! Every particle draws from its own RNG stream keyed by `(seed, id)`, so a
//! layout is reproducible from the configuration alone.

use serde::Serialize;
use std::f32::consts::TAU;
use tinsel_core::{Color, ParticleId, Vec3};

use crate::config::{TreeConfig, MAX_PARTICLES};
use crate::curves::fract;
use crate::particle::{KindCounts, ParticleKind, ParticleRecord, ParticleSet};
use crate::rand::ParticleRng;
use crate::theme::resolve_color;

pub const TREE_BASE_Y: f32 = -5.0;
pub const TREE_HEIGHT: f32 = 12.0;
pub const TREE_BASE_RADIUS: f32 = 4.8;

/// Number of stacked branch tiers in the canopy
const CANOPY_TIERS: f32 = 7.0;
/// Fraction by which each tier narrows from its bottom to its top
const TIER_INSET: f32 = 0.28;
/// Radial exponent for leaves; above 0.5 concentrates foliage toward the core
const LEAF_CORE_BIAS: f32 = 0.65;
/// Every n-th leaf is drawn as a cube, the last of each run of n
const LEAF_CUBE_EVERY: u32 = 4;
/// Every n-th light along the garland is a star (the first one tops the tree)
pub(crate) const STAR_LIGHT_EVERY: u32 = 4;
const GARLAND_TURNS: f32 = 9.0;
/// Scatter shell bounds as multiples of the silhouette's bounding radius
const SCATTER_INNER_FACTOR: f32 = 1.35;
const SCATTER_OUTER_FACTOR: f32 = 2.3;
/// π(3 - √5)
pub(crate) const GOLDEN_ANGLE: f32 = 2.399_963_2;
/// √2 - 1; low-discrepancy step for scatter radii, unrelated to the golden
/// ratio so angular neighbours do not share a radius
const RADIUS_SEQUENCE_STEP: f32 = 0.414_213_56;

/// Slack allowed by containment checks for float rounding
const CONTAINMENT_EPSILON: f32 = 1e-3;

/// The tree's outline: a cone standing on `base_y`, apex at `base_y + height`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Silhouette {
    pub base_y: f32,
    pub height: f32,
    pub base_radius: f32,
}

impl Default for Silhouette {
    fn default() -> Self {
        Self {
            base_y: TREE_BASE_Y,
            height: TREE_HEIGHT,
            base_radius: TREE_BASE_RADIUS,
        }
    }
}

impl Silhouette {
    pub fn top_y(&self) -> f32 {
        self.base_y + self.height
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, self.base_y + self.height * 0.5, 0.0)
    }

    pub fn apex(&self) -> Vec3 {
        Vec3::new(0.0, self.top_y(), 0.0)
    }

    /// Height fraction of `y` in [0, 1]
    pub fn height_fraction(&self, y: f32) -> f32 {
        ((y - self.base_y) / self.height).clamp(0.0, 1.0)
    }

    /// Outer cone radius at height fraction `t`
    pub fn cone_radius(&self, t: f32) -> f32 {
        self.base_radius * (1.0 - t.clamp(0.0, 1.0))
    }

    /// Tiered canopy radius at height fraction `t`: each tier starts at full
    /// cone width and pulls in toward its top. Never exceeds the cone.
    pub fn canopy_radius(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        self.cone_radius(t) * (1.0 - TIER_INSET * fract(t * CANOPY_TIERS))
    }

    /// Whether `p` lies inside the cone (with a small rounding allowance)
    pub fn contains(&self, p: Vec3) -> bool {
        if p.y < self.base_y - CONTAINMENT_EPSILON || p.y > self.top_y() + CONTAINMENT_EPSILON {
            return false;
        }
        let t = self.height_fraction(p.y);
        p.horizontal_length() <= self.cone_radius(t) + CONTAINMENT_EPSILON
    }

    /// Radius of the smallest sphere around `center()` enclosing the cone
    pub fn bounding_radius(&self) -> f32 {
        let half = self.height * 0.5;
        let rim = (self.base_radius * self.base_radius + half * half).sqrt();
        rim.max(half)
    }

    /// Inner and outer radius of the scatter shell around `center()`
    pub fn scatter_shell(&self) -> (f32, f32) {
        let r = self.bounding_radius();
        (r * SCATTER_INNER_FACTOR, r * SCATTER_OUTER_FACTOR)
    }
}

/// Family sizes derived from count and ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSplit {
    pub leaves: usize,
    pub ornaments: usize,
    pub lights: usize,
}

/// Split `count` into leaves, ornaments and lights.
///
/// Lights and ornaments are rounded to the nearest whole particle; leaves
/// take the remainder, so the parts always sum to `count`.
pub fn split_counts(count: usize, light_quantity: f32, ornament_quantity: f32) -> KindSplit {
    let share = |q: f32| ((count as f32) * q.max(0.0)).round() as usize;
    let lights = share(light_quantity).min(count);
    let ornaments = share(ornament_quantity).min(count - lights);
    KindSplit {
        leaves: count - lights - ornaments,
        ornaments,
        lights,
    }
}

/// Generate the full particle set for `config`
pub fn generate(config: &TreeConfig) -> ParticleSet {
    generate_with_limit(config, MAX_PARTICLES)
}

/// Generate with the particle count additionally capped at `limit`.
/// Out-of-range settings are clamped first; this never fails.
pub fn generate_with_limit(config: &TreeConfig, limit: usize) -> ParticleSet {
    let (config, _) = config.sanitize();
    let count = config.effective_count().min(limit);
    let silhouette = Silhouette::default();
    let split = split_counts(count, config.light_quantity, config.ornament_quantity);
    let stride = scatter_stride(count);

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let mut rng = ParticleRng::for_stream(config.seed, index as u32);

        let (kind, ordinal, tree_position) = if index < split.leaves {
            let ordinal = index as u32;
            let kind = if ordinal % LEAF_CUBE_EVERY == LEAF_CUBE_EVERY - 1 {
                ParticleKind::LeafCube
            } else {
                ParticleKind::Leaf
            };
            (kind, ordinal, leaf_position(&silhouette, &mut rng))
        } else if index < split.leaves + split.ornaments {
            let ordinal = (index - split.leaves) as u32;
            (
                ParticleKind::Ornament,
                ordinal,
                ornament_position(&silhouette, ordinal, &mut rng),
            )
        } else {
            let ordinal = (index - split.leaves - split.ornaments) as u32;
            let kind = if ordinal % STAR_LIGHT_EVERY == 0 {
                ParticleKind::StarLight
            } else {
                ParticleKind::Light
            };
            (
                kind,
                ordinal,
                light_position(&silhouette, ordinal, split.lights as u32, &mut rng),
            )
        };

        let slot = (index * stride) % count;
        let scatter_position = scatter_position(&silhouette, slot, count, &mut rng);
        let rotation_seed = Vec3::new(
            rng.range(0.0, TAU),
            rng.range(0.0, TAU),
            rng.range(0.0, TAU),
        );
        let size_jitter = rng.range(0.8, 1.2);

        records.push(ParticleRecord {
            id: ParticleId::from_index(index),
            kind,
            ordinal,
            tree_position,
            scatter_position,
            scale: Vec3::ONE,
            rotation_seed,
            base_color: Color::WHITE,
            emissive_intensity: None,
            size_jitter,
        });
    }

    let mut set = ParticleSet {
        generation: 0,
        silhouette,
        counts: KindCounts::from_records(&records),
        records,
    };
    apply_appearance(&mut set, &config);
    set
}

/// Rewrite color, scale and emissive from cosmetic settings.
/// Positions, kinds and seeds are left untouched; repeated calls with the
/// same config produce the same result.
pub fn apply_appearance(set: &mut ParticleSet, config: &TreeConfig) {
    for record in &mut set.records {
        record.base_color = resolve_color(record.kind, record.ordinal, config);
        record.scale = base_scale(record, config);
        record.emissive_intensity = emissive_intensity(record, config);
    }
}

fn base_scale(record: &ParticleRecord, config: &TreeConfig) -> Vec3 {
    let j = record.size_jitter;
    match record.kind {
        // flat needle cluster
        ParticleKind::Leaf => Vec3::new(0.16 * j, 0.06 * j, 0.12 * j),
        ParticleKind::LeafCube => Vec3::splat(0.12 * j),
        ParticleKind::Ornament => Vec3::splat(0.2 * config.ornament_size * j),
        ParticleKind::Light => Vec3::splat(0.06 * config.light_size * j),
        ParticleKind::StarLight if record.is_topper() => Vec3::splat(0.45 * config.light_size),
        ParticleKind::StarLight => Vec3::splat(0.1 * config.light_size * j),
    }
}

fn emissive_intensity(record: &ParticleRecord, config: &TreeConfig) -> Option<f32> {
    match record.kind {
        ParticleKind::Light => Some(config.light_intensity),
        ParticleKind::StarLight if record.is_topper() => Some(config.light_intensity * 2.5),
        ParticleKind::StarLight => Some(config.light_intensity * 1.5),
        _ => None,
    }
}

/// Canopy volume, weighted toward the wide lower tiers and the trunk axis
fn leaf_position(s: &Silhouette, rng: &mut ParticleRng) -> Vec3 {
    let t = 1.0 - rng.next_f32().sqrt();
    let r = s.canopy_radius(t) * rng.next_f32().powf(LEAF_CORE_BIAS);
    let theta = rng.range(0.0, TAU);
    Vec3::new(r * theta.cos(), s.base_y + t * s.height, r * theta.sin())
}

/// Outer shell of the canopy, spread around the trunk by golden angle
fn ornament_position(s: &Silhouette, ordinal: u32, rng: &mut ParticleRng) -> Vec3 {
    let y = s.base_y + (1.0 - rng.next_f32().sqrt()).clamp(0.03, 0.92) * s.height;
    let r = s.canopy_radius(s.height_fraction(y)) * rng.range(0.86, 1.0);
    let theta = ordinal as f32 * GOLDEN_ANGLE + rng.range(-0.3, 0.3);
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Conical spiral garland from the bottom tier up; light 0 sits on the apex
fn light_position(s: &Silhouette, ordinal: u32, total: u32, rng: &mut ParticleRng) -> Vec3 {
    if ordinal == 0 {
        return s.apex();
    }
    // even spacing along the garland's length rather than its height
    let u = ordinal as f32 / total.max(1) as f32;
    let t_garland = 1.0 - (1.0 - u).sqrt();
    let y = (s.base_y + t_garland * s.height + rng.range(-0.12, 0.12))
        .clamp(s.base_y, s.top_y() - 0.05);
    let t = s.height_fraction(y);
    let theta = t_garland * GARLAND_TURNS * TAU + rng.range(-0.2, 0.2);
    let r = s.canopy_radius(t) * rng.range(0.9, 1.0);
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Point on a Fibonacci sphere of `count` slots, pushed out to a
/// low-discrepancy radius inside the scatter shell. Distinct slots have
/// distinct directions, so no two particles share a scatter target.
fn scatter_position(s: &Silhouette, slot: usize, count: usize, rng: &mut ParticleRng) -> Vec3 {
    let (inner, outer) = s.scatter_shell();
    let n = count.max(1) as f32;
    let y = 1.0 - 2.0 * (slot as f32 + 0.5) / n;
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = slot as f32 * GOLDEN_ANGLE;
    let direction = Vec3::new(ring * theta.cos(), y, ring * theta.sin());
    let layer = fract(slot as f32 * RADIUS_SEQUENCE_STEP + rng.range(0.0, 0.15));
    s.center() + direction * (inner + (outer - inner) * layer)
}

/// Stride coprime with `count`, so `index * stride % count` permutes the
/// sphere slots and kinds are not banded by latitude when exploded.
fn scatter_stride(count: usize) -> usize {
    if count <= 2 {
        return 1;
    }
    let mut stride = ((count as f64) * 0.618_034) as usize | 1;
    while gcd(stride, count) != 1 {
        stride += 2;
    }
    stride
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::LightTheme;
    use std::collections::{HashMap, HashSet};

    fn config(count: i64) -> TreeConfig {
        TreeConfig {
            particle_count: count,
            ..Default::default()
        }
    }

    #[test]
    fn split_scenario_matches_ratios() {
        let split = split_counts(5000, 0.08, 0.05);
        assert_eq!(split.lights, 400);
        assert_eq!(split.ornaments, 250);
        assert_eq!(split.leaves, 4350);
    }

    #[test]
    fn split_always_sums_to_count() {
        for count in [0, 1, 7, 99, 2500, 14999] {
            for (lq, oq) in [(0.0, 0.0), (0.3, 0.15), (0.13, 0.07)] {
                let s = split_counts(count, lq, oq);
                assert_eq!(s.leaves + s.ornaments + s.lights, count);
            }
        }
    }

    #[test]
    fn canopy_never_exceeds_cone() {
        let s = Silhouette::default();
        for i in 0..=1000 {
            let t = i as f32 / 1000.0;
            assert!(s.canopy_radius(t) <= s.cone_radius(t) + 1e-6);
        }
    }

    #[test]
    fn generates_exact_count() {
        for count in [0, 1, 3, 250, 5000] {
            let set = generate(&config(count));
            assert_eq!(set.len(), count as usize);
            assert_eq!(set.counts.total(), count as usize);
        }
    }

    #[test]
    fn ids_are_slot_indices() {
        let set = generate(&config(300));
        for (i, r) in set.iter().enumerate() {
            assert_eq!(r.id.index(), i);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(&config(2000));
        let b = generate(&config(2000));
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn seed_changes_layout() {
        let a = generate(&config(500));
        let b = generate(&TreeConfig {
            seed: 99,
            ..config(500)
        });
        let moved = a
            .iter()
            .zip(b.iter())
            .filter(|(x, y)| x.tree_position != y.tree_position)
            .count();
        assert!(moved > 400);
    }

    #[test]
    fn tree_inside_scatter_outside() {
        let set = generate(&config(4000));
        let s = set.silhouette;
        let bound = s.bounding_radius();
        for r in set.iter() {
            assert!(s.contains(r.tree_position), "{:?} escapes the cone", r.tree_position);
            let d = r.scatter_position.distance(&s.center());
            assert!(d > bound, "scatter {d} within bound {bound}");
        }
    }

    #[test]
    fn scatter_targets_are_separated() {
        let set = generate(&config(1500));
        let points: Vec<Vec3> = set.iter().map(|r| r.scatter_position).collect();
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance(&points[j]));
            }
        }
        assert!(min > 0.05, "closest scatter pair only {min} apart");
    }

    #[test]
    fn full_count_stays_contained_and_separated() {
        let set = generate(&config(MAX_PARTICLES as i64));
        assert_eq!(set.len(), MAX_PARTICLES);
        let s = set.silhouette;
        let center = s.center();
        let bound = s.bounding_radius();
        for r in set.iter() {
            assert!(s.contains(r.tree_position), "{:?} escapes the cone", r.tree_position);
            assert!(r.scatter_position.distance(&center) > bound);
        }

        // bucket into cells one gap wide so only neighbouring cells can hold
        // a pair closer than the gap
        const GAP: f32 = 0.05;
        let cell = |p: &Vec3| {
            (
                (p.x / GAP).floor() as i32,
                (p.y / GAP).floor() as i32,
                (p.z / GAP).floor() as i32,
            )
        };
        let mut grid: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();
        for (i, r) in set.iter().enumerate() {
            grid.entry(cell(&r.scatter_position)).or_default().push(i);
        }
        let mut min = f32::MAX;
        for (i, r) in set.iter().enumerate() {
            let p = r.scatter_position;
            let (cx, cy, cz) = cell(&p);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &j in bucket.iter().filter(|&&j| j != i) {
                            min = min.min(p.distance(&set.records[j].scatter_position));
                        }
                    }
                }
            }
        }
        assert!(min > GAP, "closest scatter pair only {min} apart");
    }

    #[test]
    fn foliage_is_denser_near_core() {
        let set = generate(&config(6000));
        let s = set.silhouette;
        let leaves: Vec<&ParticleRecord> = set.iter().filter(|r| r.kind.is_leaf()).collect();
        let inner = leaves
            .iter()
            .filter(|r| {
                let t = s.height_fraction(r.tree_position.y);
                let canopy = s.canopy_radius(t);
                canopy > 0.0 && r.tree_position.horizontal_length() < 0.5 * canopy
            })
            .count();
        // uniform area density would put a quarter inside half the radius
        let share = inner as f32 / leaves.len() as f32;
        assert!(share > 0.3, "core share {share}");
    }

    #[test]
    fn more_foliage_low_than_high() {
        let set = generate(&config(6000));
        let s = set.silhouette;
        let low = set
            .iter()
            .filter(|r| s.height_fraction(r.tree_position.y) < 0.5)
            .count();
        assert!(low > set.len() / 2);
    }

    #[test]
    fn decorations_sit_on_outer_shell() {
        let set = generate(&config(5000));
        let s = set.silhouette;
        for r in set.iter().filter(|r| r.kind == ParticleKind::Ornament) {
            let t = s.height_fraction(r.tree_position.y);
            let ratio = r.tree_position.horizontal_length() / s.canopy_radius(t);
            assert!(ratio >= 0.85, "ornament at {ratio} of canopy");
        }
        for r in set.iter().filter(|r| r.kind.is_light() && !r.is_topper()) {
            let t = s.height_fraction(r.tree_position.y);
            let canopy = s.canopy_radius(t);
            if canopy > 0.05 {
                assert!(r.tree_position.horizontal_length() / canopy >= 0.89);
            }
        }
    }

    #[test]
    fn topper_sits_on_apex() {
        let set = generate(&config(1000));
        let toppers: Vec<&ParticleRecord> = set.iter().filter(|r| r.is_topper()).collect();
        assert_eq!(toppers.len(), 1);
        assert_eq!(toppers[0].tree_position, set.silhouette.apex());
        assert!(toppers[0].emissive_intensity.unwrap() > 2.0 * 2.0);
    }

    #[test]
    fn star_lights_every_fourth_light() {
        let set = generate(&config(5000));
        assert_eq!(set.counts.light_family(), 400);
        assert_eq!(set.counts.star_lights, 100);
    }

    #[test]
    fn leaf_cubes_are_a_minority_of_leaves() {
        let set = generate(&config(5000));
        let share = set.counts.leaf_cubes as f32 / set.counts.leaf_family() as f32;
        assert!((0.2..0.3).contains(&share), "cube share {share}");
    }

    #[test]
    fn leaf_cube_count_is_exact_quarter() {
        for count in [1, 4, 97, 1003, 5000, 14_999] {
            let set = generate(&config(count));
            let family = set.counts.leaf_family();
            assert_eq!(set.counts.leaf_cubes, family / 4, "count {count}");
            // the choice follows the ordinal, never the seed
            let reseeded = generate(&TreeConfig {
                seed: 7,
                ..config(count)
            });
            assert_eq!(reseeded.counts.leaf_cubes, set.counts.leaf_cubes);
        }
    }

    #[test]
    fn star_lights_do_not_share_one_color() {
        let set = generate(&TreeConfig::default());
        let star_colors: HashSet<u32> = set
            .iter()
            .filter(|r| r.kind == ParticleKind::StarLight)
            .map(|r| r.base_color.to_hex())
            .collect();
        let plain_colors: HashSet<u32> = set
            .iter()
            .filter(|r| r.kind == ParticleKind::Light)
            .map(|r| r.base_color.to_hex())
            .collect();
        let palette = LightTheme::Classic.palette().len();
        assert_eq!(star_colors.len(), palette);
        assert_eq!(plain_colors.len(), palette);
    }

    #[test]
    fn only_lights_emit() {
        let set = generate(&config(2000));
        for r in set.iter() {
            assert_eq!(r.emissive_intensity.is_some(), r.kind.is_light());
        }
    }

    #[test]
    fn appearance_pass_keeps_geometry() {
        let mut set = generate(&config(3000));
        let before: Vec<(Vec3, Vec3, Vec3)> = set
            .iter()
            .map(|r| (r.tree_position, r.scatter_position, r.rotation_seed))
            .collect();

        let recolor = TreeConfig {
            light_theme: LightTheme::Rainbow,
            leaf_color: Color::RED,
            light_size: 3.0,
            ornament_size: 2.0,
            ornament_two_tone: true,
            ..config(3000)
        };
        apply_appearance(&mut set, &recolor);
        let once = set.records.clone();
        apply_appearance(&mut set, &recolor);
        assert_eq!(set.records, once);

        for (r, (tree, scatter, seed)) in set.iter().zip(before) {
            assert_eq!(r.tree_position, tree);
            assert_eq!(r.scatter_position, scatter);
            assert_eq!(r.rotation_seed, seed);
        }
        assert!(set.iter().filter(|r| r.kind.is_leaf()).all(|r| r.base_color == Color::RED));
    }

    #[test]
    fn limit_caps_count_but_keeps_ratios() {
        let set = generate_with_limit(&config(10_000), 2000);
        assert_eq!(set.len(), 2000);
        assert_eq!(set.counts.light_family(), 160);
        assert_eq!(set.counts.ornaments, 100);
    }

    #[test]
    fn invalid_config_is_clamped_not_rejected() {
        let set = generate(&TreeConfig {
            particle_count: -5,
            ..Default::default()
        });
        assert!(set.is_empty());

        let set = generate(&TreeConfig {
            particle_count: 1000,
            light_quantity: 5.0,
            ornament_quantity: -1.0,
            ..Default::default()
        });
        assert_eq!(set.counts.light_family(), 300);
        assert_eq!(set.counts.ornaments, 0);
    }

    #[test]
    fn scatter_stride_is_coprime() {
        for count in [3, 4, 10, 12, 5000, 5500, 15000] {
            let stride = scatter_stride(count);
            assert_eq!(gcd(stride, count), 1, "count {count}");
        }
    }
}

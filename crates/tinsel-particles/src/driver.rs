//! Animation driver: per-frame interpolation toward the active formation
//!
//! The only state carried between frames is the interpolated position of each
//! particle and card, plus the accumulated spin. Rotation, twinkle and
//! highlight are evaluated from elapsed time and per-particle seeds.

use serde::Serialize;
use tinsel_core::{Color, ParticleId, Vec3};

use crate::config::EngineTuning;
use crate::controls::ControlState;
use crate::curves::{pulse, smoothing_factor, wrap_angle};
use crate::particle::{ParticleInstance, ParticleKind, ParticleRecord, ParticleSet, CARD_SHADER_TAG};
use crate::photo::PhotoCard;
use crate::rand::hash01;

/// Axis weights for idle tumbling; mostly a spin about Y with some wobble
const SPIN_AXIS: Vec3 = Vec3::new(0.35, 1.0, 0.2);
const TWINKLE_PHASE_SALT: u32 = 0x5EED_0001;
const TWINKLE_RATE_SALT: u32 = 0x5EED_0002;
/// Emissive multiplier range over one twinkle cycle
const TWINKLE_RANGE: (f32, f32) = (0.35, 1.0);
/// The topper breathes instead of blinking
const TOPPER_RANGE: (f32, f32) = (0.8, 1.0);
const TOPPER_FREQUENCY: f32 = 1.2;
const HIGHLIGHT_FREQUENCY: f32 = 4.0;
const HIGHLIGHT_SCALE: (f32, f32) = (1.15, 1.35);

/// A particle ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedParticle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    /// World position, tree yaw applied
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
    /// Current emissive intensity after twinkle; `None` for non-emitters
    pub emissive: Option<f32>,
}

/// A photo card ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCard {
    pub index: usize,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Tint; white for a textured card, grey for a placeholder
    pub color: Color,
    pub placeholder: bool,
    pub highlighted: bool,
}

/// Summary of one driver step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    /// Particles whose render update was skipped because of bad position data
    pub skipped: usize,
    /// Largest remaining distance between a particle and its target
    pub max_remaining: f32,
    /// Degradations recorded while preparing this frame
    pub degraded: usize,
}

impl FrameStats {
    /// True once every particle is within `epsilon` of its target
    pub fn settled(&self, epsilon: f32) -> bool {
        self.skipped == 0 && self.max_remaining <= epsilon
    }
}

/// Moves rendered particles toward their active targets each frame
pub struct AnimationDriver {
    smoothing_rate: f32,
    twinkle_speed: f32,
    /// Interpolated positions before tree yaw, indexed by particle id
    positions: Vec<Vec3>,
    card_positions: Vec<Vec3>,
    elapsed: f32,
    /// Integral of rotation speed over time
    spin_phase: f32,
    group_yaw: f32,
    frame: u64,
    rendered: Vec<RenderedParticle>,
    rendered_cards: Vec<RenderedCard>,
    instance_buffer: Vec<ParticleInstance>,
}

impl AnimationDriver {
    pub fn new(tuning: &EngineTuning) -> Self {
        Self {
            smoothing_rate: tuning.smoothing_rate,
            twinkle_speed: tuning.twinkle_speed,
            positions: Vec::new(),
            card_positions: Vec::new(),
            elapsed: 0.0,
            spin_phase: 0.0,
            group_yaw: 0.0,
            frame: 0,
            rendered: Vec::new(),
            rendered_cards: Vec::new(),
            instance_buffer: Vec::new(),
        }
    }

    /// Adopt a new particle set. Ids that already existed keep their current
    /// position so a regeneration continues smoothly; new ids start at their
    /// scatter position and fly in.
    pub fn rebind(&mut self, set: &ParticleSet) {
        let previous = std::mem::take(&mut self.positions);
        self.positions = set
            .iter()
            .map(|r| match previous.get(r.id.index()) {
                Some(p) if p.is_finite() => *p,
                _ => r.scatter_position,
            })
            .collect();
        self.rendered = set
            .iter()
            .zip(&self.positions)
            .map(|(r, &p)| self.render_particle(r, p))
            .collect();
        log::debug!(
            "driver rebound to generation {} ({} particles, {} carried over)",
            set.generation,
            set.len(),
            previous.len().min(set.len())
        );
    }

    /// Adopt a new card layout; cards keep their position by index
    pub fn rebind_cards(&mut self, cards: &[PhotoCard]) {
        let previous = std::mem::take(&mut self.card_positions);
        self.card_positions = cards
            .iter()
            .map(|c| match previous.get(c.index) {
                Some(p) if p.is_finite() => *p,
                _ => c.scatter_position,
            })
            .collect();
        self.rendered_cards = cards
            .iter()
            .zip(&self.card_positions)
            .map(|(c, &p)| self.render_card(c, p, false))
            .collect();
    }

    /// Advance one frame
    pub fn step(
        &mut self,
        dt: f32,
        set: &ParticleSet,
        cards: &[PhotoCard],
        controls: &ControlState,
    ) -> FrameStats {
        if self.positions.len() != set.len() {
            self.rebind(set);
        }
        if self.card_positions.len() != cards.len() {
            self.rebind_cards(cards);
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let spin = controls.rotation_speed * dt;
        self.frame += 1;
        self.elapsed += dt;
        self.spin_phase += spin;
        self.group_yaw = wrap_angle(self.group_yaw + spin);
        let alpha = smoothing_factor(self.smoothing_rate, dt);

        let mut stats = FrameStats {
            frame: self.frame,
            ..Default::default()
        };

        for (i, record) in set.iter().enumerate() {
            let target = record.target(controls.exploded);
            let current = self.positions[i];
            // Bad data holds the previous render for this frame only
            if !target.is_finite() {
                stats.skipped += 1;
                continue;
            }
            if !current.is_finite() {
                self.positions[i] = target;
                stats.skipped += 1;
                continue;
            }
            let next = current.lerp(&target, alpha);
            self.positions[i] = next;
            stats.max_remaining = stats.max_remaining.max(next.distance(&target));
            self.rendered[i] = self.render_particle(record, next);
        }

        let highlighted = controls.highlighted(cards.len());
        for (i, card) in cards.iter().enumerate() {
            let target = card.target(controls.exploded);
            let current = self.card_positions[i];
            if !target.is_finite() || !current.is_finite() {
                self.card_positions[i] = target;
                stats.skipped += 1;
                continue;
            }
            let next = current.lerp(&target, alpha);
            self.card_positions[i] = next;
            stats.max_remaining = stats.max_remaining.max(next.distance(&target));
            self.rendered_cards[i] = self.render_card(card, next, highlighted == Some(i));
        }

        stats
    }

    fn render_particle(&self, record: &ParticleRecord, position: Vec3) -> RenderedParticle {
        RenderedParticle {
            id: record.id,
            kind: record.kind,
            position: position.rotate_y(self.group_yaw),
            rotation: idle_rotation(record.rotation_seed, self.spin_phase),
            scale: record.scale,
            color: record.base_color,
            emissive: record
                .emissive_intensity
                .map(|e| e * self.twinkle(record)),
        }
    }

    fn render_card(&self, card: &PhotoCard, position: Vec3, highlighted: bool) -> RenderedCard {
        let scale = if highlighted {
            card.scale
                * pulse(
                    self.elapsed,
                    HIGHLIGHT_FREQUENCY,
                    0.0,
                    HIGHLIGHT_SCALE.0,
                    HIGHLIGHT_SCALE.1,
                )
        } else {
            card.scale
        };
        RenderedCard {
            index: card.index,
            position: position.rotate_y(self.group_yaw),
            rotation: Vec3::new(0.0, wrap_angle(card.facing + self.group_yaw), 0.0),
            scale,
            color: if card.placeholder {
                Color::PLACEHOLDER_GREY
            } else {
                Color::WHITE
            },
            placeholder: card.placeholder,
            highlighted,
        }
    }

    /// Emissive multiplier for a light at the current time
    fn twinkle(&self, record: &ParticleRecord) -> f32 {
        if record.is_topper() {
            return pulse(self.elapsed, TOPPER_FREQUENCY, 0.0, TOPPER_RANGE.0, TOPPER_RANGE.1);
        }
        let id = record.id.raw();
        let phase = hash01(id, TWINKLE_PHASE_SALT) * std::f32::consts::TAU;
        let rate = self.twinkle_speed * (0.7 + 0.6 * hash01(id, TWINKLE_RATE_SALT));
        pulse(self.elapsed, rate, phase, TWINKLE_RANGE.0, TWINKLE_RANGE.1)
    }

    pub fn rendered(&self) -> &[RenderedParticle] {
        &self.rendered
    }

    pub fn rendered_cards(&self) -> &[RenderedCard] {
        &self.rendered_cards
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn group_yaw(&self) -> f32 {
        self.group_yaw
    }

    /// Pack particles then cards into the instance buffer for GPU upload.
    /// Call this after `step()`.
    pub fn pack_instances(&mut self) -> &[ParticleInstance] {
        self.instance_buffer.clear();
        self.instance_buffer.reserve(self.rendered.len() + self.rendered_cards.len());
        for p in &self.rendered {
            self.instance_buffer.push(ParticleInstance {
                position_emissive: [
                    p.position.x,
                    p.position.y,
                    p.position.z,
                    p.emissive.unwrap_or(0.0),
                ],
                scale_kind: [p.scale.x, p.scale.y, p.scale.z, p.kind.shader_tag() as f32],
                rotation_flags: [p.rotation.x, p.rotation.y, p.rotation.z, 0.0],
                color: p.color.to_array(),
            });
        }
        for c in &self.rendered_cards {
            self.instance_buffer.push(ParticleInstance {
                position_emissive: [c.position.x, c.position.y, c.position.z, 0.0],
                scale_kind: [c.scale.x, c.scale.y, c.scale.z, CARD_SHADER_TAG as f32],
                rotation_flags: [
                    c.rotation.x,
                    c.rotation.y,
                    c.rotation.z,
                    if c.highlighted { 1.0 } else { 0.0 },
                ],
                color: c.color.to_array(),
            });
        }
        &self.instance_buffer
    }

    /// The packed instance data from the last `pack_instances` call
    pub fn instance_data(&self) -> &[ParticleInstance] {
        &self.instance_buffer
    }
}

/// Idle tumble: the particle's fixed orientation advanced along the spin axis
/// at a per-particle rate. Constant while `spin_phase` is constant.
fn idle_rotation(seed: Vec3, spin_phase: f32) -> Vec3 {
    let rate = 0.5 + seed.x / std::f32::consts::TAU;
    let angle = spin_phase * rate;
    Vec3::new(
        wrap_angle(seed.x + SPIN_AXIS.x * angle),
        wrap_angle(seed.y + SPIN_AXIS.y * angle),
        wrap_angle(seed.z + SPIN_AXIS.z * angle),
    )
}

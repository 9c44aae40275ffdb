//! Tinsel Particles - Procedural tree formation and animation
//!
//! Provides the particle engine behind the tree:
//! - Seeded generation of a tree formation and a scattered formation
//! - Theme-driven coloring, rewritten in place for cosmetic changes
//! - Frame-rate independent interpolation between the two formations
//! - Photo cards hung on the tree, with placeholders for missing images
//! - Budgeted regeneration with atomic swaps
//! - GPU instance packing for instanced draw calls

pub mod config;
pub mod controls;
pub mod curves;
pub mod degradation;
pub mod driver;
pub mod formation;
pub mod particle;
pub mod photo;
pub mod rand;
pub mod scheduler;
pub mod theme;

use tinsel_core::Result;
use tinsel_runtime::{ControlSignal, RuntimeSystem, SignalBus};

pub use config::{ConfigChange, EngineTuning, SceneConfig, TreeConfig, MAX_PARTICLES};
pub use controls::ControlState;
pub use degradation::Degradation;
pub use driver::{AnimationDriver, FrameStats, RenderedCard, RenderedParticle};
pub use formation::{apply_appearance, generate, Silhouette};
pub use particle::{KindCounts, ParticleInstance, ParticleKind, ParticleRecord, ParticleSet};
pub use photo::{PhotoCard, PhotoGallery, PhotoRef};
pub use scheduler::RegenScheduler;
pub use theme::LightTheme;

/// Undrained degradations kept for `take_degradations`; the oldest are
/// dropped past this
pub const MAX_PENDING_DEGRADATIONS: usize = 256;

/// The tree system: owns the configuration, the live particle set, the photo
/// gallery and the driver, and implements RuntimeSystem for the frame loop.
///
/// Settings, photos and control signals may change at any time between
/// frames; they take effect at the start of the next `frame`.
pub struct TreeSystem {
    config: TreeConfig,
    particles: ParticleSet,
    gallery: PhotoGallery,
    cards: Vec<PhotoCard>,
    /// Gallery revision and particle generation the cards were laid out for
    cards_layout: Option<(u64, u64)>,
    controls: ControlState,
    signals: SignalBus,
    scheduler: RegenScheduler,
    driver: AnimationDriver,
    degradations: Vec<Degradation>,
    degradations_recorded: u64,
}

impl TreeSystem {
    /// Build the system and generate the initial set. Particles start in
    /// their scatter positions and assemble over the first frames.
    pub fn new(config: TreeConfig, tuning: EngineTuning) -> Self {
        let (config, issues) = config.sanitize();
        let mut scheduler = RegenScheduler::new(&tuning);
        scheduler.request(config.clone());

        let mut particles = ParticleSet::default();
        let mut overrun = None;
        if let Some(outcome) = scheduler.run() {
            particles = outcome.set;
            overrun = outcome.overrun;
        }

        let mut driver = AnimationDriver::new(&tuning);
        driver.rebind(&particles);

        let mut system = Self {
            config,
            particles,
            gallery: PhotoGallery::new(),
            cards: Vec::new(),
            cards_layout: None,
            controls: ControlState::default(),
            signals: SignalBus::new(),
            scheduler,
            driver,
            degradations: Vec::new(),
            degradations_recorded: 0,
        };
        system.record(issues.into_iter().chain(overrun));
        system
    }

    /// Build from a scene file's settings, tuning and photos
    pub fn from_scene(scene: &SceneConfig) -> Self {
        let mut system = Self::new(scene.tree.clone(), scene.engine.clone());
        for source in &scene.photos {
            system.add_photo(PhotoRef::new(source.clone()));
        }
        system
    }

    /// Replace the configuration.
    ///
    /// Cosmetic changes recolor the live set immediately and never move a
    /// particle. Structural changes queue a regeneration that is swapped in
    /// at the next frame; a later structural change replaces it.
    pub fn set_config(&mut self, config: TreeConfig) -> ConfigChange {
        let (config, issues) = config.sanitize();
        self.record(issues);

        let change = TreeConfig::classify_change(&self.config, &config);
        match change {
            ConfigChange::Unchanged => {}
            ConfigChange::Cosmetic => {
                self.config = config;
                apply_appearance(&mut self.particles, &self.config);
                log::debug!("appearance updated in place ({} particles)", self.particles.len());
            }
            ConfigChange::Structural => {
                self.config = config.clone();
                let generation = self.scheduler.request(config);
                log::debug!("regeneration {generation} queued");
            }
        }
        change
    }

    /// Queue a control signal for the next frame
    pub fn push_signal(&mut self, signal: ControlSignal) {
        self.signals.push(signal);
    }

    /// Append a photo, returning its index
    pub fn add_photo(&mut self, photo: PhotoRef) -> usize {
        let missing = photo.is_missing();
        let index = self.gallery.add(photo);
        if missing {
            let degradation = Degradation::MissingVisualData { photo_index: index };
            degradation.log();
            self.record([degradation]);
        }
        index
    }

    /// Remove a photo; later photos move down one index
    pub fn remove_photo(&mut self, index: usize) -> Option<PhotoRef> {
        self.gallery.remove(index)
    }

    /// Advance one display frame
    pub fn frame(&mut self, dt: f32) -> FrameStats {
        let recorded_before = self.degradations_recorded;

        for signal in self.signals.drain() {
            self.controls.apply(signal);
        }

        if let Some(outcome) = self.scheduler.run() {
            let mut set = outcome.set;
            // pick up cosmetic edits made while the request was queued
            apply_appearance(&mut set, &self.config);
            self.record(outcome.overrun);
            self.particles = set;
            self.driver.rebind(&self.particles);
        }

        let layout = (self.gallery.revision(), self.particles.generation);
        if self.cards_layout != Some(layout) {
            self.cards = photo::layout_cards(self.gallery.photos(), &self.particles.silhouette);
            self.driver.rebind_cards(&self.cards);
            self.cards_layout = Some(layout);
        }

        let mut stats = self
            .driver
            .step(dt, &self.particles, &self.cards, &self.controls);
        stats.degraded = (self.degradations_recorded - recorded_before) as usize;
        stats
    }

    fn record(&mut self, issues: impl IntoIterator<Item = Degradation>) {
        for degradation in issues {
            self.degradations.push(degradation);
            self.degradations_recorded += 1;
        }
        let excess = self
            .degradations
            .len()
            .saturating_sub(MAX_PENDING_DEGRADATIONS);
        if excess > 0 {
            self.degradations.drain(..excess);
            log::debug!("dropped {excess} undrained degradation(s)");
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn gallery(&self) -> &PhotoGallery {
        &self.gallery
    }

    pub fn cards(&self) -> &[PhotoCard] {
        &self.cards
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn scheduler(&self) -> &RegenScheduler {
        &self.scheduler
    }

    pub fn rendered(&self) -> &[RenderedParticle] {
        self.driver.rendered()
    }

    pub fn rendered_cards(&self) -> &[RenderedCard] {
        self.driver.rendered_cards()
    }

    /// Pack the last frame into GPU instances
    pub fn pack_instances(&mut self) -> &[ParticleInstance] {
        self.driver.pack_instances()
    }

    /// Degradations recorded since the last call, oldest first. At most
    /// `MAX_PENDING_DEGRADATIONS` are kept between calls.
    pub fn take_degradations(&mut self) -> Vec<Degradation> {
        std::mem::take(&mut self.degradations)
    }
}

impl Default for TreeSystem {
    fn default() -> Self {
        Self::new(TreeConfig::default(), EngineTuning::default())
    }
}

impl RuntimeSystem for TreeSystem {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[tree] {} particles ({} leaves, {} ornaments, {} lights), {} photo(s)",
            self.particles.len(),
            self.particles.counts.leaf_family(),
            self.particles.counts.ornaments,
            self.particles.counts.light_family(),
            self.gallery.len()
        );
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.frame(dt as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "tree"
    }
}

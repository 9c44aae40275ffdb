//! Regeneration scheduling
//!
//! Structural changes queue a request instead of regenerating on the spot.
//! Only the newest request survives until the next frame, where it is built
//! in full and handed back for an atomic swap. Build time is measured against
//! a budget; overruns lower the count cap for later builds.

use std::time::Instant;

use crate::config::{EngineTuning, TreeConfig, MAX_PARTICLES};
use crate::degradation::Degradation;
use crate::formation::generate_with_limit;
use crate::particle::ParticleSet;

/// Builds under this share of the budget let a lowered cap recover
const RELAX_THRESHOLD: f64 = 0.5;
/// Growth applied to the cap per comfortable build
const RELAX_FACTOR: f64 = 1.25;

/// A queued regeneration
#[derive(Debug, Clone, PartialEq)]
pub struct RegenRequest {
    pub generation: u64,
    pub config: TreeConfig,
}

/// Outcome of a completed regeneration
#[derive(Debug)]
pub struct RegenOutcome {
    pub set: ParticleSet,
    pub elapsed_ms: f64,
    pub overrun: Option<Degradation>,
}

pub struct RegenScheduler {
    next_generation: u64,
    pending: Option<RegenRequest>,
    budget_ms: f64,
    floor: usize,
    effective_cap: usize,
    superseded: u64,
}

impl RegenScheduler {
    pub fn new(tuning: &EngineTuning) -> Self {
        let floor = tuning.min_effective_cap.min(MAX_PARTICLES);
        Self {
            next_generation: 1,
            pending: None,
            budget_ms: tuning.regen_budget_ms,
            floor,
            effective_cap: MAX_PARTICLES,
            superseded: 0,
        }
    }

    /// Queue a regeneration for `config`, replacing any request not yet run.
    /// Returns the generation number the result will carry.
    pub fn request(&mut self, config: TreeConfig) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        let request = RegenRequest { generation, config };
        if let Some(old) = self.pending.replace(request) {
            self.superseded += 1;
            log::debug!(
                "regeneration {} superseded by {generation}",
                old.generation
            );
        }
        generation
    }

    /// Build the pending request, if any. The returned set is complete; the
    /// caller swaps it in whole.
    pub fn run(&mut self) -> Option<RegenOutcome> {
        let request = self.pending.take()?;
        let requested = request.config.effective_count();

        let start = Instant::now();
        let mut set = generate_with_limit(&request.config, self.effective_cap);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        set.generation = request.generation;

        log::info!(
            "generation {}: built {} particles in {elapsed_ms:.2}ms",
            request.generation,
            set.len()
        );
        if set.len() < requested {
            log::debug!(
                "generation {} capped from {requested} to {}",
                request.generation,
                set.len()
            );
        }

        let overrun = self.record_duration(requested, set.len(), elapsed_ms);
        Some(RegenOutcome {
            set,
            elapsed_ms,
            overrun,
        })
    }

    /// Fold one build's timing into the cap. Returns a degradation when the
    /// build overran its budget and the cap was lowered.
    pub fn record_duration(
        &mut self,
        requested: usize,
        built: usize,
        elapsed_ms: f64,
    ) -> Option<Degradation> {
        if !(elapsed_ms.is_finite() && self.budget_ms > 0.0) {
            return None;
        }

        if elapsed_ms > self.budget_ms {
            // assume build time scales linearly with count
            let fitting = (built as f64 * self.budget_ms / elapsed_ms) as usize;
            let cap = fitting.clamp(self.floor, self.effective_cap);
            if cap >= self.effective_cap {
                return None;
            }
            self.effective_cap = cap;
            let degradation = Degradation::RegenerationOverrun {
                requested,
                capped: cap,
                elapsed_ms,
            };
            degradation.log();
            return Some(degradation);
        }

        if elapsed_ms < self.budget_ms * RELAX_THRESHOLD && self.effective_cap < MAX_PARTICLES {
            let raised = ((self.effective_cap as f64 * RELAX_FACTOR) as usize).min(MAX_PARTICLES);
            log::debug!("regeneration cap raised {} -> {raised}", self.effective_cap);
            self.effective_cap = raised;
        }
        None
    }

    pub fn effective_cap(&self) -> usize {
        self.effective_cap
    }

    /// Number of requests replaced before they ran
    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}

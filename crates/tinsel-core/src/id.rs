//! Particle identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one particle within a generated particle set.
///
/// Ids are the particle's index in its set, so they are stable for as long as
/// the count configuration that produced them. A regeneration hands out a
/// fresh set; ids from an older set must not be used to index the new one.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u32);

impl ParticleId {
    /// Create a ParticleId from a raw value
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Create a ParticleId from a slot index
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the raw u32 value
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Slot index of this particle in its set
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleId({})", self.0)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Photo gallery and photo-card layout
//!
//! Photos live outside the particle set: adding or removing one never
//! regenerates particles or shifts their ids. Each photo gets a dedicated
//! card with its own tree anchor and scatter target.

use serde::Serialize;
use std::f32::consts::TAU;
use tinsel_core::Vec3;

use crate::formation::{Silhouette, GOLDEN_ANGLE};

/// Card dimensions: width, height, thickness
const CARD_SCALE: Vec3 = Vec3::new(0.9, 1.1, 0.03);
/// Height band (as fractions of tree height) that card anchors spread over
const CARD_BAND: (f32, f32) = (0.15, 0.75);
/// Exploded cards orbit at this multiple of the silhouette bounding radius
const CARD_RING_FACTOR: f32 = 1.2;

/// Opaque reference to an image (path, URL, data URI). Only its presence
/// matters to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoRef {
    pub source: String,
}

impl PhotoRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// True when there is no backing image
    pub fn is_missing(&self) -> bool {
        self.source.trim().is_empty()
    }
}

/// Ordered, user-managed list of photos
#[derive(Debug, Clone, Default)]
pub struct PhotoGallery {
    photos: Vec<PhotoRef>,
    /// Bumped on every add/remove; card layouts are keyed on it
    revision: u64,
}

impl PhotoGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a photo, returning its index
    pub fn add(&mut self, photo: PhotoRef) -> usize {
        self.photos.push(photo);
        self.revision += 1;
        self.photos.len() - 1
    }

    /// Remove the photo at `index`; later photos shift down by one
    pub fn remove(&mut self, index: usize) -> Option<PhotoRef> {
        if index >= self.photos.len() {
            return None;
        }
        self.revision += 1;
        Some(self.photos.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRef> {
        self.photos.get(index)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }
}

/// Layout of one photo card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoCard {
    pub index: usize,
    pub tree_position: Vec3,
    pub scatter_position: Vec3,
    /// Yaw (radians) turning the card face away from the trunk
    pub facing: f32,
    pub scale: Vec3,
    /// No image: render a neutral placeholder in this slot
    pub placeholder: bool,
}

impl PhotoCard {
    pub fn target(&self, exploded: bool) -> Vec3 {
        if exploded {
            self.scatter_position
        } else {
            self.tree_position
        }
    }
}

/// Lay out one card per photo.
///
/// Assembled, cards hang on the cone surface at evenly spaced levels up the
/// trunk axis, turned by golden angle. Exploded, they form a ring around the
/// tree's middle, outside its bounding sphere.
pub fn layout_cards(photos: &[PhotoRef], s: &Silhouette) -> Vec<PhotoCard> {
    let n = photos.len();
    let ring_radius = s.bounding_radius() * CARD_RING_FACTOR;
    let center = s.center();

    photos
        .iter()
        .enumerate()
        .map(|(index, photo)| {
            let level = (index as f32 + 0.5) / n as f32;
            let t = CARD_BAND.0 + (CARD_BAND.1 - CARD_BAND.0) * level;
            let theta = index as f32 * GOLDEN_ANGLE;
            let r = s.cone_radius(t);
            let tree_position = Vec3::new(r * theta.cos(), s.base_y + t * s.height, r * theta.sin());

            let phi = index as f32 / n as f32 * TAU;
            let scatter_position =
                center + Vec3::new(ring_radius * phi.cos(), 0.0, ring_radius * phi.sin());

            PhotoCard {
                index,
                tree_position,
                scatter_position,
                facing: std::f32::consts::FRAC_PI_2 - theta,
                scale: CARD_SCALE,
                placeholder: photo.is_missing(),
            }
        })
        .collect()
}

//! Non-fatal conditions the engine absorbs instead of failing the frame

use serde::Serialize;
use std::fmt;

/// Something the engine had to work around.
///
/// None of these stop the frame loop. Each one is logged at `warn` where it
/// is detected and handed to the caller through
/// [`TreeSystem::take_degradations`](crate::TreeSystem::take_degradations).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// An out-of-range or non-finite setting was clamped
    InvalidConfiguration {
        field: &'static str,
        requested: f64,
        applied: f64,
    },
    /// Generation ran over its time budget; later requests are capped
    RegenerationOverrun {
        requested: usize,
        capped: usize,
        elapsed_ms: f64,
    },
    /// A photo card has no backing image and renders as a placeholder
    MissingVisualData { photo_index: usize },
}

impl Degradation {
    pub(crate) fn log(&self) {
        log::warn!("{self}");
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::InvalidConfiguration {
                field,
                requested,
                applied,
            } => write!(f, "config '{field}' = {requested} out of range, using {applied}"),
            Degradation::RegenerationOverrun {
                requested,
                capped,
                elapsed_ms,
            } => write!(
                f,
                "generating {requested} particles took {elapsed_ms:.2}ms, capping to {capped}"
            ),
            Degradation::MissingVisualData { photo_index } => {
                write!(f, "photo {photo_index} has no image, rendering placeholder")
            }
        }
    }
}

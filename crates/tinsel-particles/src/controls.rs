//! Control state fed to the animation driver
//!
//! Translates raw [`ControlSignal`]s from buttons and the gesture recognizer
//! into the three inputs the driver reads each frame.

use serde::Serialize;
use tinsel_runtime::ControlSignal;

/// Upper bound for rotation speed, radians per second
pub const MAX_ROTATION_SPEED: f32 = 4.0;

/// Sentinel for "no photo highlighted"
pub const NO_HIGHLIGHT: i64 = -1;

/// Current control inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlState {
    /// Active formation: scatter when true, tree when false
    pub exploded: bool,
    /// Idle spin / tree yaw speed, radians per second, `>= 0`
    pub rotation_speed: f32,
    /// Requested photo highlight; validated against the gallery on read
    pub highlighted_photo: i64,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            exploded: false,
            rotation_speed: 0.0,
            highlighted_photo: NO_HIGHLIGHT,
        }
    }
}

impl ControlState {
    /// Apply one signal. Returns true if any input changed.
    pub fn apply(&mut self, signal: ControlSignal) -> bool {
        let before = *self;
        match signal {
            ControlSignal::ToggleExplode => self.exploded = !self.exploded,
            // Gesture edges only act on the opposite state
            ControlSignal::Explode => {
                if !self.exploded {
                    self.exploded = true;
                }
            }
            ControlSignal::Assemble => {
                if self.exploded {
                    self.exploded = false;
                }
            }
            ControlSignal::Rotate(speed) => {
                let speed = if speed.is_finite() {
                    speed.clamp(0.0, MAX_ROTATION_SPEED)
                } else {
                    0.0
                };
                if speed != self.rotation_speed {
                    self.rotation_speed = speed;
                }
            }
            ControlSignal::SelectPhoto(index) => {
                self.highlighted_photo = if index < 0 { NO_HIGHLIGHT } else { index };
            }
        }
        let changed = *self != before;
        if changed {
            log::debug!("control '{}' applied: {:?}", signal.name(), self);
        }
        changed
    }

    /// Highlighted photo index if it refers to an existing photo.
    /// Anything past the end of the gallery reads as no highlight.
    pub fn highlighted(&self, photo_count: usize) -> Option<usize> {
        usize::try_from(self.highlighted_photo)
            .ok()
            .filter(|&i| i < photo_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_gestures_are_idempotent() {
        let mut c = ControlState::default();
        assert!(c.apply(ControlSignal::Explode));
        assert!(c.exploded);
        assert!(!c.apply(ControlSignal::Explode));
        assert!(c.apply(ControlSignal::ToggleExplode));
        assert!(!c.exploded);
        assert!(!c.apply(ControlSignal::Assemble));
    }

    #[test]
    fn rotation_is_clamped_and_sanitized() {
        let mut c = ControlState::default();
        c.apply(ControlSignal::Rotate(-2.0));
        assert_eq!(c.rotation_speed, 0.0);
        c.apply(ControlSignal::Rotate(100.0));
        assert_eq!(c.rotation_speed, MAX_ROTATION_SPEED);
        c.apply(ControlSignal::Rotate(f32::NAN));
        assert_eq!(c.rotation_speed, 0.0);
        assert!(!c.apply(ControlSignal::Rotate(0.0)));
    }

    #[test]
    fn highlight_out_of_range_is_none() {
        let mut c = ControlState::default();
        assert_eq!(c.highlighted(3), None);
        c.apply(ControlSignal::SelectPhoto(2));
        assert_eq!(c.highlighted(3), Some(2));
        assert_eq!(c.highlighted(2), None);
        c.apply(ControlSignal::SelectPhoto(-7));
        assert_eq!(c.highlighted_photo, NO_HIGHLIGHT);
        assert_eq!(c.highlighted(3), None);
    }
}

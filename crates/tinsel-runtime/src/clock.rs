//! Frame clock with clamped deltas

use std::time::Instant;

/// Longest delta a single frame may report, in seconds
const MAX_FRAME_DELTA: f64 = 0.25;

/// Tracks elapsed time across display frames.
///
/// `tick` reads the wall clock; `advance` steps by a caller-supplied delta so
/// headless runs and tests are deterministic. Both clamp the delta so a stall
/// (debugger, window drag) does not teleport every animation at once.
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Number of frames advanced so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    /// Create a new frame clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame_count += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by an explicit delta (headless / fixed-step driving).
    /// Negative and NaN deltas count as zero.
    pub fn advance(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta_time = dt.min(MAX_FRAME_DELTA);
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.total_time - 1.0).abs() < 1e-9);
        assert_eq!(clock.frame_count, 60);
    }

    #[test]
    fn test_advance_clamps_stalls_and_garbage() {
        let mut clock = FrameClock::new();
        clock.advance(3.0);
        assert!((clock.delta_time - MAX_FRAME_DELTA).abs() < 1e-12);
        clock.advance(-1.0);
        assert_eq!(clock.delta_time, 0.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.delta_time, 0.0);
        assert!((clock.total_time - MAX_FRAME_DELTA).abs() < 1e-12);
    }
}

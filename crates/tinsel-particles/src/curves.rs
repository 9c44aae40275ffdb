//! Scalar helpers for per-frame smoothing and periodic effects

use std::f32::consts::TAU;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the remaining distance to cover this frame for an exponential
/// approach at `rate` per second. Frame-rate independent: two steps of `dt`
/// cover the same ground as one step of `2 * dt`.
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 || dt <= 0.0 || !rate.is_finite() || !dt.is_finite() {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Sine oscillation remapped to [lo, hi]
pub fn pulse(time: f32, frequency: f32, phase: f32, lo: f32, hi: f32) -> f32 {
    let s = (time * frequency + phase).sin() * 0.5 + 0.5;
    lerp_f32(lo, hi, s)
}

/// Wrap an angle into [0, TAU)
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Fractional part in [0, 1)
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

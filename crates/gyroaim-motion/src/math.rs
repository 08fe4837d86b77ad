//! Small vector helpers on top of glam.

use glam::{Quat, Vec3};

/// Sign that never returns zero: `0.0` counts as positive.
#[inline]
pub fn sign_nonzero(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Clamp without panicking on inverted bounds (`lo` wins).
#[inline]
pub fn between(lo: f32, hi: f32, x: f32) -> f32 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Per-axis clamp of a vector into `[lo, hi]`.
#[inline]
pub fn clamp_vec(lo: f32, hi: f32, v: Vec3) -> Vec3 {
    Vec3::new(between(lo, hi, v.x), between(lo, hi, v.y), between(lo, hi, v.z))
}

/// Normalised position of `x` in `[lo, hi]`, saturated to `[0, 1]`.
///
/// A degenerate range (`hi <= lo`) is a step at `lo`.
#[inline]
pub fn ramp(lo: f32, hi: f32, x: f32) -> f32 {
    let denom = hi - lo;
    if denom <= 0.0 {
        if x < lo {
            0.0
        } else {
            1.0
        }
    } else {
        between(0.0, 1.0, (x - lo) / denom)
    }
}

/// Rotation of `angle` radians around `axis`. A zero axis yields identity.
pub fn angle_axis(angle: f32, axis: Vec3) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, angle)
}

/// Rotation that undoes `gyro` applied over `delta_time`.
///
/// The device turning one way turns device-local vectors the other way.
pub fn reverse_rotation(gyro: Vec3, delta_time: f32) -> Quat {
    angle_axis(gyro.length() * delta_time, -gyro)
}

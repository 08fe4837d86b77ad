//! Gravity estimation by complementary filtering of gyro and accelerometer.
//!
//! The gravity vector is carried around by integrating the gyro, so it stays
//! expressed in the controller's rotating frame, and is pulled toward the
//! measured acceleration at a rate that depends on how much the controller
//! is being shaken.
//!
//! Based on the sensor fusion write-up by Julian "Jibb" Smart:
//! <http://gyrowiki.jibbsmart.com/blog:finding-gravity-with-sensor-fusion>

use crate::math::{between, reverse_rotation};
use glam::Vec3;

/// Decay rate of the smoothed acceleration (1 / 0.25 s half-life).
const SMOOTH_HALF_TIME: f32 = 4.0;

const SHAKINESS_MIN_THRESH: f32 = 0.01;
const SHAKINESS_MAX_THRESH: f32 = 0.4;

const COR_STILL_RATE: f32 = 1.0;
const COR_SHAKY_RATE: f32 = 0.1;

const COR_GYRO_FACTOR: f32 = 0.1;
const COR_GYRO_MIN_THRESH: f32 = 0.05;
const COR_GYRO_MAX_THRESH: f32 = 0.25;

const COR_MIN_SPEED: f32 = 0.01;

/// State carried between samples by the gravity filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GravityState {
    /// Estimated gravity in device-local space.
    pub gravity: Vec3,
    /// Low-passed acceleration.
    pub smooth_accel: Vec3,
    /// Decayed peak deviation of acceleration from `smooth_accel`.
    pub shakiness: f32,
}

/// Gravity filter variant, chosen from the gyro space at refresh time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GravityFilter {
    /// Gravity is left untouched.
    #[default]
    Skip,
    /// Full gyro integration plus accelerometer correction.
    Full,
}

impl GravityFilter {
    /// Update `state` from one calibrated gyro sample and the latest accel.
    pub fn update(
        self,
        state: &mut GravityState,
        gyro: Vec3,
        accel: Vec3,
        accel_magnitude: f32,
        delta_time: f32,
    ) {
        if self == GravityFilter::Full {
            update_gravity(state, gyro, accel, accel_magnitude, delta_time);
        }
    }
}

fn update_gravity(
    state: &mut GravityState,
    gyro: Vec3,
    accel: Vec3,
    accel_magnitude: f32,
    delta_time: f32,
) {
    let angle_speed = gyro.length();
    let reverse = reverse_rotation(gyro, delta_time);
    state.gravity = reverse * state.gravity;

    let accel_length = accel.length();
    if accel_length <= 0.0 {
        return;
    }
    let accel_norm = accel / accel_length;

    // Shakiness.
    state.smooth_accel = reverse * state.smooth_accel;
    let smooth_factor = (-delta_time * SMOOTH_HALF_TIME).exp2();
    state.shakiness *= smooth_factor;
    state.shakiness = state.shakiness.max((accel - state.smooth_accel).length());
    state.smooth_accel = accel.lerp(state.smooth_accel, smooth_factor);

    let target = accel_norm * -accel_magnitude;
    let gravity_delta = target - state.gravity;
    let gravity_direction = gravity_delta.normalize_or_zero();

    let still_or_shaky = between(
        0.0,
        1.0,
        (state.shakiness - SHAKINESS_MIN_THRESH) / (SHAKINESS_MAX_THRESH - SHAKINESS_MIN_THRESH),
    );
    let mut correction_rate = COR_STILL_RATE + (COR_SHAKY_RATE - COR_STILL_RATE) * still_or_shaky;

    // Never correct faster than the controller is rotating, unless far off.
    let correction_limit = (angle_speed * COR_GYRO_FACTOR).max(COR_MIN_SPEED);
    if correction_rate > correction_limit {
        let close_factor = between(
            0.0,
            1.0,
            (gravity_delta.length() - COR_GYRO_MIN_THRESH)
                / (COR_GYRO_MAX_THRESH - COR_GYRO_MIN_THRESH),
        );
        correction_rate = correction_limit + (correction_rate - correction_limit) * close_factor;
    }

    let correction = gravity_direction * (correction_rate * delta_time);
    if correction.length_squared() < gravity_delta.length_squared() {
        state.gravity += correction;
    } else {
        state.gravity = target;
    }
}

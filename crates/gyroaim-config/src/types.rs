use glam::Vec3;
use gyroaim_motion::gate::GyroAction;
use gyroaim_motion::settings::GyroSettings;
use gyroaim_motion::space::GyroSpace;
use gyroaim_motion::types::{CalibrationValues, ViewOptions, DEFAULT_ACCEL_MAGNITUDE};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::warn;

/// Calibration values are stored as 8.24 fixed point.
const CAL_BITS: u32 = 24;
const CAL_UNIT: f64 = (1u32 << CAL_BITS) as f64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gyro: GyroConfig,
    pub view: ViewConfig,
}

/// Gyro aiming options, in the units shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GyroConfig {
    /// Enable gamepad gyro aiming.
    pub enable: bool,
    /// 0 = Local Turn, 1 = Local Lean, 2 = Player Turn, 3 = Player Lean.
    pub space: i32,
    /// 0 = None, 1 = Disable Gyro, 2 = Enable Gyro.
    pub button_action: i32,
    /// Camera stick action, same encoding as `button_action`.
    pub stick_action: i32,
    /// 0 = 0.0x, 100 = 10.0x.
    pub turn_sensitivity: i32,
    /// 0 = 0.0x, 100 = 10.0x.
    pub look_sensitivity: i32,
    /// Acceleration multiplier, 10 = 1.0x (off), 40 = 4.0x.
    pub acceleration: i32,
    /// Lower threshold for applying acceleration [degrees/second].
    pub accel_min_threshold: i32,
    /// Upper threshold for applying acceleration [degrees/second].
    pub accel_max_threshold: i32,
    /// Smoothing threshold [degrees/second].
    pub smooth_threshold: i32,
    /// Smoothing time [milliseconds].
    pub smooth_time: i32,
    /// Tightening threshold [degrees/second].
    pub tightening: i32,
    pub calibration: CalibrationConfig,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            enable: false,
            space: 2,
            button_action: 2,
            stick_action: 0,
            turn_sensitivity: 10,
            look_sensitivity: 10,
            acceleration: 20,
            accel_min_threshold: 0,
            accel_max_threshold: 75,
            smooth_threshold: 5,
            smooth_time: 125,
            tightening: 0,
            calibration: CalibrationConfig::default(),
        }
    }
}

fn clamp_field(name: &str, value: &mut i32, range: RangeInclusive<i32>) {
    if !range.contains(value) {
        let clamped = (*value).clamp(*range.start(), *range.end());
        warn!(field = name, value = *value, clamped, "Gyro setting out of range");
        *value = clamped;
    }
}

impl GyroConfig {
    /// Force every field into its valid range.
    pub fn sanitize(&mut self) {
        clamp_field("space", &mut self.space, 0..=3);
        clamp_field("button_action", &mut self.button_action, 0..=2);
        clamp_field("stick_action", &mut self.stick_action, 0..=2);
        clamp_field("turn_sensitivity", &mut self.turn_sensitivity, 0..=100);
        clamp_field("look_sensitivity", &mut self.look_sensitivity, 0..=100);
        clamp_field("acceleration", &mut self.acceleration, 10..=40);
        clamp_field("accel_min_threshold", &mut self.accel_min_threshold, 0..=200);
        clamp_field("accel_max_threshold", &mut self.accel_max_threshold, 0..=200);
        clamp_field("smooth_threshold", &mut self.smooth_threshold, 0..=50);
        clamp_field("smooth_time", &mut self.smooth_time, 0..=500);
        clamp_field("tightening", &mut self.tightening, 0..=50);
    }

    /// Settings for the motion pipeline, including decoded calibration.
    pub fn settings(&self) -> GyroSettings {
        GyroSettings {
            enable: self.enable,
            space: GyroSpace::from_index(self.space),
            button_action: GyroAction::from_index(self.button_action),
            stick_action: GyroAction::from_index(self.stick_action),
            turn_sensitivity: self.turn_sensitivity,
            look_sensitivity: self.look_sensitivity,
            acceleration: self.acceleration,
            accel_min_threshold: self.accel_min_threshold,
            accel_max_threshold: self.accel_max_threshold,
            smooth_threshold: self.smooth_threshold,
            smooth_time: self.smooth_time,
            tightening: self.tightening,
            calibration: self.calibration.values(),
        }
    }
}

/// Persisted calibration, 8.24 fixed point.
///
/// `a` is the accelerometer magnitude relative to 1 g.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub a: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

fn to_fixed(value: f32) -> i32 {
    (value as f64 * CAL_UNIT) as i32
}

fn from_fixed(value: i32) -> f32 {
    (value as f64 / CAL_UNIT) as f32
}

impl CalibrationConfig {
    pub fn from_values(values: &CalibrationValues) -> Self {
        Self {
            a: to_fixed(values.accel_magnitude - DEFAULT_ACCEL_MAGNITUDE),
            x: to_fixed(values.gyro_offset.x),
            y: to_fixed(values.gyro_offset.y),
            z: to_fixed(values.gyro_offset.z),
        }
    }

    pub fn values(&self) -> CalibrationValues {
        CalibrationValues {
            accel_magnitude: from_fixed(self.a) + DEFAULT_ACCEL_MAGNITUDE,
            gyro_offset: Vec3::new(from_fixed(self.x), from_fixed(self.y), from_fixed(self.z)),
        }
    }

    /// True when no calibration has ever been stored.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Allow vertical look.
    pub look_enabled: bool,
    /// Compensate look for the stretched 4:3 display.
    pub correct_aspect_ratio: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let view = ViewOptions::default();
        Self {
            look_enabled: view.look_enabled,
            correct_aspect_ratio: view.correct_aspect_ratio,
        }
    }
}

impl ViewConfig {
    pub fn options(&self) -> ViewOptions {
        ViewOptions {
            look_enabled: self.look_enabled,
            correct_aspect_ratio: self.correct_aspect_ratio,
        }
    }
}

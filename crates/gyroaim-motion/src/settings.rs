use crate::fusion::GravityFilter;
use crate::gate::{ActivationGate, GyroAction};
use crate::shaping::{Acceleration, Smoothing, Tightening};
use crate::space::GyroSpace;
use crate::types::CalibrationValues;
use glam::Vec2;

/// User-facing gyro settings in their configured units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSettings {
    pub enable: bool,
    pub space: GyroSpace,
    pub button_action: GyroAction,
    pub stick_action: GyroAction,
    /// Tenths: 10 = 1.0x.
    pub turn_sensitivity: i32,
    /// Tenths: 10 = 1.0x.
    pub look_sensitivity: i32,
    /// Tenths: 10 = 1.0x (off), 40 = 4.0x.
    pub acceleration: i32,
    /// Degrees per second.
    pub accel_min_threshold: i32,
    /// Degrees per second.
    pub accel_max_threshold: i32,
    /// Degrees per second.
    pub smooth_threshold: i32,
    /// Milliseconds.
    pub smooth_time: i32,
    /// Degrees per second.
    pub tightening: i32,
    pub calibration: CalibrationValues,
}

impl Default for GyroSettings {
    fn default() -> Self {
        Self {
            enable: false,
            space: GyroSpace::PlayerTurn,
            button_action: GyroAction::Enable,
            stick_action: GyroAction::None,
            turn_sensitivity: 10,
            look_sensitivity: 10,
            acceleration: 20,
            accel_min_threshold: 0,
            accel_max_threshold: 75,
            smooth_threshold: 5,
            smooth_time: 125,
            tightening: 0,
            calibration: CalibrationValues::default(),
        }
    }
}

/// Per-stage variants selected from [`GyroSettings`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stages {
    pub gravity: GravityFilter,
    pub space: GyroSpace,
    pub smoothing: Smoothing,
    pub tightening: Tightening,
    pub acceleration: Acceleration,
    pub gate: ActivationGate,
}

fn deg_to_rad(degrees: i32) -> f32 {
    (degrees as f32).to_radians()
}

impl Stages {
    pub fn from_settings(settings: &GyroSettings) -> Self {
        let min_sensitivity = Vec2::new(
            settings.look_sensitivity as f32 / 10.0,
            settings.turn_sensitivity as f32 / 10.0,
        );

        let acceleration = if settings.acceleration > 10 {
            Acceleration::Full {
                min_sensitivity,
                max_sensitivity: min_sensitivity * settings.acceleration as f32 / 10.0,
                min_thresh: deg_to_rad(settings.accel_min_threshold),
                max_thresh: deg_to_rad(settings.accel_max_threshold),
            }
        } else {
            Acceleration::Skip {
                sensitivity: min_sensitivity,
            }
        };

        Self {
            gravity: settings.space.gravity_filter(),
            space: settings.space,
            smoothing: Smoothing::new(
                deg_to_rad(settings.smooth_threshold),
                settings.smooth_time as f32 / 1000.0,
            ),
            tightening: Tightening::new(deg_to_rad(settings.tightening)),
            acceleration,
            gate: ActivationGate::new(settings.button_action, settings.stick_action),
        }
    }
}

use glam::Vec3;

/// Default resting accelerometer magnitude (1 g).
pub const DEFAULT_ACCEL_MAGNITUDE: f32 = 1.0;

/// One gyroscope reading as delivered by the event layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    /// Seconds since the previous sample.
    pub delta_time: f32,
    /// Angular velocity (rad/s): x = pitch, y = yaw, z = roll.
    pub gyro: Vec3,
}

impl GyroSample {
    pub fn new(delta_time: f32, pitch: f32, yaw: f32, roll: f32) -> Self {
        Self {
            delta_time,
            gyro: Vec3::new(pitch, yaw, roll),
        }
    }
}

/// Calibration result in plain floating point.
///
/// Fixed-point encoding for storage is the config layer's business.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationValues {
    /// Resting accelerometer magnitude.
    pub accel_magnitude: f32,
    /// Gyro zero offset, subtracted from every sample.
    pub gyro_offset: Vec3,
}

impl Default for CalibrationValues {
    fn default() -> Self {
        Self {
            accel_magnitude: DEFAULT_ACCEL_MAGNITUDE,
            gyro_offset: Vec3::ZERO,
        }
    }
}

impl CalibrationValues {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Accumulated camera deltas (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GyroAxes {
    pub turn: f32,
    pub look: f32,
}

/// View options consulted when the per-frame axes are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Whether vertical look is allowed at all.
    pub look_enabled: bool,
    /// Compensate look for the stretched 4:3 display.
    pub correct_aspect_ratio: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            look_enabled: true,
            correct_aspect_ratio: true,
        }
    }
}

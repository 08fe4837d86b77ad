use glam::{EulerRot, Quat};
use gyroaim_motion::types::GyroAxes;

/// First-person look camera driven by per-frame gyro deltas.
///
/// Position is irrelevant here. Only yaw and pitch change.
pub struct Camera {
    /// Heading in radians, positive turns left.
    pub yaw: f32,
    /// Elevation in radians, positive looks up.
    pub pitch: f32,
    /// Pitch is clamped to +/- this many radians.
    pub max_pitch: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            max_pitch: 85f32.to_radians(),
        }
    }

    /// Apply one frame of turn and look.
    pub fn apply(&mut self, axes: GyroAxes) {
        self.yaw = (self.yaw + axes.turn).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + axes.look).clamp(-self.max_pitch, self.max_pitch);
    }

    /// Camera orientation as a quaternion (yaw around Y, then pitch around X).
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

//! Gyro space: how device rotation maps onto camera yaw.
//!
//! Based on the gyro space write-up by Julian "Jibb" Smart:
//! <http://gyrowiki.jibbsmart.com/blog:player-space-gyro-and-alternatives-explained>

use crate::fusion::GravityFilter;
use crate::math::{between, sign_nonzero};
use glam::{Vec2, Vec3};

/// Width of the fade band near edge-on orientations in Player Lean.
const SIDE_THRESH: f32 = 0.125;

const RELAX_FACTOR_45: f32 = 1.414_213_5;
const RELAX_FACTOR_60: f32 = 2.094_395_2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GyroSpace {
    /// Yaw axis as reported by the controller.
    LocalTurn,
    /// Rolling the controller turns the camera.
    LocalLean,
    /// Yaw around the player's gravity-aligned up axis.
    #[default]
    PlayerTurn,
    /// Roll around the player's gravity-aligned forward axis.
    PlayerLean,
}

impl GyroSpace {
    /// Decode a stored index. Unknown values fall back to the default.
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => GyroSpace::LocalTurn,
            1 => GyroSpace::LocalLean,
            3 => GyroSpace::PlayerLean,
            _ => GyroSpace::PlayerTurn,
        }
    }

    /// Player spaces need a live gravity estimate; local spaces never touch it.
    pub fn gravity_filter(self) -> GravityFilter {
        match self {
            GyroSpace::LocalTurn | GyroSpace::LocalLean => GravityFilter::Skip,
            GyroSpace::PlayerTurn | GyroSpace::PlayerLean => GravityFilter::Full,
        }
    }

    /// Rewrite the yaw component of `gyro` for this space.
    pub fn apply(self, gyro: Vec3, gravity: Vec3) -> Vec3 {
        match self {
            GyroSpace::LocalTurn => gyro,
            GyroSpace::LocalLean => Vec3::new(gyro.x, -gyro.z, gyro.z),
            GyroSpace::PlayerTurn => player_turn(gyro, gravity),
            GyroSpace::PlayerLean => player_lean(gyro, gravity),
        }
    }
}

fn player_turn(gyro: Vec3, gravity: Vec3) -> Vec3 {
    let grav_norm = gravity.normalize_or_zero();
    let world_yaw = gyro.y * grav_norm.y + gyro.z * grav_norm.z;

    let world_part = world_yaw.abs() * RELAX_FACTOR_60;
    let gyro_part = Vec2::new(gyro.y, gyro.z).length();

    let yaw = -sign_nonzero(world_yaw) * world_part.min(gyro_part);
    Vec3::new(gyro.x, yaw, gyro.z)
}

fn player_lean(gyro: Vec3, gravity: Vec3) -> Vec3 {
    let grav_norm = gravity.normalize_or_zero();

    // Fade out when the controller is edge-on.
    let flatness = grav_norm.y.abs();
    let upness = grav_norm.z.abs();
    let side_reduction = between(0.0, 1.0, (flatness.max(upness) - SIDE_THRESH) / SIDE_THRESH);

    // Local pitch axis projected onto the plane perpendicular to gravity.
    let pitch_vector = Vec3::X - grav_norm * grav_norm.x;
    if pitch_vector == Vec3::ZERO {
        return gyro;
    }

    let roll_vector = pitch_vector.cross(grav_norm);
    if roll_vector == Vec3::ZERO {
        return gyro;
    }
    let roll_vector = roll_vector.normalize();

    let world_roll = gyro.y * roll_vector.y + gyro.z * roll_vector.z;
    let world_part = world_roll.abs() * RELAX_FACTOR_45;
    let gyro_part = Vec2::new(gyro.y, gyro.z).length();

    let yaw = -sign_nonzero(world_roll) * world_part.min(gyro_part) * side_reduction;
    Vec3::new(gyro.x, yaw, gyro.z)
}

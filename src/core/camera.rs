//! Camera pose shared by every rig and published to the renderer.
//!
//! A pose is produced once per frame by whichever rig currently owns the
//! camera. It avoids platform APIs so rigs can be exercised on the host.

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::Serialize;

/// Position, orientation and vertical field of view of the viewer camera.
///
/// Orientation follows the right-handed convention: the camera looks down
/// its local -Z with +Y up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_deg: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, orientation: Quat, fov_deg: f32) -> Self {
        Self {
            position,
            orientation,
            fov_deg,
        }
    }

    pub fn looking_at(position: Vec3, target: Vec3, fov_deg: f32) -> Self {
        Self::new(position, look_rotation(position, target), fov_deg)
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, znear, zfar)
    }
}

/// Orientation that points a camera at `eye` toward `target` with +Y up.
///
/// Falls back to identity when the points coincide, and to a +Z up vector
/// when looking straight up or down.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let forward = (target - eye).normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = forward.cross(Vec3::Y);
    if right.length_squared() < 1e-8 {
        right = forward.cross(Vec3::Z);
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

/// Blend factor for a frame-rate dependent ease toward a target.
#[inline]
pub fn approach_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quadratic ease-in-out used by the story rig.
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

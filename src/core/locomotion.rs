//! First-person walking: momentum-smoothed planar motion plus mouse look.
//!
//! No gravity, no jumping, no geometry collision. The camera only ever
//! floors out at eye height.

use super::camera::{approach_factor, CameraPose};
use super::constants::{
    ACCEL_RATE, EYE_HEIGHT, FRICTION_RATE, LOOK_RAD_PER_PX, RUN_SPEED, WALK_SPEED,
};
use glam::{EulerRot, Quat, Vec2, Vec3};

/// Movement intent sampled from the input collaborator for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
}

impl MoveIntent {
    #[inline]
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Unit planar direction for `intent` relative to the camera's heading.
///
/// Returns zero when opposing inputs cancel or nothing is held.
pub fn planar_direction(orientation: Quat, intent: MoveIntent) -> Vec3 {
    let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    let front = flatten(orientation * Vec3::NEG_Z);
    let side = flatten(orientation * Vec3::X);
    let mut dir = Vec3::ZERO;
    if intent.forward {
        dir += front;
    }
    if intent.backward {
        dir -= front;
    }
    if intent.right {
        dir += side;
    }
    if intent.left {
        dir -= side;
    }
    dir.normalize_or_zero()
}

#[derive(Clone, Debug, Default)]
pub struct Locomotion {
    velocity: Vec3,
}

impl Locomotion {
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    /// Advance one frame: ease velocity toward the intent, integrate position.
    pub fn tick(&mut self, pose: &mut CameraPose, intent: MoveIntent, dt: f32) {
        let dir = planar_direction(pose.orientation, intent);
        let (target, rate) = if dir != Vec3::ZERO {
            let speed = if intent.run { RUN_SPEED } else { WALK_SPEED };
            (dir * speed, ACCEL_RATE)
        } else {
            (Vec3::ZERO, FRICTION_RATE)
        };
        let a = approach_factor(rate, dt);
        self.velocity.x += (target.x - self.velocity.x) * a;
        self.velocity.z += (target.z - self.velocity.z) * a;

        pose.position += self.velocity * dt;
        if pose.position.y < EYE_HEIGHT {
            pose.position.y = EYE_HEIGHT;
        }
    }
}

/// Pointer-lock yaw/pitch rig with fixed sensitivity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseLook {
    yaw: f32,
    pitch: f32,
}

impl MouseLook {
    /// Adopt the yaw/pitch of an existing pose (after a rig hands over).
    pub fn sync_from(&mut self, pose: &CameraPose) {
        let (yaw, pitch, _) = pose.orientation.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn apply(&mut self, pose: &mut CameraPose, delta_px: Vec2) {
        if delta_px == Vec2::ZERO {
            return;
        }
        const LIMIT: f32 = std::f32::consts::FRAC_PI_2;
        self.yaw -= delta_px.x * LOOK_RAD_PER_PX;
        self.pitch = (self.pitch - delta_px.y * LOOK_RAD_PER_PX).clamp(-LIMIT, LIMIT);
        pose.orientation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
    }
}

//! Floor-plane geometry shared by placement and ghost preview.

use super::constants::HOTSPOT_HEIGHT;
use glam::{Vec2, Vec3};

#[inline]
fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Distance between two points projected onto the horizontal plane.
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Project `floor_point` to the hotspot height, pulled back toward the
/// camera so it is never more than `max_distance` away on the floor plane.
///
/// The result's y is always exactly [`HOTSPOT_HEIGHT`].
pub fn clamped_floor_position(camera: Vec3, floor_point: Vec3, max_distance: f32) -> Vec3 {
    let cam = planar(camera);
    let hit = planar(floor_point);
    let distance = cam.distance(hit);
    let xz = if distance <= max_distance {
        hit
    } else {
        cam + (hit - cam) / distance * max_distance
    };
    Vec3::new(xz.x, HOTSPOT_HEIGHT, xz.y)
}

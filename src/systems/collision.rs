//! Overlap predicates shared by every collision check in the game.
//!
//! All tests compare squared distances. Movement checks built on these are advisory: a candidate
//! position is tested before it is committed, and a blocked move simply does not happen.

use glam::{Vec2, Vec3};

/// Whether two circles on the ground plane overlap (strictly).
pub fn circle_overlap(ax: f32, az: f32, ar: f32, bx: f32, bz: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dz = az - bz;
    let reach = ar + br;
    dx * dx + dz * dz < reach * reach
}

/// Whether two points are within `radius` of each other in all three dimensions (inclusive).
pub fn sphere_overlap(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

/// Whether a point on the ground plane lies inside a box rotated about the vertical axis.
///
/// The offset from the box centre is rotated by `-rotation_deg` into the box's local frame, then
/// compared against the half extents grown by `buffer` on every side.
#[allow(clippy::too_many_arguments)]
pub fn rotated_box_contains(
    px: f32,
    pz: f32,
    box_x: f32,
    box_z: f32,
    rotation_deg: f32,
    half_length: f32,
    half_thickness: f32,
    buffer: f32,
) -> bool {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let offset = Vec2::new(px - box_x, pz - box_z);

    let local_x = offset.x * cos + offset.y * sin;
    let local_z = -offset.x * sin + offset.y * cos;

    local_x.abs() < half_length + buffer && local_z.abs() < half_thickness + buffer
}

/// Whether a point on the ground plane lies inside the square `[-bound, bound]`.
pub fn map_bounds_contains(x: f32, z: f32, bound: f32) -> bool {
    (-bound..=bound).contains(&x) && (-bound..=bound).contains(&z)
}

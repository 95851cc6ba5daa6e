//! Equi-Angular Cubemap (EAC) projection mapping
//!
//! Identical to the plain cubemap except that each face-local coordinate is
//! remapped through x' = (4/pi) * atan(x) before packing, equalizing sampling
//! density across the face instead of concentrating it toward the edges. This
//! correction is the sole difference from the plain cubemap.

use std::f64::consts::PI;

use super::cubemap;
use super::{direction_to_sphere, sphere_to_direction};

/// Gnomonic face coordinate -> equi-angular face coordinate
fn encode(x: f64) -> f64 {
    (4.0 / PI) * x.atan()
}

/// Equi-angular face coordinate -> gnomonic face coordinate
fn decode(x: f64) -> f64 {
    (x * PI / 4.0).tan()
}

/// (u, v) -> (yaw, pitch)
pub fn uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let (face, a, b) = cubemap::unpack(u, v);
    direction_to_sphere(cubemap::face_to_direction(face, decode(a), decode(b)))
}

/// (yaw, pitch) -> (u, v)
pub fn sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let (face, a, b) = cubemap::direction_to_face(sphere_to_direction(yaw, pitch));
    cubemap::pack(face, encode(a), encode(b))
}

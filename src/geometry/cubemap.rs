//! Cubemap projection mapping
//!
//! Layout: 6x1 horizontal strip, face order [front, right, back, left, up,
//! down], each face occupying a 1/6 horizontal slice. Faces use a gnomonic
//! (tangent-plane) projection with face-local coordinates (a, b) in [-1, 1],
//! a pointing right and b pointing up within the face image. Face selection
//! picks the axis with the largest absolute direction component, preferring
//! front/back, then right/left, then up/down on exact ties.

use super::{direction_to_sphere, sphere_to_direction};

/// The six cube faces in packing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front = 0,
    Right = 1,
    Back = 2,
    Left = 3,
    Up = 4,
    Down = 5,
}

impl Face {
    fn from_index(index: usize) -> Face {
        match index {
            0 => Face::Front,
            1 => Face::Right,
            2 => Face::Back,
            3 => Face::Left,
            4 => Face::Up,
            _ => Face::Down,
        }
    }
}

/// Select the face for a direction vector and project onto its tangent plane
pub(crate) fn direction_to_face(direction: [f64; 3]) -> (Face, f64, f64) {
    let [x, y, z] = direction;
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

    if az >= ax && az >= ay {
        if z >= 0.0 {
            (Face::Front, x / z, y / z)
        } else {
            let d = -z;
            (Face::Back, -x / d, y / d)
        }
    } else if ax >= ay {
        if x >= 0.0 {
            (Face::Right, -z / x, y / x)
        } else {
            let d = -x;
            (Face::Left, z / d, y / d)
        }
    } else if y >= 0.0 {
        (Face::Up, x / y, -z / y)
    } else {
        let d = -y;
        (Face::Down, x / d, z / d)
    }
}

/// Reconstruct a direction vector from a face and its tangent-plane coordinates
pub(crate) fn face_to_direction(face: Face, a: f64, b: f64) -> [f64; 3] {
    match face {
        Face::Front => [a, b, 1.0],
        Face::Right => [1.0, b, -a],
        Face::Back => [-a, b, -1.0],
        Face::Left => [-1.0, b, a],
        Face::Up => [a, 1.0, -b],
        Face::Down => [a, -1.0, b],
    }
}

/// Pack face-local coordinates into the 6x1 strip
pub(crate) fn pack(face: Face, a: f64, b: f64) -> (f64, f64) {
    let a = a.clamp(-1.0, 1.0);
    let b = b.clamp(-1.0, 1.0);
    let u = (face as usize as f64 + (a + 1.0) / 2.0) / 6.0;
    let v = (1.0 - b) / 2.0;
    (u, v)
}

/// Unpack the 6x1 strip into a face and its local coordinates
pub(crate) fn unpack(u: f64, v: f64) -> (Face, f64, f64) {
    let scaled = u * 6.0;
    let index = (scaled.floor() as usize).min(5);
    let a = 2.0 * (scaled - index as f64) - 1.0;
    let b = 1.0 - 2.0 * v;
    (Face::from_index(index), a, b)
}

/// (u, v) -> (yaw, pitch)
pub fn uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let (face, a, b) = unpack(u, v);
    direction_to_sphere(face_to_direction(face, a, b))
}

/// (yaw, pitch) -> (u, v)
pub fn sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let (face, a, b) = direction_to_face(sphere_to_direction(yaw, pitch));
    pack(face, a, b)
}

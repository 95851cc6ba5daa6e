//! Equirectangular projection mapping
//!
//! Yaw maps linearly to the horizontal axis and pitch linearly to the
//! vertical axis: u = 0 is the yaw seam (±180°), v = 0 is the north pole
//! (+90°). Yaw is undefined at the poles; callers sample there at their own
//! tolerance.

use super::wrap_yaw;

/// (u, v) -> (yaw, pitch)
pub fn uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let yaw = (u - 0.5) * 360.0;
    let pitch = (0.5 - v) * 180.0;
    (yaw, pitch)
}

/// (yaw, pitch) -> (u, v)
pub fn sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let u = wrap_yaw(yaw) / 360.0 + 0.5;
    let v = 0.5 - pitch / 180.0;
    (u, v)
}

//! Stereographic "little planet" projection mapping
//!
//! Radius from the projection center follows r = 2 * tan((90° - pitch) / 2)
//! with azimuth = yaw, scaled by 1/4 into the unit square. The north pole
//! sits at the image center and the equator on the inscribed circle; the
//! southern hemisphere diverges toward the frame border and clamps. This is
//! a spectator/output projection - the converter never accepts it as a
//! source.

use super::DEG;

/// (u, v) -> (yaw, pitch)
pub fn uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let dx = u - 0.5;
    let dy = 0.5 - v;
    let rho = (dx * dx + dy * dy).sqrt() * 4.0;
    let yaw = dx.atan2(dy) / DEG;
    let pitch = 90.0 - 2.0 * (rho / 2.0).atan() / DEG;
    (yaw, pitch)
}

/// (yaw, pitch) -> (u, v)
pub fn sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let r = 2.0 * ((90.0 - pitch) / 2.0 * DEG).tan();
    let scaled = r / 4.0;
    let yaw_rad = yaw * DEG;
    (0.5 + scaled * yaw_rad.sin(), 0.5 - scaled * yaw_rad.cos())
}

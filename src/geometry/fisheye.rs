//! Fisheye projection mappings
//!
//! Single fisheye: full-frame equidistant lens centered on the north pole,
//! radius proportional to the polar angle (90° - pitch), with the image
//! circle inscribed in the frame. Pixels outside the circle clamp to the
//! south pole.
//!
//! Dual fisheye: two 180° equidistant hemispheres side by side - the front
//! hemisphere (z >= 0) in the left half, the back hemisphere mirrored in the
//! right half.

use super::{direction_to_sphere, sphere_to_direction, DEG};

/// (u, v) -> (yaw, pitch) for a single full-frame fisheye
pub fn uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let dx = u - 0.5;
    let dy = 0.5 - v;
    let r = (dx * dx + dy * dy).sqrt();
    let yaw = dx.atan2(dy) / DEG;
    let polar = (r / 0.5 * 180.0).min(180.0);
    (yaw, 90.0 - polar)
}

/// (yaw, pitch) -> (u, v) for a single full-frame fisheye
pub fn sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let polar = 90.0 - pitch;
    let r = 0.5 * polar / 180.0;
    let yaw_rad = yaw * DEG;
    (0.5 + r * yaw_rad.sin(), 0.5 - r * yaw_rad.cos())
}

/// (u, v) -> (yaw, pitch) for side-by-side dual fisheye
pub fn dual_uv_to_sphere(u: f64, v: f64) -> (f64, f64) {
    let front = u < 0.5;
    let half_u = if front { u * 2.0 } else { (u - 0.5) * 2.0 };
    let dx = half_u - 0.5;
    let dy = 0.5 - v;
    let r = (dx * dx + dy * dy).sqrt();
    // Each lens covers a 90° polar angle from its optical axis
    let theta = (r / 0.5).min(1.0) * 90.0 * DEG;
    let phi = dy.atan2(dx);
    let lateral = theta.sin();
    let axial = theta.cos();
    let direction = if front {
        [lateral * phi.cos(), lateral * phi.sin(), axial]
    } else {
        // Back lens is mirrored so the seam lines up at |yaw| = 90°
        [-lateral * phi.cos(), lateral * phi.sin(), -axial]
    };
    direction_to_sphere(direction)
}

/// (yaw, pitch) -> (u, v) for side-by-side dual fisheye
pub fn dual_sphere_to_uv(yaw: f64, pitch: f64) -> (f64, f64) {
    let [x, y, z] = sphere_to_direction(yaw, pitch);
    let front = z >= 0.0;
    let (axial, px) = if front { (z, x) } else { (-z, -x) };
    let theta = axial.clamp(-1.0, 1.0).acos();
    let phi = y.atan2(px);
    let r = 0.5 * theta / (90.0 * DEG);
    let half_u = 0.5 + r * phi.cos();
    let half_v = 0.5 - r * phi.sin();
    let u = if front { half_u / 2.0 } else { 0.5 + half_u / 2.0 };
    (u, half_v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_center_is_north_pole() {
        let (_, pitch) = uv_to_sphere(0.5, 0.5);
        assert_eq!(pitch, 90.0);
    }

    #[test]
    fn test_single_reference_points() {
        // Straight up in the image is yaw 0 at the equator radius
        let (yaw, pitch) = uv_to_sphere(0.5, 0.25);
        assert!((yaw - 0.0).abs() < 1e-9);
        assert!((pitch - 0.0).abs() < 1e-9);
        // Straight right in the image is yaw 90
        let (yaw, pitch) = uv_to_sphere(0.75, 0.5);
        assert!((yaw - 90.0).abs() < 1e-9);
        assert!((pitch - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_round_trip_inside_circle() {
        let samples = 13;
        for i in 0..samples {
            for j in 0..samples {
                let u = i as f64 / (samples - 1) as f64;
                let v = j as f64 / (samples - 1) as f64;
                let dx = u - 0.5;
                let dy = 0.5 - v;
                let r = (dx * dx + dy * dy).sqrt();
                // Exclude the undefined-azimuth center and the clamped corners
                if r < 1e-3 || r > 0.48 {
                    continue;
                }
                let (yaw, pitch) = uv_to_sphere(u, v);
                let (back_u, back_v) = sphere_to_uv(yaw, pitch);
                assert!((back_u - u).abs() < 1e-6, "u {} -> {}", u, back_u);
                assert!((back_v - v).abs() < 1e-6, "v {} -> {}", v, back_v);
            }
        }
    }

    #[test]
    fn test_corners_clamp_to_south_pole() {
        let (_, pitch) = uv_to_sphere(0.0, 0.0);
        assert_eq!(pitch, -90.0);
    }

    #[test]
    fn test_dual_lens_centers() {
        // Left lens center looks forward, right lens center looks backward
        let (yaw, pitch) = dual_uv_to_sphere(0.25, 0.5);
        assert!((yaw - 0.0).abs() < 1e-9);
        assert!((pitch - 0.0).abs() < 1e-9);
        let (yaw, pitch) = dual_uv_to_sphere(0.75, 0.5);
        assert!((yaw.abs() - 180.0).abs() < 1e-9);
        assert!((pitch - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_dual_round_trip_inside_circles() {
        let samples = 13;
        for half in 0..2 {
            for i in 0..samples {
                for j in 0..samples {
                    let half_u = i as f64 / (samples - 1) as f64;
                    let v = j as f64 / (samples - 1) as f64;
                    let dx = half_u - 0.5;
                    let dy = 0.5 - v;
                    let r = (dx * dx + dy * dy).sqrt();
                    if r < 1e-3 || r > 0.48 {
                        continue;
                    }
                    let u = if half == 0 { half_u / 2.0 } else { 0.5 + half_u / 2.0 };
                    let (yaw, pitch) = dual_uv_to_sphere(u, v);
                    let (back_u, back_v) = dual_sphere_to_uv(yaw, pitch);
                    assert!((back_u - u).abs() < 1e-6, "half {} u {} -> {}", half, u, back_u);
                    assert!((back_v - v).abs() < 1e-6, "half {} v {} -> {}", half, v, back_v);
                }
            }
        }
    }

    #[test]
    fn test_dual_hemisphere_split() {
        // Forward-facing directions land in the left half
        let (u, _) = dual_sphere_to_uv(30.0, 10.0);
        assert!(u < 0.5);
        // Backward-facing directions land in the right half
        let (u, _) = dual_sphere_to_uv(150.0, 10.0);
        assert!(u >= 0.5);
    }
}

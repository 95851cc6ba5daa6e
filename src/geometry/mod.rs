//! Projection geometry module
//!
//! Pure coordinate mapping between each projection layout and the canonical
//! spherical (yaw, pitch) representation. Yaw and pitch are degrees; yaw is
//! positive to the right (east), pitch is positive upward, and the direction
//! basis is (sin yaw * cos pitch, sin pitch, cos yaw * cos pitch) with +z
//! forward. Normalized (u, v) coordinates run left-to-right and top-to-bottom
//! over [0, 1].

use crate::domain::model::ProjectionKind;
use crate::error::{SphereflowError, SphereflowResult};

pub mod cubemap;
pub mod eac;
pub mod equirect;
pub mod fisheye;
pub mod frame;
pub mod stereographic;

pub use frame::{project_frame, Interpolation};

/// Degrees-to-radians factor
pub(crate) const DEG: f64 = std::f64::consts::PI / 180.0;

/// Normalize a yaw angle into (-180, 180] degrees
pub fn normalize_yaw(yaw: f64) -> f64 {
    let wrapped = (yaw + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Wrap a yaw angle into [-180, 180) degrees
///
/// Used on the (u, v) mapping path so that both seam aliases (+180 and -180)
/// land on u = 0 instead of straddling the left and right frame edges.
pub(crate) fn wrap_yaw(yaw: f64) -> f64 {
    (yaw + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamp a pitch angle into [-90, 90] degrees
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-90.0, 90.0)
}

/// Unit-sphere direction vector for a (yaw, pitch) pair in degrees
pub(crate) fn sphere_to_direction(yaw: f64, pitch: f64) -> [f64; 3] {
    let yaw_rad = yaw * DEG;
    let pitch_rad = clamp_pitch(pitch) * DEG;
    [
        yaw_rad.sin() * pitch_rad.cos(),
        pitch_rad.sin(),
        yaw_rad.cos() * pitch_rad.cos(),
    ]
}

/// (yaw, pitch) in degrees for a direction vector of any magnitude
pub(crate) fn direction_to_sphere(direction: [f64; 3]) -> (f64, f64) {
    let [x, y, z] = direction;
    let norm = (x * x + y * y + z * z).sqrt();
    if norm == 0.0 {
        return (0.0, 0.0);
    }
    let yaw = x.atan2(z) / DEG;
    let pitch = (y / norm).asin() / DEG;
    (normalize_yaw(yaw), clamp_pitch(pitch))
}

/// Map a normalized (u, v) coordinate in the given projection to (yaw, pitch)
///
/// Pure over its numeric inputs: out-of-range coordinates are clamped into
/// the frame rather than rejected. Projections without a spherical mapping
/// (`Flat`, `Unknown`) produce `UnsupportedProjection`.
pub fn to_spherical(kind: ProjectionKind, u: f64, v: f64) -> SphereflowResult<(f64, f64)> {
    let u = u.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    match kind {
        ProjectionKind::Equirectangular => Ok(equirect::uv_to_sphere(u, v)),
        ProjectionKind::Cubemap => Ok(cubemap::uv_to_sphere(u, v)),
        ProjectionKind::Eac => Ok(eac::uv_to_sphere(u, v)),
        ProjectionKind::Fisheye => Ok(fisheye::uv_to_sphere(u, v)),
        ProjectionKind::DualFisheye => Ok(fisheye::dual_uv_to_sphere(u, v)),
        ProjectionKind::Stereographic => Ok(stereographic::uv_to_sphere(u, v)),
        ProjectionKind::Flat | ProjectionKind::Unknown => {
            Err(SphereflowError::UnsupportedProjection {
                projection: kind,
                operation: "to_spherical".to_string(),
            })
        }
    }
}

/// Map a (yaw, pitch) pair to the normalized (u, v) coordinate in the given
/// projection
///
/// Angles are normalized (yaw wrapped, pitch clamped) before mapping, and the
/// result is clamped into [0, 1]. Projections without a spherical mapping
/// (`Flat`, `Unknown`) produce `UnsupportedProjection`.
pub fn from_spherical(kind: ProjectionKind, yaw: f64, pitch: f64) -> SphereflowResult<(f64, f64)> {
    let pitch = clamp_pitch(pitch);
    let result = match kind {
        ProjectionKind::Equirectangular => equirect::sphere_to_uv(yaw, pitch),
        ProjectionKind::Cubemap => cubemap::sphere_to_uv(yaw, pitch),
        ProjectionKind::Eac => eac::sphere_to_uv(yaw, pitch),
        ProjectionKind::Fisheye => fisheye::sphere_to_uv(yaw, pitch),
        ProjectionKind::DualFisheye => fisheye::dual_sphere_to_uv(yaw, pitch),
        ProjectionKind::Stereographic => stereographic::sphere_to_uv(yaw, pitch),
        ProjectionKind::Flat | ProjectionKind::Unknown => {
            return Err(SphereflowError::UnsupportedProjection {
                projection: kind,
                operation: "from_spherical".to_string(),
            })
        }
    };
    let (u, v) = result;
    Ok((u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)))
}

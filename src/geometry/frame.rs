//! In-memory frame reprojection
//!
//! Destination-driven resampling: every target pixel is mapped through the
//! target projection's `to_spherical` and the source projection's
//! `from_spherical`, then the source frame is sampled. Bilinear
//! interpolation is the normative default; test comparisons should be made
//! against bilinear output.

use image::{Rgb, RgbImage};

use crate::domain::model::ProjectionKind;
use crate::error::{SphereflowError, SphereflowResult};

use super::{from_spherical, to_spherical};

/// Source sampling interpolation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Reproject a frame from one projection layout to another
pub fn project_frame(
    source: &RgbImage,
    source_kind: ProjectionKind,
    target_kind: ProjectionKind,
    target_width: u32,
    target_height: u32,
    interpolation: Interpolation,
) -> SphereflowResult<RgbImage> {
    if target_width == 0 || target_height == 0 {
        return Err(SphereflowError::configuration(format!(
            "target dimensions must be positive, got {}x{}",
            target_width, target_height
        )));
    }
    if source.width() == 0 || source.height() == 0 {
        return Err(SphereflowError::configuration(
            "source frame has zero dimensions",
        ));
    }

    let mut target = RgbImage::new(target_width, target_height);
    for py in 0..target_height {
        for px in 0..target_width {
            let u = (px as f64 + 0.5) / target_width as f64;
            let v = (py as f64 + 0.5) / target_height as f64;
            let (yaw, pitch) = to_spherical(target_kind, u, v)?;
            let (su, sv) = from_spherical(source_kind, yaw, pitch)?;
            let pixel = sample(source, su, sv, interpolation);
            target.put_pixel(px, py, pixel);
        }
    }
    Ok(target)
}

/// Sample a frame at a normalized (u, v) coordinate
pub fn sample(source: &RgbImage, u: f64, v: f64, interpolation: Interpolation) -> Rgb<u8> {
    match interpolation {
        Interpolation::Nearest => sample_nearest(source, u, v),
        Interpolation::Bilinear => sample_bilinear(source, u, v),
    }
}

fn sample_nearest(source: &RgbImage, u: f64, v: f64) -> Rgb<u8> {
    let x = ((u * source.width() as f64) as i64).clamp(0, source.width() as i64 - 1) as u32;
    let y = ((v * source.height() as f64) as i64).clamp(0, source.height() as i64 - 1) as u32;
    *source.get_pixel(x, y)
}

fn sample_bilinear(source: &RgbImage, u: f64, v: f64) -> Rgb<u8> {
    let width = source.width() as i64;
    let height = source.height() as i64;
    let fx = u * source.width() as f64 - 0.5;
    let fy = v * source.height() as f64 - 0.5;
    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let wx = fx - x0 as f64;
    let wy = fy - y0 as f64;

    let clamp = |x: i64, max: i64| x.clamp(0, max - 1) as u32;
    let p00 = source.get_pixel(clamp(x0, width), clamp(y0, height));
    let p10 = source.get_pixel(clamp(x0 + 1, width), clamp(y0, height));
    let p01 = source.get_pixel(clamp(x0, width), clamp(y0 + 1, height));
    let p11 = source.get_pixel(clamp(x0 + 1, width), clamp(y0 + 1, height));

    let mut blended = [0u8; 3];
    for channel in 0..3 {
        let top = p00[channel] as f64 * (1.0 - wx) + p10[channel] as f64 * wx;
        let bottom = p01[channel] as f64 * (1.0 - wx) + p11[channel] as f64 * wx;
        blended[channel] = (top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(blended)
}

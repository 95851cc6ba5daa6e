//! Bitrate ladder planning module
//!
//! Produces the ordered set of renditions for adaptive streaming. The ladder
//! is always sorted ascending by resolution with strictly increasing
//! bitrates; other components rely on that ordering when selecting the
//! lowest/highest rendition.

use tracing::{debug, info};

use crate::domain::model::{BitrateLevel, Codec, ProjectionKind, QualityPreset};
use crate::error::{SphereflowError, SphereflowResult};

/// One row of the base ladder table: name, dimensions, base kbps
const BASE_TABLE: [(&str, u32, u32, u32); 7] = [
    ("240p", 426, 240, 400),
    ("360p", 640, 360, 800),
    ("480p", 854, 480, 1500),
    ("720p", 1280, 720, 3000),
    ("1080p", 1920, 1080, 6000),
    ("1440p", 2560, 1440, 12000),
    ("2160p", 3840, 2160, 20000),
];

/// Inputs resolved from configuration that steer codec assignment
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecPolicy {
    pub enable_hevc: bool,
    pub enable_av1: bool,
}

impl CodecPolicy {
    /// Newest enabled codec, used for the top renditions
    fn newest(&self) -> Codec {
        if self.enable_av1 {
            Codec::Av1
        } else if self.enable_hevc {
            Codec::Hevc
        } else {
            Codec::H264
        }
    }
}

/// Bitrate ladder planner
pub struct BitrateLadderPlanner {
    policy: CodecPolicy,
}

impl BitrateLadderPlanner {
    pub fn new(policy: CodecPolicy) -> Self {
        Self { policy }
    }

    /// Plan a ladder for a source resolution and optional motion signal
    ///
    /// The number of levels follows the source resolution tier; bitrates come
    /// from the base table scaled by the quality preset, raised by up to 50%
    /// for high-motion content, with `max_bitrate` pinned at 1.5x the target.
    pub fn plan(
        &self,
        source_width: u32,
        source_height: u32,
        motion_intensity: Option<f64>,
        preset: QualityPreset,
    ) -> SphereflowResult<Vec<BitrateLevel>> {
        if source_width == 0 || source_height == 0 {
            return Err(SphereflowError::configuration(format!(
                "source resolution must be positive, got {}x{}",
                source_width, source_height
            )));
        }

        let level_count = tier_level_count(source_height);
        let motion_factor = 1.0 + 0.5 * motion_intensity.unwrap_or(0.0).clamp(0.0, 1.0);

        // Highest table rows not exceeding the source, lowest-first
        let eligible: Vec<_> = BASE_TABLE
            .iter()
            .filter(|(_, width, height, _)| *width <= source_width.max(426) && *height <= source_height.max(240))
            .collect();
        let start = eligible.len().saturating_sub(level_count);

        let mut levels = Vec::with_capacity(level_count);
        for (index, (name, width, height, base_kbps)) in eligible[start..].iter().enumerate() {
            let bitrate =
                (*base_kbps as f64 * preset.bitrate_factor() * motion_factor).round() as u32;
            let max_bitrate = (bitrate as f64 * 1.5).round() as u32;
            // Lowest rendition stays h264 for device compatibility; the top
            // of the ladder takes the newest enabled codec
            let codec = if index == 0 {
                Codec::H264
            } else if *height >= 1080 {
                self.policy.newest()
            } else {
                Codec::H264
            };
            levels.push(BitrateLevel::new(name, *width, *height, bitrate, max_bitrate, codec));
        }

        debug!(
            source_width,
            source_height,
            motion_factor,
            "planned {} bitrate level(s)",
            levels.len()
        );
        validate_ladder(&levels)?;
        Ok(levels)
    }

    /// Apply the spherical bitrate multiplier to an already planned ladder
    ///
    /// 360° content needs substantially higher bitrates than flat video at
    /// the same perceived quality; the multiplier depends on how efficiently
    /// the projection packs the sphere.
    pub fn apply_projection_multiplier(
        levels: &mut [BitrateLevel],
        projection: ProjectionKind,
    ) {
        let multiplier = projection_bitrate_multiplier(projection);
        for level in levels.iter_mut() {
            level.bitrate = (level.bitrate as f64 * multiplier).round() as u32;
            level.max_bitrate = (level.bitrate as f64 * 1.5).round() as u32;
        }
        info!(%projection, multiplier, "applied spherical bitrate multiplier");
    }
}

/// Number of ladder levels for a source resolution tier
fn tier_level_count(source_height: u32) -> usize {
    match source_height {
        0..=480 => 1,
        481..=720 => 2,
        721..=1080 => 3,
        1081..=1440 => 4,
        _ => 5,
    }
}

/// Recommended bitrate multiplier for a spherical projection
pub fn projection_bitrate_multiplier(projection: ProjectionKind) -> f64 {
    match projection {
        ProjectionKind::Equirectangular => 2.5,
        ProjectionKind::Cubemap | ProjectionKind::Eac => 2.0,
        ProjectionKind::Stereographic => 2.2,
        ProjectionKind::Fisheye
        | ProjectionKind::DualFisheye
        | ProjectionKind::Flat
        | ProjectionKind::Unknown => 2.0,
    }
}

/// Validate the BitrateLevel invariants on a ladder
///
/// Used verbatim for caller-supplied custom ladders, which bypass planning
/// entirely. An invariant violation in a planned ladder is a planner bug.
pub fn validate_ladder(levels: &[BitrateLevel]) -> SphereflowResult<()> {
    if levels.is_empty() {
        return Err(SphereflowError::configuration("ladder has no levels"));
    }
    for level in levels {
        if level.width == 0 || level.height == 0 {
            return Err(SphereflowError::configuration(format!(
                "level {} has zero dimensions",
                level.name
            )));
        }
        if level.max_bitrate < level.bitrate {
            return Err(SphereflowError::configuration(format!(
                "level {} has max_bitrate {} below bitrate {}",
                level.name, level.max_bitrate, level.bitrate
            )));
        }
    }
    for pair in levels.windows(2) {
        if pair[1].bitrate <= pair[0].bitrate {
            return Err(SphereflowError::configuration(format!(
                "ladder bitrates must strictly increase: {} ({} kbps) then {} ({} kbps)",
                pair[0].name, pair[0].bitrate, pair[1].name, pair[1].bitrate
            )));
        }
        if pair[1].width < pair[0].width || pair[1].height < pair[0].height {
            return Err(SphereflowError::configuration(format!(
                "ladder resolutions must not decrease: {} then {}",
                pair[0].name, pair[1].name
            )));
        }
    }
    Ok(())
}

// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SphereflowError, SphereflowResult};


/// 360° video projection layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Full sphere mapped linearly to a 2:1 rectangle
    Equirectangular,
    /// Six cube faces packed into a single frame
    Cubemap,
    /// Equi-Angular Cubemap (cubemap with angular density correction)
    Eac,
    /// Single equidistant fisheye covering the full sphere
    Fisheye,
    /// Two 180° fisheye hemispheres side by side
    DualFisheye,
    /// Stereographic "little planet" (output projection only)
    Stereographic,
    /// Regular rectilinear video (extracted viewport)
    Flat,
    /// Projection could not be determined
    Unknown,
}

impl ProjectionKind {
    /// Parse a projection name as found in metadata tags or CLI arguments
    pub fn parse(value: &str) -> Self {
        let lower = value.trim().to_lowercase();
        if lower.contains("equirect") {
            ProjectionKind::Equirectangular
        } else if lower.contains("eac") {
            ProjectionKind::Eac
        } else if lower.contains("dual") && lower.contains("fisheye") {
            ProjectionKind::DualFisheye
        } else if lower.contains("fisheye") {
            ProjectionKind::Fisheye
        } else if lower.contains("cube") {
            ProjectionKind::Cubemap
        } else if lower.contains("stereographic") || lower.contains("littleplanet") {
            ProjectionKind::Stereographic
        } else if lower.contains("flat") {
            ProjectionKind::Flat
        } else {
            ProjectionKind::Unknown
        }
    }

    /// FFmpeg v360 filter format code for this projection
    pub fn v360_code(&self) -> Option<&'static str> {
        match self {
            ProjectionKind::Equirectangular => Some("e"),
            ProjectionKind::Cubemap => Some("c3x2"),
            ProjectionKind::Eac => Some("eac"),
            ProjectionKind::Fisheye => Some("fisheye"),
            ProjectionKind::DualFisheye => Some("dfisheye"),
            ProjectionKind::Stereographic => Some("sg"),
            ProjectionKind::Flat => Some("flat"),
            ProjectionKind::Unknown => None,
        }
    }

    /// Canonical lowercase name, matching metadata tag values
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Equirectangular => "equirectangular",
            ProjectionKind::Cubemap => "cubemap",
            ProjectionKind::Eac => "eac",
            ProjectionKind::Fisheye => "fisheye",
            ProjectionKind::DualFisheye => "dual_fisheye",
            ProjectionKind::Stereographic => "stereographic",
            ProjectionKind::Flat => "flat",
            ProjectionKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stereoscopic frame layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoKind {
    Mono,
    TopBottom,
    LeftRight,
    FrameSequential,
    Anaglyph,
    Unknown,
}

impl StereoKind {
    /// Parse a stereo mode name as found in metadata tags
    pub fn parse(value: &str) -> Self {
        let lower = value.trim().to_lowercase();
        if lower.contains("top-bottom") || lower.contains("top_bottom") || lower == "tb" {
            StereoKind::TopBottom
        } else if lower.contains("left-right") || lower.contains("left_right") || lower == "lr" {
            StereoKind::LeftRight
        } else if lower.contains("frame") {
            StereoKind::FrameSequential
        } else if lower.contains("anaglyph") {
            StereoKind::Anaglyph
        } else if lower.contains("mono") {
            StereoKind::Mono
        } else {
            StereoKind::Unknown
        }
    }
}

/// Spatial audio formats carried alongside 360° video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialAudioKind {
    None,
    AmbisonicBFormat,
    AmbisonicHoa,
    ObjectBased,
    HeadLocked,
    Binaural,
}

/// Which eye to keep when collapsing a stereoscopic frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Left,
    Right,
}

/// Spherical video metadata container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphericalMetadata {
    pub is_spherical: bool,
    pub projection: ProjectionKind,
    pub stereo_mode: StereoKind,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    pub has_spatial_audio: bool,
    pub audio_type: SpatialAudioKind,
    /// Initial camera orientation from metadata, if present
    pub initial_view: Option<InitialView>,
}

impl SphericalMetadata {
    /// Check if the video is stereoscopic
    pub fn is_stereoscopic(&self) -> bool {
        matches!(
            self.stereo_mode,
            StereoKind::TopBottom
                | StereoKind::LeftRight
                | StereoKind::FrameSequential
                | StereoKind::Anaglyph
        )
    }

    /// Width-over-height aspect ratio, 0.0 when dimensions are unknown
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

impl Default for SphericalMetadata {
    fn default() -> Self {
        Self {
            is_spherical: false,
            projection: ProjectionKind::Unknown,
            stereo_mode: StereoKind::Mono,
            width: 0,
            height: 0,
            has_spatial_audio: false,
            audio_type: SpatialAudioKind::None,
            initial_view: None,
        }
    }
}

/// Initial camera orientation in degrees, from spherical metadata tags
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Viewport extraction configuration - a pure value, no ownership beyond the call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Horizontal look direction in degrees
    pub yaw: f64,
    /// Vertical look direction in degrees
    pub pitch: f64,
    /// Horizontal field of view in degrees, exclusive range (0, 180)
    pub fov_horizontal: f64,
    /// Vertical field of view in degrees, exclusive range (0, 180)
    pub fov_vertical: f64,
    pub output_width: u32,
    pub output_height: u32,
}

impl ViewportConfig {
    /// Create a symmetric-FOV viewport
    pub fn new(yaw: f64, pitch: f64, fov: f64, output_width: u32, output_height: u32) -> Self {
        Self {
            yaw,
            pitch,
            fov_horizontal: fov,
            fov_vertical: fov,
            output_width,
            output_height,
        }
    }

    /// Validate the viewport parameters
    ///
    /// FOV values must stay inside (0°, 179°) to keep the pinhole tangent
    /// finite; a request at 180° is rejected rather than clamped.
    pub fn validate(&self) -> SphereflowResult<()> {
        for (label, fov) in [
            ("fov_horizontal", self.fov_horizontal),
            ("fov_vertical", self.fov_vertical),
        ] {
            if !fov.is_finite() || fov <= 0.0 || fov >= 179.0 {
                return Err(SphereflowError::configuration(format!(
                    "{} must be in (0, 179) degrees, got {}",
                    label, fov
                )));
            }
        }
        if self.output_width == 0 || self.output_height == 0 {
            return Err(SphereflowError::configuration(format!(
                "output dimensions must be positive, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        Ok(())
    }

    /// The six cardinal viewports used for thumbnails and viewport fan-out
    pub fn cardinal_viewports(output_width: u32, output_height: u32) -> Vec<ViewportConfig> {
        [0.0, 90.0, 180.0, -90.0]
            .iter()
            .map(|&yaw| ViewportConfig::new(yaw, 0.0, 90.0, output_width, output_height))
            .chain(
                [90.0, -90.0]
                    .iter()
                    .map(|&pitch| ViewportConfig::new(0.0, pitch, 90.0, output_width, output_height)),
            )
            .collect()
    }
}

/// Video codecs available for renditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    Hevc,
    Av1,
}

impl Codec {
    /// FFmpeg encoder name for this codec
    pub fn encoder_name(&self) -> &'static str {
        match self {
            Codec::H264 => "libx264",
            Codec::Hevc => "libx265",
            Codec::Av1 => "libaom-av1",
        }
    }

    /// RFC 6381 codec string used in HLS/DASH manifests
    pub fn rfc6381(&self) -> &'static str {
        match self {
            Codec::H264 => "avc1.42E01E",
            Codec::Hevc => "hev1.1.6.L93.B0",
            Codec::Av1 => "av01.0.05M.08",
        }
    }

    /// Parse a codec name from CLI arguments or custom ladder input
    pub fn parse(value: &str) -> SphereflowResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "h264" | "avc" => Ok(Codec::H264),
            "hevc" | "h265" => Ok(Codec::Hevc),
            "av1" => Ok(Codec::Av1),
            other => Err(SphereflowError::configuration(format!(
                "unknown codec: {}. Valid codecs: h264, hevc, av1",
                other
            ))),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::H264 => write!(f, "h264"),
            Codec::Hevc => write!(f, "hevc"),
            Codec::Av1 => write!(f, "av1"),
        }
    }
}

/// Encoding quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    Medium,
    High,
    Ultra,
}

impl QualityPreset {
    /// Bitrate scale factor applied to the base ladder table
    pub fn bitrate_factor(&self) -> f64 {
        match self {
            QualityPreset::Low => 0.6,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.4,
            QualityPreset::Ultra => 1.8,
        }
    }

    /// Parse a preset name
    pub fn parse(value: &str) -> SphereflowResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            "ultra" => Ok(QualityPreset::Ultra),
            other => Err(SphereflowError::configuration(format!(
                "unknown quality preset: {}. Valid presets: low, medium, high, ultra",
                other
            ))),
        }
    }
}

/// A single rendition in an adaptive bitrate ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitrateLevel {
    /// Level name, e.g. "720p"
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Target bitrate in kbps
    pub bitrate: u32,
    /// Peak bitrate in kbps, always >= bitrate
    pub max_bitrate: u32,
    pub codec: Codec,
    /// Container format, e.g. "mp4"
    pub container: String,
}

impl BitrateLevel {
    pub fn new(name: &str, width: u32, height: u32, bitrate: u32, max_bitrate: u32, codec: Codec) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            bitrate,
            max_bitrate,
            codec,
            container: "mp4".to_string(),
        }
    }
}

/// Outcome of a single conversion or extraction operation
///
/// Batch operations aggregate one result per unit; a failed unit never
/// aborts its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Operation label, e.g. "convert_equirectangular_to_eac"
    pub operation: String,
    pub success: bool,
    /// Wall-clock processing time in seconds
    pub processing_time: f64,
    pub error_message: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl ConversionResult {
    /// Successful result for a completed operation
    pub fn succeeded(operation: impl Into<String>, elapsed: Duration, output_path: PathBuf) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            processing_time: elapsed.as_secs_f64(),
            error_message: None,
            output_path: Some(output_path),
        }
    }

    /// Failed result carrying the unit's error message
    pub fn failed(operation: impl Into<String>, elapsed: Duration, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            success: false,
            processing_time: elapsed.as_secs_f64(),
            error_message: Some(message.into()),
            output_path: None,
        }
    }
}

/// An FFmpeg filter invocation plan handed to the encoder collaborator
///
/// The core never serializes manifests or touches pixels for external
/// conversions; it describes the geometry as a filter expression plus the
/// spherical metadata tags the output should carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPlan {
    /// Filter expression (`-vf` form, or `-filter_complex` when `complex`)
    pub filter: String,
    /// Whether the expression needs `-filter_complex` instead of `-vf`
    pub complex: bool,
    /// Metadata key/value pairs to set on the output
    pub output_metadata: Vec<(String, String)>,
}

impl FilterPlan {
    /// Simple single-chain video filter
    pub fn simple(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            complex: false,
            output_metadata: Vec::new(),
        }
    }

    /// Filter graph requiring `-filter_complex`
    pub fn complex(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            complex: true,
            output_metadata: Vec::new(),
        }
    }

    /// Attach a spherical metadata tag to the plan output
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.output_metadata.push((key.to_string(), value.to_string()));
        self
    }
}

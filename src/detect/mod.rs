//! Spherical video detection module
//!
//! Decides whether a video is 360° from heterogeneous metadata signals:
//! explicit spherical tags, frame aspect ratio, and filename patterns. Each
//! heuristic contributes independently; detection never fails on malformed
//! input - missing or garbage fields simply do not fire.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::model::{
    InitialView, ProjectionKind, SpatialAudioKind, SphericalMetadata, StereoKind,
};
use crate::ports::ProbeReport;

/// Outcome of spherical detection - immutable once returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_360_video: bool,
    /// Canonical projection name, "unknown" when undecided
    pub projection_type: String,
    /// Detected stereoscopic layout
    pub stereo_mode: StereoKind,
    /// Aggregate confidence in [0, 1]
    pub confidence: f64,
    /// Names of the heuristics that fired
    pub detection_methods: BTreeSet<String>,
}

impl DetectionResult {
    fn negative() -> Self {
        Self {
            is_360_video: false,
            projection_type: ProjectionKind::Unknown.as_str().to_string(),
            stereo_mode: StereoKind::Mono,
            confidence: 0.0,
            detection_methods: BTreeSet::new(),
        }
    }
}

/// One heuristic's contribution
struct Signal {
    method: &'static str,
    confidence: f64,
    projection: ProjectionKind,
}

/// Spherical video detector
pub struct SphericalDetector;

impl SphericalDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run all heuristics over a probe report and aggregate their signals
    ///
    /// The explicit-metadata heuristic short-circuits at confidence 1.0.
    /// Otherwise the result fires if any heuristic fires, the confidence is
    /// the maximum of the firing contributions (never a sum, so two weak
    /// signals cannot outrank one strong one), and the projection guess comes
    /// from the highest-confidence heuristic with aspect-ratio winning ties
    /// over filename.
    pub fn detect(&self, report: &ProbeReport) -> DetectionResult {
        if let Some(explicit) = self.check_spherical_tags(report) {
            debug!("explicit spherical metadata found, short-circuiting");
            let mut methods = BTreeSet::new();
            methods.insert("spherical_metadata".to_string());
            return DetectionResult {
                is_360_video: true,
                projection_type: explicit.projection.as_str().to_string(),
                stereo_mode: explicit.stereo_mode,
                confidence: 1.0,
                detection_methods: methods,
            };
        }

        // Aspect ratio first so it wins projection ties at equal confidence
        let mut signals = Vec::new();
        if let Some(signal) = self.check_aspect_ratio(report) {
            signals.push(signal);
        }
        if let Some(signal) = self.check_filename(report) {
            signals.push(signal);
        }

        if signals.is_empty() {
            return DetectionResult::negative();
        }

        let mut confidence = 0.0;
        let mut projection = ProjectionKind::Unknown;
        let mut methods = BTreeSet::new();
        for signal in &signals {
            methods.insert(signal.method.to_string());
            if signal.confidence > confidence {
                confidence = signal.confidence;
                projection = signal.projection;
            }
        }

        debug!(
            confidence,
            projection = %projection,
            "spherical detection aggregated {} signal(s)",
            signals.len()
        );

        DetectionResult {
            is_360_video: true,
            projection_type: projection.as_str().to_string(),
            stereo_mode: StereoKind::Mono,
            confidence,
            detection_methods: methods,
        }
    }

    /// Build the full spherical metadata record for a probe report
    ///
    /// Combines detection with the frame dimensions, stereo layout, spatial
    /// audio tags, and the initial-view orientation when present. The
    /// spherical flag requires known dimensions - a filename-only signal on
    /// a dimensionless probe stays non-spherical.
    pub fn extract_metadata(&self, report: &ProbeReport) -> SphericalMetadata {
        let detection = self.detect(report);
        let (has_spatial_audio, audio_type) = parse_spatial_audio(report);

        SphericalMetadata {
            is_spherical: detection.is_360_video && report.width > 0 && report.height > 0,
            projection: ProjectionKind::parse(&detection.projection_type),
            stereo_mode: detection.stereo_mode,
            width: report.width,
            height: report.height,
            has_spatial_audio,
            audio_type,
            initial_view: parse_initial_view(report),
        }
    }

    /// Strongest heuristic: recognized spherical metadata tags
    fn check_spherical_tags(&self, report: &ProbeReport) -> Option<ExplicitTags> {
        let mut found = false;
        let mut projection = ProjectionKind::Equirectangular;
        let mut stereo_mode = StereoKind::Mono;

        for (key, value) in &report.tags {
            let key_lower = key.to_lowercase();
            let value_lower = value.to_lowercase();
            if key_lower == "spherical" || key_lower == "spherical-video" {
                if value_lower == "1" || value_lower == "true" {
                    found = true;
                }
            } else if key_lower == "projectiontype" || key_lower == "projection_type" || key_lower == "projection" {
                found = true;
                projection = ProjectionKind::parse(value);
            } else if key_lower == "stereomode" || key_lower == "stereo_mode" {
                stereo_mode = StereoKind::parse(value);
            }
        }

        if found {
            Some(ExplicitTags {
                projection,
                stereo_mode,
            })
        } else {
            None
        }
    }

    /// Aspect-ratio heuristic: 2:1 frames read as equirectangular, square
    /// frames divisible into a 3x2 face grid read weakly as cubemap
    fn check_aspect_ratio(&self, report: &ProbeReport) -> Option<Signal> {
        if report.width == 0 || report.height == 0 {
            return None;
        }
        let ratio = report.width as f64 / report.height as f64;

        if (1.9..=2.1).contains(&ratio) {
            return Some(Signal {
                method: "aspect_ratio",
                confidence: 0.8,
                projection: ProjectionKind::Equirectangular,
            });
        }

        if (1.0..=1.1).contains(&ratio)
            && report.width >= report.height
            && report.width % 3 == 0
            && report.height % 2 == 0
        {
            return Some(Signal {
                method: "aspect_ratio",
                confidence: 0.5,
                projection: ProjectionKind::Cubemap,
            });
        }

        None
    }

    /// Filename heuristic: fixed pattern set, case-insensitive
    fn check_filename(&self, report: &ProbeReport) -> Option<Signal> {
        let filename = report.filename.to_lowercase();
        if filename.is_empty() {
            return None;
        }

        const PATTERNS: [&str; 4] = ["360", "vr", "spherical", "equirect"];
        if !PATTERNS.iter().any(|pattern| filename.contains(pattern)) {
            return None;
        }

        let projection = if filename.contains("cubemap") {
            ProjectionKind::Cubemap
        } else if filename.contains("eac") {
            ProjectionKind::Eac
        } else {
            ProjectionKind::Equirectangular
        };

        Some(Signal {
            method: "filename",
            confidence: 0.6,
            projection,
        })
    }
}

impl Default for SphericalDetector {
    fn default() -> Self {
        Self::new()
    }
}

struct ExplicitTags {
    projection: ProjectionKind,
    stereo_mode: StereoKind,
}

/// Spatial audio flag and format from probe tags
fn parse_spatial_audio(report: &ProbeReport) -> (bool, SpatialAudioKind) {
    for key in ["spatial_audio", "SpatialAudio", "SA3D"] {
        if let Some(value) = report.tag(key) {
            let lower = value.to_lowercase();
            let kind = if lower.contains("hoa") {
                SpatialAudioKind::AmbisonicHoa
            } else if lower.contains("object") {
                SpatialAudioKind::ObjectBased
            } else if lower.contains("binaural") {
                SpatialAudioKind::Binaural
            } else if lower.contains("head") {
                SpatialAudioKind::HeadLocked
            } else {
                SpatialAudioKind::AmbisonicBFormat
            };
            return (true, kind);
        }
    }
    (false, SpatialAudioKind::None)
}

/// Initial camera orientation from probe tags, if any component is present
fn parse_initial_view(report: &ProbeReport) -> Option<InitialView> {
    let read = |key: &str| -> Option<f64> { report.tag(key).and_then(|value| value.parse().ok()) };
    let heading = read("initial_view_heading_degrees");
    let pitch = read("initial_view_pitch_degrees");
    let roll = read("initial_view_roll_degrees");
    if heading.is_none() && pitch.is_none() && roll.is_none() {
        return None;
    }
    Some(InitialView {
        heading: heading.unwrap_or(0.0),
        pitch: pitch.unwrap_or(0.0),
        roll: roll.unwrap_or(0.0),
    })
}

// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::{BitrateLevel, FilterPlan};
use crate::error::SphereflowResult;

/// Structured metadata record returned by the external prober
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Video frame width in pixels, 0 when unknown
    pub width: u32,
    /// Video frame height in pixels, 0 when unknown
    pub height: u32,
    /// Container duration in seconds, 0.0 when unknown
    pub duration_seconds: f64,
    /// Bare filename of the probed path
    pub filename: String,
    /// Container and stream tags, in probe order
    pub tags: Vec<(String, String)>,
}

impl ProbeReport {
    /// Look up a tag value by case-insensitive key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag_key, _)| tag_key.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// Advisory signals from the optional content analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSignals {
    /// Motion intensity in [0, 1]
    pub motion_intensity: f64,
    pub width: u32,
    pub height: u32,
}

/// Port for media file probing
///
/// Probing is opaque: any failure means "cannot determine" and the caller
/// degrades to conservative defaults rather than aborting detection.
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Probe a media file and return its metadata record
    async fn probe(&self, path: &Path) -> SphereflowResult<ProbeReport>;
}

/// Port for the external encoder
///
/// Each method is a single blocking/suspending call producing one output
/// file. The optional deadline cancels only that unit of work; sibling
/// invocations are unaffected.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run a geometry/layout filter plan over the input
    async fn run_filter(
        &self,
        input: &Path,
        output: &Path,
        plan: &FilterPlan,
        deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf>;

    /// Encode one bitrate rendition into the output directory
    async fn encode_rendition(
        &self,
        input: &Path,
        output_dir: &Path,
        level: &BitrateLevel,
        video_id: &str,
        deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf>;

    /// Generate a scrubbing thumbnail track (best-effort collaborator)
    async fn thumbnail_track(
        &self,
        input: &Path,
        output_dir: &Path,
        video_id: &str,
    ) -> SphereflowResult<PathBuf>;
}

/// Port for the optional AI advisory analyzer
///
/// Never required: when absent or failing, planners fall back to static
/// defaults.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Analyze content characteristics of a media file
    async fn analyze(&self, path: &Path) -> SphereflowResult<ContentSignals>;
}

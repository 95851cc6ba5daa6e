//! Adaptive streaming packaging module
//!
//! Orchestrates per-rendition encodes over a planned bitrate ladder and
//! assembles the HLS/DASH manifest data a downstream writer serializes. The
//! builder walks Planning -> Encoding -> Manifesting -> Done: a planning
//! failure aborts with no partial package, per-level encode failures are
//! isolated, and the thumbnail track is best-effort.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::detect::SphericalDetector;
use crate::domain::model::{BitrateLevel, ProjectionKind, QualityPreset};
use crate::error::{SphereflowError, SphereflowResult};
use crate::ladder::{self, BitrateLadderPlanner, CodecPolicy};
use crate::ports::{ContentAnalyzer, Encoder, MediaProber};
use crate::utils::path::rendition_filename;

pub mod dash;
pub mod hls;

pub use dash::DashManifest;
pub use hls::HlsMasterPlaylist;

/// Default segment duration in seconds
pub const DEFAULT_SEGMENT_DURATION: u32 = 6;

/// Requested streaming manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamingFormat {
    Hls,
    Dash,
}

/// Package build phases, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildPhase {
    Planning,
    Encoding,
    Manifesting,
    Done,
}

impl BuildPhase {
    fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::Planning => "planning",
            BuildPhase::Encoding => "encoding",
            BuildPhase::Manifesting => "manifesting",
            BuildPhase::Done => "done",
        }
    }
}

/// Complete adaptive streaming package - a result accumulator populated
/// field by field as each sub-step succeeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingPackage {
    pub video_id: String,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    /// Segment duration in seconds
    pub segment_duration: u32,
    /// Renditions that encoded successfully, lowest to highest
    pub bitrate_levels: Vec<BitrateLevel>,
    pub hls_playlist: Option<HlsMasterPlaylist>,
    pub dash_manifest: Option<DashManifest>,
    pub thumbnail_track: Option<PathBuf>,
}

/// Adaptive streaming package builder
pub struct StreamingPackageBuilder {
    prober: Arc<dyn MediaProber>,
    encoder: Arc<dyn Encoder>,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
    codec_policy: CodecPolicy,
    preset: QualityPreset,
    segment_duration: u32,
    parallelism: usize,
    encode_deadline: Option<Duration>,
}

impl StreamingPackageBuilder {
    pub fn new(prober: Arc<dyn MediaProber>, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            prober,
            encoder,
            analyzer: None,
            codec_policy: CodecPolicy::default(),
            preset: QualityPreset::Medium,
            segment_duration: DEFAULT_SEGMENT_DURATION,
            parallelism: num_cpus::get(),
            encode_deadline: None,
        }
    }

    /// Attach the optional AI advisory analyzer
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_codec_policy(mut self, policy: CodecPolicy) -> Self {
        self.codec_policy = policy;
        self
    }

    pub fn with_preset(mut self, preset: QualityPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_segment_duration(mut self, seconds: u32) -> Self {
        self.segment_duration = seconds.max(1);
        self
    }

    /// Cap the number of concurrent rendition encodes
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Per-rendition encode deadline; an expired unit fails alone
    pub fn with_encode_deadline(mut self, deadline: Duration) -> Self {
        self.encode_deadline = Some(deadline);
        self
    }

    /// Create an adaptive streaming package from a source video
    ///
    /// A custom ladder bypasses planning and is used verbatim after
    /// invariant validation. At least one rendition must encode or the whole
    /// operation fails with `NoRenditionsProduced`.
    pub async fn create_adaptive_stream(
        &self,
        video_path: &Path,
        output_dir: &Path,
        video_id: Option<&str>,
        formats: &[StreamingFormat],
        custom_ladder: Option<Vec<BitrateLevel>>,
    ) -> SphereflowResult<StreamingPackage> {
        let video_id = video_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| derive_video_id(video_path));

        // Planning: probe failures abort with no partial package
        info!(phase = BuildPhase::Planning.as_str(), %video_id, "creating adaptive stream");
        let probe = self.prober.probe(video_path).await?;
        let ladder = match custom_ladder {
            Some(levels) => {
                ladder::validate_ladder(&levels)?;
                debug!(levels = levels.len(), "using caller-supplied bitrate ladder");
                levels
            }
            None => self.plan_ladder(video_path, &probe).await?,
        };

        // Encoding: independent per-level fan-out with indexed result slots
        info!(
            phase = BuildPhase::Encoding.as_str(),
            levels = ladder.len(),
            "encoding renditions"
        );
        let renditions = self
            .encode_renditions(video_path, output_dir, &video_id, &ladder)
            .await;
        if renditions.is_empty() {
            return Err(SphereflowError::NoRenditionsProduced {
                video_id,
                attempted: ladder.len(),
            });
        }

        // Manifesting: only over renditions that succeeded
        info!(
            phase = BuildPhase::Manifesting.as_str(),
            renditions = renditions.len(),
            "assembling manifest data"
        );
        let hls_playlist = formats.contains(&StreamingFormat::Hls).then(|| {
            HlsMasterPlaylist::from_renditions(
                output_dir,
                &video_id,
                &renditions,
                self.segment_duration,
            )
        });
        let dash_manifest = formats.contains(&StreamingFormat::Dash).then(|| {
            DashManifest::from_renditions(
                output_dir,
                &video_id,
                &renditions,
                probe.duration_seconds,
                self.segment_duration,
            )
        });

        // Thumbnail track failure is logged, never fatal
        let thumbnail_track = match self
            .encoder
            .thumbnail_track(video_path, output_dir, &video_id)
            .await
        {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(%error, "thumbnail track generation failed, continuing without");
                None
            }
        };

        info!(phase = BuildPhase::Done.as_str(), %video_id, "adaptive stream complete");
        Ok(StreamingPackage {
            video_id,
            source_path: video_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            segment_duration: self.segment_duration,
            bitrate_levels: renditions.into_iter().map(|(level, _)| level).collect(),
            hls_playlist,
            dash_manifest,
            thumbnail_track,
        })
    }

    /// Plan the ladder from probe data, the optional advisory signal, and
    /// the spherical bitrate multiplier
    async fn plan_ladder(
        &self,
        video_path: &Path,
        probe: &crate::ports::ProbeReport,
    ) -> SphereflowResult<Vec<BitrateLevel>> {
        let motion = match &self.analyzer {
            Some(analyzer) => match analyzer.analyze(video_path).await {
                Ok(signals) => Some(signals.motion_intensity),
                Err(error) => {
                    warn!(%error, "content analysis failed, planning with static defaults");
                    None
                }
            },
            None => None,
        };

        let planner = BitrateLadderPlanner::new(self.codec_policy);
        let mut levels = planner.plan(probe.width, probe.height, motion, self.preset)?;

        let detection = SphericalDetector::new().detect(probe);
        if detection.is_360_video {
            let projection = ProjectionKind::parse(&detection.projection_type);
            BitrateLadderPlanner::apply_projection_multiplier(&mut levels, projection);
        }
        Ok(levels)
    }

    /// Encode all ladder levels, preserving ladder order in the output
    ///
    /// Returns only the successful (level, output path) pairs. Each
    /// rendition writes to a distinct filename derived from the video id and
    /// level name, so concurrent encodes never collide on the filesystem.
    async fn encode_renditions(
        &self,
        video_path: &Path,
        output_dir: &Path,
        video_id: &str,
        ladder: &[BitrateLevel],
    ) -> Vec<(BitrateLevel, PathBuf)> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut join_set = JoinSet::new();
        for (index, level) in ladder.iter().cloned().enumerate() {
            let encoder = Arc::clone(&self.encoder);
            let semaphore = Arc::clone(&semaphore);
            let input = video_path.to_path_buf();
            let output_dir = output_dir.to_path_buf();
            let video_id = video_id.to_string();
            let deadline = self.encode_deadline;
            join_set.spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                let outcome = encoder
                    .encode_rendition(&input, &output_dir, &level, &video_id, deadline)
                    .await;
                (index, level, outcome)
            });
        }

        let mut slots: Vec<Option<(BitrateLevel, PathBuf)>> = vec![None; ladder.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, level, Ok(path))) => {
                    info!(level = %level.name, output = %path.display(), "rendition encoded");
                    slots[index] = Some((level, path));
                }
                Ok((index, level, Err(error))) => {
                    warn!(level = %level.name, %error, "rendition encode failed, siblings continue");
                    slots[index] = None;
                }
                Err(join_error) => warn!(%join_error, "rendition encode task panicked"),
            }
        }

        slots.into_iter().flatten().collect()
    }
}

/// Expected output filename for a rendition, exposed for collaborators
pub fn rendition_output_path(output_dir: &Path, video_id: &str, level: &BitrateLevel) -> PathBuf {
    output_dir.join(rendition_filename(video_id, &level.name, &level.container))
}

fn derive_video_id(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string())
}

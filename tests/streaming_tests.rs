//! Orchestration integration tests with in-memory fake collaborators

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sphereflow::convert::ProjectionConverter;
use sphereflow::domain::model::FilterPlan;
use sphereflow::error::{SphereflowError, SphereflowResult};
use sphereflow::ladder::CodecPolicy;
use sphereflow::ports::{ContentAnalyzer, ContentSignals, Encoder, MediaProber, ProbeReport};
use sphereflow::streaming::{StreamingFormat, StreamingPackageBuilder};
use sphereflow::{BitrateLevel, Codec, ProjectionKind, QualityPreset};

/// Fake prober returning a fixed report
struct FakeProber {
    report: ProbeReport,
    fail: bool,
}

impl FakeProber {
    fn for_video(width: u32, height: u32, filename: &str) -> Self {
        Self {
            report: ProbeReport {
                width,
                height,
                duration_seconds: 120.0,
                filename: filename.to_string(),
                tags: Vec::new(),
            },
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            report: ProbeReport::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, _path: &Path) -> SphereflowResult<ProbeReport> {
        if self.fail {
            return Err(SphereflowError::probe("fake probe failure"));
        }
        Ok(self.report.clone())
    }
}

/// Fake encoder with injectable per-unit failures
#[derive(Default)]
struct FakeEncoder {
    /// Level names whose rendition encodes fail
    fail_levels: HashSet<String>,
    /// Fail any filter plan whose expression contains this needle
    fail_filter_containing: Option<String>,
    fail_thumbnails: bool,
    /// Per-unit artificial latency, for completion-order scrambling
    stagger: Option<Duration>,
    calls: AtomicUsize,
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn run_filter(
        &self,
        input: &Path,
        output: &Path,
        plan: &FilterPlan,
        _deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stagger) = self.stagger {
            // Earlier submissions sleep longer, so completion order inverts
            let delay = stagger * (8u32.saturating_sub(call_index as u32));
            tokio::time::sleep(delay).await;
        }
        if let Some(needle) = &self.fail_filter_containing {
            if plan.filter.contains(needle.as_str()) {
                return Err(SphereflowError::encoding(format!(
                    "fake failure for filter on {}",
                    input.display()
                )));
            }
        }
        Ok(output.to_path_buf())
    }

    async fn encode_rendition(
        &self,
        _input: &Path,
        output_dir: &Path,
        level: &BitrateLevel,
        video_id: &str,
        _deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf> {
        if self.fail_levels.contains(&level.name) {
            return Err(SphereflowError::encoding(format!(
                "fake encode failure for {}",
                level.name
            )));
        }
        Ok(output_dir.join(format!("{}_{}.{}", video_id, level.name, level.container)))
    }

    async fn thumbnail_track(
        &self,
        _input: &Path,
        output_dir: &Path,
        video_id: &str,
    ) -> SphereflowResult<PathBuf> {
        if self.fail_thumbnails {
            return Err(SphereflowError::encoding("fake thumbnail failure"));
        }
        Ok(output_dir.join(format!("{}_thumbnails.jpg", video_id)))
    }
}

/// Fake analyzer returning a fixed motion signal
struct FakeAnalyzer {
    motion: f64,
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _path: &Path) -> SphereflowResult<ContentSignals> {
        Ok(ContentSignals {
            motion_intensity: self.motion,
            width: 1920,
            height: 1080,
        })
    }
}

fn three_level_ladder() -> Vec<BitrateLevel> {
    vec![
        BitrateLevel::new("480p", 854, 480, 1500, 2250, Codec::H264),
        BitrateLevel::new("720p", 1280, 720, 3000, 4500, Codec::H264),
        BitrateLevel::new("1080p", 1920, 1080, 6000, 9000, Codec::H264),
    ]
}

#[tokio::test]
async fn test_batch_conversion_preserves_input_order() {
    // EAC is forced to fail and completion order is scrambled; the result
    // sequence must still match the input target order
    let encoder = Arc::new(FakeEncoder {
        fail_filter_containing: Some(":eac".to_string()),
        stagger: Some(Duration::from_millis(20)),
        ..Default::default()
    });
    let converter = ProjectionConverter::new(encoder).with_parallelism(3);

    let targets = [
        ProjectionKind::Eac,
        ProjectionKind::Stereographic,
        ProjectionKind::Cubemap,
    ];
    let results = converter
        .batch_convert(
            Path::new("/media/dive_360.mp4"),
            Path::new("/out"),
            ProjectionKind::Equirectangular,
            &targets,
            true,
            None,
        )
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].operation.ends_with("_to_eac"));
    assert!(results[1].operation.ends_with("_to_stereographic"));
    assert!(results[2].operation.ends_with("_to_cubemap"));
    assert!(!results[0].success);
    assert!(results[1].success);
    assert!(results[2].success);
    assert_eq!(
        results[2].output_path.as_deref(),
        Some(Path::new("/out/dive_360_cubemap.mp4"))
    );
}

#[tokio::test]
async fn test_batch_conversion_sequential_matches_parallel_order() {
    let encoder = Arc::new(FakeEncoder::default());
    let converter = ProjectionConverter::new(encoder).with_parallelism(2);
    let targets = [ProjectionKind::Cubemap, ProjectionKind::Eac];

    let results = converter
        .batch_convert(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            ProjectionKind::Equirectangular,
            &targets,
            false,
            None,
        )
        .await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result.success));
    assert!(results[0].operation.ends_with("_to_cubemap"));
    assert!(results[1].operation.ends_with("_to_eac"));
}

#[tokio::test]
async fn test_batch_isolates_unsupported_source_per_unit() {
    // A stereographic source is a caller bug, but inside a batch it must
    // fill its slot, not abort the call
    let encoder = Arc::new(FakeEncoder::default());
    let converter = ProjectionConverter::new(encoder);
    let results = converter
        .batch_convert(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            ProjectionKind::Stereographic,
            &[ProjectionKind::Cubemap],
            true,
            None,
        )
        .await;
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert!(results[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("Unsupported projection"));
}

#[tokio::test]
async fn test_package_partial_success_keeps_survivors() {
    let prober = Arc::new(FakeProber::for_video(1920, 1080, "clip.mp4"));
    let mut fail_levels = HashSet::new();
    fail_levels.insert("720p".to_string());
    let encoder = Arc::new(FakeEncoder {
        fail_levels,
        ..Default::default()
    });

    let package = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            Some("clip"),
            &[StreamingFormat::Hls, StreamingFormat::Dash],
            Some(three_level_ladder()),
        )
        .await
        .unwrap();

    // Exactly the two surviving levels, still in ladder order
    assert_eq!(package.bitrate_levels.len(), 2);
    assert_eq!(package.bitrate_levels[0].name, "480p");
    assert_eq!(package.bitrate_levels[1].name, "1080p");

    // Manifest data only covers the survivors
    let playlist = package.hls_playlist.as_ref().unwrap();
    assert_eq!(playlist.variants.len(), 2);
    assert!(playlist.variants.iter().all(|variant| variant.name != "720p"));
    let manifest = package.dash_manifest.as_ref().unwrap();
    assert_eq!(manifest.representations.len(), 2);
    assert_eq!(manifest.duration_seconds, 120.0);
}

#[tokio::test]
async fn test_package_total_failure_raises() {
    let prober = Arc::new(FakeProber::for_video(1920, 1080, "clip.mp4"));
    let fail_levels: HashSet<String> = ["480p", "720p", "1080p"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let encoder = Arc::new(FakeEncoder {
        fail_levels,
        ..Default::default()
    });

    let outcome = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            Some("clip"),
            &[StreamingFormat::Hls],
            Some(three_level_ladder()),
        )
        .await;

    match outcome {
        Err(SphereflowError::NoRenditionsProduced { video_id, attempted }) => {
            assert_eq!(video_id, "clip");
            assert_eq!(attempted, 3);
        }
        other => panic!("expected NoRenditionsProduced, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_probe_failure_aborts_planning() {
    let prober = Arc::new(FakeProber::failing());
    let encoder = Arc::new(FakeEncoder::default());

    let outcome = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            None,
            &[StreamingFormat::Hls],
            None,
        )
        .await;
    assert!(matches!(outcome, Err(SphereflowError::Probe { .. })));
}

#[tokio::test]
async fn test_thumbnail_failure_is_not_fatal() {
    let prober = Arc::new(FakeProber::for_video(1920, 1080, "clip.mp4"));
    let encoder = Arc::new(FakeEncoder {
        fail_thumbnails: true,
        ..Default::default()
    });

    let package = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            Some("clip"),
            &[StreamingFormat::Hls],
            Some(three_level_ladder()),
        )
        .await
        .unwrap();
    assert!(package.thumbnail_track.is_none());
    assert_eq!(package.bitrate_levels.len(), 3);
}

#[tokio::test]
async fn test_planned_ladder_spherical_source_gets_multiplier() {
    // A 2:1 4K source with no explicit tags detects as equirectangular and
    // the planned ladder carries the 2.5x spherical multiplier
    let prober = Arc::new(FakeProber::for_video(3840, 1920, "dive_360.mp4"));
    let encoder = Arc::new(FakeEncoder::default());

    let package = StreamingPackageBuilder::new(prober, encoder)
        .with_codec_policy(CodecPolicy {
            enable_hevc: true,
            enable_av1: false,
        })
        .with_preset(QualityPreset::Medium)
        .create_adaptive_stream(
            Path::new("/media/dive_360.mp4"),
            Path::new("/out"),
            None,
            &[StreamingFormat::Hls],
            None,
        )
        .await
        .unwrap();

    assert_eq!(package.video_id, "dive_360");
    // A 1920-tall source plans the full five-level tier
    assert_eq!(package.bitrate_levels.len(), 5);
    // Lowest level is 360p at base 800 kbps scaled by the 2.5x multiplier
    assert_eq!(package.bitrate_levels[0].name, "360p");
    assert_eq!(package.bitrate_levels[0].bitrate, 2000);
    for pair in package.bitrate_levels.windows(2) {
        assert!(pair[0].bitrate < pair[1].bitrate);
        assert!(pair[0].width <= pair[1].width);
    }
}

#[tokio::test]
async fn test_motion_signal_raises_planned_bitrates() {
    let flat_prober = Arc::new(FakeProber::for_video(1920, 1080, "talk.mp4"));
    let calm_encoder = Arc::new(FakeEncoder::default());
    let calm = StreamingPackageBuilder::new(flat_prober, calm_encoder)
        .with_analyzer(Arc::new(FakeAnalyzer { motion: 0.0 }))
        .create_adaptive_stream(
            Path::new("/media/talk.mp4"),
            Path::new("/out"),
            None,
            &[],
            None,
        )
        .await
        .unwrap();

    let busy_prober = Arc::new(FakeProber::for_video(1920, 1080, "race.mp4"));
    let busy_encoder = Arc::new(FakeEncoder::default());
    let busy = StreamingPackageBuilder::new(busy_prober, busy_encoder)
        .with_analyzer(Arc::new(FakeAnalyzer { motion: 1.0 }))
        .create_adaptive_stream(
            Path::new("/media/race.mp4"),
            Path::new("/out"),
            None,
            &[],
            None,
        )
        .await
        .unwrap();

    assert_eq!(calm.bitrate_levels.len(), busy.bitrate_levels.len());
    for (calm_level, busy_level) in calm.bitrate_levels.iter().zip(busy.bitrate_levels.iter()) {
        assert_eq!(
            busy_level.bitrate,
            (calm_level.bitrate as f64 * 1.5).round() as u32
        );
        assert_eq!(
            busy_level.max_bitrate,
            (busy_level.bitrate as f64 * 1.5).round() as u32
        );
    }
}

#[tokio::test]
async fn test_invalid_custom_ladder_rejected_before_encoding() {
    let prober = Arc::new(FakeProber::for_video(1920, 1080, "clip.mp4"));
    let encoder = Arc::new(FakeEncoder::default());

    let bad_ladder = vec![
        BitrateLevel::new("a", 1920, 1080, 4000, 6000, Codec::H264),
        BitrateLevel::new("b", 854, 480, 1500, 2250, Codec::H264),
    ];
    let outcome = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            None,
            &[StreamingFormat::Hls],
            Some(bad_ladder),
        )
        .await;
    assert!(matches!(outcome, Err(SphereflowError::Configuration { .. })));
}

#[tokio::test]
async fn test_formats_control_manifest_presence() {
    let prober = Arc::new(FakeProber::for_video(1920, 1080, "clip.mp4"));
    let encoder = Arc::new(FakeEncoder::default());

    let package = StreamingPackageBuilder::new(prober, encoder)
        .create_adaptive_stream(
            Path::new("/media/clip.mp4"),
            Path::new("/out"),
            Some("clip"),
            &[StreamingFormat::Dash],
            Some(three_level_ladder()),
        )
        .await
        .unwrap();
    assert!(package.hls_playlist.is_none());
    assert!(package.dash_manifest.is_some());
    assert_eq!(package.segment_duration, 6);
}

//! Command execution - wires adapters into the core operations

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::adapters::{FfmpegEncoder, FfprobeProber};
use crate::cli::args::*;
use crate::config::SphereflowConfig;
use crate::convert::ProjectionConverter;
use crate::detect::SphericalDetector;
use crate::domain::model::{
    ConversionResult, Eye, ProjectionKind, QualityPreset, StereoKind, ViewportConfig,
};
use crate::ladder::BitrateLadderPlanner;
use crate::ports::MediaProber;
use crate::stereo::StereoProcessor;
use crate::streaming::{StreamingFormat, StreamingPackageBuilder};
use crate::viewport::ViewportExtractor;

/// Execute the detect command
pub async fn execute_detect(args: DetectArgs, config: &SphereflowConfig) -> Result<()> {
    let prober = make_prober(config)?;
    let report = prober.probe(Path::new(&args.input)).await?;
    let detector = SphericalDetector::new();
    let result = detector.detect(&report);
    let metadata = detector.extract_metadata(&report);

    if args.json {
        let combined = serde_json::json!({
            "detection": result,
            "metadata": metadata,
        });
        println!("{}", serde_json::to_string_pretty(&combined)?);
    } else {
        println!("360 video:   {}", result.is_360_video);
        println!("projection:  {}", result.projection_type);
        println!("stereo mode: {:?}", result.stereo_mode);
        println!("confidence:  {:.2}", result.confidence);
        println!(
            "methods:     {}",
            result
                .detection_methods
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("resolution:  {}x{}", metadata.width, metadata.height);
        if metadata.has_spatial_audio {
            println!("audio:       {:?}", metadata.audio_type);
        }
    }
    Ok(())
}

/// Execute the convert command
pub async fn execute_convert(args: ConvertArgs, config: &SphereflowConfig) -> Result<()> {
    let input = PathBuf::from(&args.input);
    let source_kind = resolve_source_kind(args.from.as_deref(), &input, config).await?;
    let target_kind = parse_projection_arg(&args.to)?;
    let output = match args.output {
        Some(output) => PathBuf::from(output),
        None => default_output_path(&input, target_kind),
    };
    let resolution = match (args.width, args.height) {
        (Some(width), Some(height)) => Some((width, height)),
        (None, None) => None,
        _ => return Err(anyhow!("--width and --height must be given together")),
    };

    let converter = ProjectionConverter::new(Arc::new(make_encoder(config)?))
        .with_parallelism(config.effective_parallelism());
    let result = converter
        .convert(
            &input,
            &output,
            source_kind,
            target_kind,
            resolution,
            args.deadline.map(Duration::from_secs),
        )
        .await?;
    report_result(&result)
}

/// Execute the batch-convert command
pub async fn execute_batch_convert(args: BatchConvertArgs, config: &SphereflowConfig) -> Result<()> {
    let input = PathBuf::from(&args.input);
    let source_kind = resolve_source_kind(args.from.as_deref(), &input, config).await?;
    let targets = args
        .targets
        .iter()
        .map(|target| parse_projection_arg(target))
        .collect::<Result<Vec<_>>>()?;
    if targets.is_empty() {
        return Err(anyhow!("no conversion targets given"));
    }

    let converter = ProjectionConverter::new(Arc::new(make_encoder(config)?))
        .with_parallelism(config.effective_parallelism());
    let results = converter
        .batch_convert(
            &input,
            Path::new(&args.output_dir),
            source_kind,
            &targets,
            !args.sequential,
            args.deadline.map(Duration::from_secs),
        )
        .await;

    let mut failures = 0;
    for result in &results {
        if result.success {
            println!(
                "ok   {} ({:.2}s)",
                result.operation, result.processing_time
            );
        } else {
            failures += 1;
            println!(
                "fail {} ({})",
                result.operation,
                result.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if failures == results.len() {
        return Err(anyhow!("all {} conversions failed", failures));
    }
    Ok(())
}

/// Execute the viewport command
pub async fn execute_viewport(args: ViewportArgs, config: &SphereflowConfig) -> Result<()> {
    let input = PathBuf::from(&args.input);
    let source_kind = resolve_source_kind(args.from.as_deref(), &input, config).await?;
    let viewport = ViewportConfig {
        yaw: args.yaw,
        pitch: args.pitch,
        fov_horizontal: args.fov,
        fov_vertical: args.fov_vertical.unwrap_or(args.fov),
        output_width: args.width,
        output_height: args.height,
    };

    let encoder = make_encoder(config)?;
    let extractor = ViewportExtractor::new(&encoder);
    let result = extractor
        .extract(source_kind, &input, Path::new(&args.output), &viewport, None)
        .await?;
    report_result(&result)
}

/// Execute the plan command
pub async fn execute_plan(args: PlanArgs, config: &SphereflowConfig) -> Result<()> {
    let preset = QualityPreset::parse(&args.preset)?;
    let planner = BitrateLadderPlanner::new(config.codec_policy());
    let mut levels = planner.plan(args.width, args.height, args.motion, preset)?;

    if let Some(projection) = args.projection.as_deref() {
        let projection = parse_projection_arg(projection)?;
        BitrateLadderPlanner::apply_projection_multiplier(&mut levels, projection);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&levels)?);
    } else {
        for level in &levels {
            println!(
                "{:>6}  {:>4}x{:<4}  {:>6} kbps (max {:>6})  {}",
                level.name, level.width, level.height, level.bitrate, level.max_bitrate, level.codec
            );
        }
    }
    Ok(())
}

/// Execute the stream command
pub async fn execute_stream(args: StreamArgs, config: &SphereflowConfig) -> Result<()> {
    let formats = args
        .formats
        .iter()
        .map(|format| match format.trim().to_lowercase().as_str() {
            "hls" => Ok(StreamingFormat::Hls),
            "dash" => Ok(StreamingFormat::Dash),
            other => Err(anyhow!("unknown streaming format: {}", other)),
        })
        .collect::<Result<Vec<_>>>()?;
    let preset = match args.preset.as_deref() {
        Some(preset) => QualityPreset::parse(preset)?,
        None => config.quality_preset,
    };

    let mut builder = StreamingPackageBuilder::new(
        Arc::new(make_prober(config)?),
        Arc::new(make_encoder(config)?),
    )
    .with_codec_policy(config.codec_policy())
    .with_preset(preset)
    .with_segment_duration(config.segment_duration)
    .with_parallelism(config.effective_parallelism());
    if let Some(deadline) = args.deadline {
        builder = builder.with_encode_deadline(Duration::from_secs(deadline));
    }

    let package = builder
        .create_adaptive_stream(
            Path::new(&args.input),
            Path::new(&args.output_dir),
            args.video_id.as_deref(),
            &formats,
            None,
        )
        .await?;

    info!(video_id = %package.video_id, "streaming package ready");
    println!("video id:      {}", package.video_id);
    println!("renditions:    {}", package.bitrate_levels.len());
    for level in &package.bitrate_levels {
        println!("  {:>6}  {}x{}  {} kbps", level.name, level.width, level.height, level.bitrate);
    }
    if let Some(playlist) = &package.hls_playlist {
        println!("hls playlist:  {}", playlist.path.display());
    }
    if let Some(manifest) = &package.dash_manifest {
        println!("dash manifest: {}", manifest.path.display());
    }
    if let Some(thumbnails) = &package.thumbnail_track {
        println!("thumbnails:    {}", thumbnails.display());
    }
    Ok(())
}

/// Execute the stereo command
pub async fn execute_stereo(args: StereoArgs, config: &SphereflowConfig) -> Result<()> {
    let layout = StereoKind::parse(&args.layout);
    if layout == StereoKind::Unknown {
        return Err(anyhow!("unknown stereo layout: {}", args.layout));
    }
    let projection = parse_projection_arg(&args.projection)?;

    let encoder = make_encoder(config)?;
    let processor = StereoProcessor::new(&encoder);
    let input = PathBuf::from(&args.input);
    let output = Path::new(&args.output);

    let result = match args.to_layout.as_deref() {
        Some(to_layout) => {
            let to = StereoKind::parse(to_layout);
            if to == StereoKind::Unknown {
                return Err(anyhow!("unknown stereo layout: {}", to_layout));
            }
            processor
                .convert_layout(&input, output, layout, to, projection, None)
                .await?
        }
        None => {
            let eye = match args.eye.to_lowercase().as_str() {
                "left" => Eye::Left,
                "right" => Eye::Right,
                other => return Err(anyhow!("unknown eye: {}", other)),
            };
            processor
                .to_mono(&input, output, layout, eye, projection, None)
                .await?
        }
    };
    report_result(&result)
}

/// Build the prober adapter, honoring a configured binary path
fn make_prober(config: &SphereflowConfig) -> Result<FfprobeProber> {
    match &config.ffprobe_path {
        Some(path) => Ok(FfprobeProber::with_binary(path.clone())),
        None => FfprobeProber::new().context("locating ffprobe"),
    }
}

/// Build the encoder adapter, honoring a configured binary path
fn make_encoder(config: &SphereflowConfig) -> Result<FfmpegEncoder> {
    match &config.ffmpeg_path {
        Some(path) => Ok(FfmpegEncoder::with_binary(path.clone())),
        None => FfmpegEncoder::new().context("locating ffmpeg"),
    }
}

/// Parse an explicitly user-supplied projection name
fn parse_projection_arg(value: &str) -> Result<ProjectionKind> {
    match ProjectionKind::parse(value) {
        ProjectionKind::Unknown => Err(anyhow!("unknown projection: {}", value)),
        kind => Ok(kind),
    }
}

/// Resolve the source projection from an argument or by probing the input
async fn resolve_source_kind(
    from: Option<&str>,
    input: &Path,
    config: &SphereflowConfig,
) -> Result<ProjectionKind> {
    if let Some(from) = from {
        return parse_projection_arg(from);
    }

    let prober = make_prober(config)?;
    let report = prober.probe(input).await?;
    let detection = SphericalDetector::new().detect(&report);
    let kind = ProjectionKind::parse(&detection.projection_type);
    if !detection.is_360_video || kind == ProjectionKind::Unknown {
        warn!("could not determine source projection, assuming equirectangular");
        return Ok(ProjectionKind::Equirectangular);
    }
    info!(projection = %kind, confidence = detection.confidence, "detected source projection");
    Ok(kind)
}

/// Default output filename for a single conversion
fn default_output_path(input: &Path, target_kind: ProjectionKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_{}.mp4", stem, target_kind))
}

/// Print a conversion result, failing the command when the unit failed
fn report_result(result: &ConversionResult) -> Result<()> {
    if result.success {
        println!(
            "ok   {} ({:.2}s) -> {}",
            result.operation,
            result.processing_time,
            result
                .output_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default()
        );
        Ok(())
    } else {
        Err(anyhow!(
            "{} failed: {}",
            result.operation,
            result.error_message.as_deref().unwrap_or("unknown error")
        ))
    }
}

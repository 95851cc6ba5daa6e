//! FFmpeg execution adapter
//!
//! Runs geometry filter plans, rendition encodes, and thumbnail extraction
//! as ffmpeg subprocesses. Each invocation is one blocking unit of work; an
//! optional deadline cancels only that unit.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::model::{BitrateLevel, FilterPlan};
use crate::error::{SphereflowError, SphereflowResult};
use crate::ports::Encoder;
use crate::streaming::rendition_output_path;
use crate::utils::path::thumbnail_filename;

/// ffmpeg-based encoder adapter
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    /// Locate ffmpeg on PATH
    pub fn new() -> SphereflowResult<Self> {
        let binary = which::which("ffmpeg")
            .map_err(|error| SphereflowError::encoding(format!("ffmpeg not found: {}", error)))?;
        Ok(Self { binary })
    }

    /// Use an explicit ffmpeg binary path
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Run one ffmpeg invocation, honoring the optional deadline
    async fn run(
        &self,
        args: Vec<String>,
        deadline: Option<Duration>,
    ) -> SphereflowResult<()> {
        debug!(?args, "running ffmpeg");
        let mut command = Command::new(&self.binary);
        command.args(&args).kill_on_drop(true);

        let outcome = match deadline {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    SphereflowError::encoding(format!(
                        "ffmpeg exceeded deadline of {:.1}s",
                        limit.as_secs_f64()
                    ))
                })?,
            None => command.output().await,
        };

        let output: Output = outcome
            .map_err(|error| SphereflowError::encoding(format!("failed to run ffmpeg: {}", error)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Keep the tail, where ffmpeg prints the actual failure
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SphereflowError::encoding(format!(
                "ffmpeg exited with {}: {}",
                output.status, tail
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn run_filter(
        &self,
        input: &Path,
        output: &Path,
        plan: &FilterPlan,
        deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            if plan.complex { "-filter_complex" } else { "-vf" }.to_string(),
            plan.filter.clone(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-crf".to_string(),
            "23".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ];
        for (key, value) in &plan.output_metadata {
            args.push("-metadata".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(output.display().to_string());

        info!(output = %output.display(), "running filter plan");
        self.run(args, deadline).await?;
        Ok(output.to_path_buf())
    }

    async fn encode_rendition(
        &self,
        input: &Path,
        output_dir: &Path,
        level: &BitrateLevel,
        video_id: &str,
        deadline: Option<Duration>,
    ) -> SphereflowResult<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let output = rendition_output_path(output_dir, video_id, level);

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c:v".to_string(),
            level.codec.encoder_name().to_string(),
            "-b:v".to_string(),
            format!("{}k", level.bitrate),
            "-maxrate".to_string(),
            format!("{}k", level.max_bitrate),
            "-bufsize".to_string(),
            format!("{}k", level.max_bitrate * 2),
            "-vf".to_string(),
            format!("scale={}:{}", level.width, level.height),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ];

        info!(level = %level.name, output = %output.display(), "encoding rendition");
        self.run(args, deadline).await?;
        Ok(output)
    }

    async fn thumbnail_track(
        &self,
        input: &Path,
        output_dir: &Path,
        video_id: &str,
    ) -> SphereflowResult<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let output = output_dir.join(thumbnail_filename(video_id));

        // One 10x10 sprite sheet sampled every 10 seconds
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            "fps=1/10,scale=160:-1,tile=10x10".to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            output.display().to_string(),
        ];

        info!(output = %output.display(), "generating thumbnail track");
        self.run(args, None).await?;
        Ok(output)
    }
}

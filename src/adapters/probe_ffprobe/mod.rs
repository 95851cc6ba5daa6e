//! ffprobe metadata probing adapter
//!
//! Shells out to the ffprobe binary and parses its JSON output into the
//! structured probe report the core consumes. Any subprocess or parse
//! failure surfaces as a probe error; callers treat that as "cannot
//! determine spherical status".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SphereflowError, SphereflowResult};
use crate::ports::{MediaProber, ProbeReport};

/// ffprobe-based prober adapter
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    /// Locate ffprobe on PATH
    pub fn new() -> SphereflowResult<Self> {
        let binary = which::which("ffprobe")
            .map_err(|error| SphereflowError::probe(format!("ffprobe not found: {}", error)))?;
        Ok(Self { binary })
    }

    /// Use an explicit ffprobe binary path
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> SphereflowResult<ProbeReport> {
        debug!(input = %path.display(), "probing media file");
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|error| SphereflowError::probe(format!("failed to run ffprobe: {}", error)))?;

        if !output.status.success() {
            return Err(SphereflowError::probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let parsed: Value = serde_json::from_slice(&output.stdout)
            .map_err(|error| SphereflowError::probe(format!("invalid ffprobe output: {}", error)))?;
        Ok(parse_report(&parsed, path))
    }
}

/// Build a probe report from ffprobe JSON
fn parse_report(parsed: &Value, path: &Path) -> ProbeReport {
    let mut report = ProbeReport {
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };

    let empty = Vec::new();
    let streams = parsed["streams"].as_array().unwrap_or(&empty);
    let video_stream = streams
        .iter()
        .find(|stream| stream["codec_type"].as_str() == Some("video"));
    if let Some(stream) = video_stream {
        report.width = stream["width"].as_u64().unwrap_or(0) as u32;
        report.height = stream["height"].as_u64().unwrap_or(0) as u32;
        collect_tags(&stream["tags"], &mut report.tags);
    }

    if let Some(duration) = parsed["format"]["duration"].as_str() {
        report.duration_seconds = duration.parse().unwrap_or(0.0);
    }
    collect_tags(&parsed["format"]["tags"], &mut report.tags);

    report
}

fn collect_tags(tags: &Value, into: &mut Vec<(String, String)>) {
    if let Some(map) = tags.as_object() {
        for (key, value) in map {
            if let Some(text) = value.as_str() {
                into.push((key.clone(), text.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_report_extracts_video_stream() {
        let parsed = json!({
            "streams": [
                {"codec_type": "audio", "channels": 2},
                {"codec_type": "video", "width": 3840, "height": 1920,
                 "tags": {"ProjectionType": "equirectangular"}}
            ],
            "format": {
                "duration": "93.5",
                "tags": {"Spherical": "1"}
            }
        });
        let report = parse_report(&parsed, Path::new("/media/dive_360.mp4"));
        assert_eq!(report.width, 3840);
        assert_eq!(report.height, 1920);
        assert_eq!(report.duration_seconds, 93.5);
        assert_eq!(report.filename, "dive_360.mp4");
        assert_eq!(report.tag("Spherical"), Some("1"));
        assert_eq!(report.tag("ProjectionType"), Some("equirectangular"));
    }

    #[test]
    fn test_parse_report_tolerates_missing_fields() {
        let parsed = json!({});
        let report = parse_report(&parsed, Path::new("clip.mp4"));
        assert_eq!(report.width, 0);
        assert_eq!(report.height, 0);
        assert_eq!(report.duration_seconds, 0.0);
        assert!(report.tags.is_empty());
    }
}

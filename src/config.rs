//! Configuration loading module
//!
//! TOML configuration with sensible defaults; every field is optional in the
//! file. Controls encoder binary discovery, codec availability for ladder
//! planning, and packaging defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::QualityPreset;
use crate::error::{SphereflowError, SphereflowResult};
use crate::ladder::CodecPolicy;
use crate::streaming::DEFAULT_SEGMENT_DURATION;

/// Sphereflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereflowConfig {
    /// Explicit ffmpeg binary path; PATH lookup when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe binary path; PATH lookup when unset
    pub ffprobe_path: Option<PathBuf>,
    /// Allow HEVC renditions in planned ladders
    pub enable_hevc: bool,
    /// Allow AV1 renditions in planned ladders
    pub enable_av1: bool,
    /// Default encoding quality preset
    pub quality_preset: QualityPreset,
    /// Streaming segment duration in seconds
    pub segment_duration: u32,
    /// Worker-pool size for batch and rendition fan-out; CPU count when unset
    pub parallelism: Option<usize>,
}

impl Default for SphereflowConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            enable_hevc: true,
            enable_av1: false,
            quality_preset: QualityPreset::Medium,
            segment_duration: DEFAULT_SEGMENT_DURATION,
            parallelism: None,
        }
    }
}

impl SphereflowConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SphereflowResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|error| {
            SphereflowError::ConfigFile {
                message: format!("cannot read {}: {}", path.display(), error),
            }
        })?;
        let config: Self = toml::from_str(&contents).map_err(|error| {
            SphereflowError::ConfigFile {
                message: format!("cannot parse {}: {}", path.display(), error),
            }
        })?;
        config.validate()?;
        info!(config = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from an optional path, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> SphereflowResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate field ranges
    pub fn validate(&self) -> SphereflowResult<()> {
        if self.segment_duration == 0 {
            return Err(SphereflowError::ConfigFile {
                message: "segment_duration must be positive".to_string(),
            });
        }
        if self.parallelism == Some(0) {
            return Err(SphereflowError::ConfigFile {
                message: "parallelism must be positive when set".to_string(),
            });
        }
        Ok(())
    }

    /// Codec policy for ladder planning
    pub fn codec_policy(&self) -> CodecPolicy {
        CodecPolicy {
            enable_hevc: self.enable_hevc,
            enable_av1: self.enable_av1,
        }
    }

    /// Effective worker-pool size
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SphereflowConfig::default();
        assert!(config.enable_hevc);
        assert!(!config.enable_av1);
        assert_eq!(config.segment_duration, 6);
        assert_eq!(config.quality_preset, QualityPreset::Medium);
        assert!(config.validate().is_ok());
        assert!(config.effective_parallelism() >= 1);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "enable_av1 = true\nquality_preset = \"high\"\nsegment_duration = 4"
        )
        .unwrap();

        let config = SphereflowConfig::load(file.path()).unwrap();
        assert!(config.enable_av1);
        assert_eq!(config.quality_preset, QualityPreset::High);
        assert_eq!(config.segment_duration, 4);
        // Unspecified fields keep their defaults
        assert!(config.enable_hevc);
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "segment_duration = 0").unwrap();
        assert!(SphereflowConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(SphereflowConfig::load(Path::new("/nonexistent/sphereflow.toml")).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = SphereflowConfig::load_or_default(None).unwrap();
        assert_eq!(config.segment_duration, 6);
    }
}

//! DASH MPD manifest data model
//!
//! Representation entries with segment-template naming for the downstream
//! MPD writer, mirroring the HLS variant data on the DASH side.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::BitrateLevel;

/// One representation inside the video adaptation set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashRepresentation {
    /// Representation id, the level name
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Peak bandwidth in bits per second
    pub bandwidth: u64,
    /// RFC 6381 codec string
    pub codecs: String,
    /// Initialization segment name
    pub init_segment: String,
    /// Media segment template with $Number$ substitution
    pub media_template: String,
    /// Encoded rendition file backing this representation
    pub rendition: PathBuf,
}

/// DASH MPD manifest data for the downstream writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashManifest {
    /// Where the writer should place the MPD
    pub path: PathBuf,
    /// Manifest publish timestamp
    pub publish_time: DateTime<Utc>,
    /// Presentation duration in seconds
    pub duration_seconds: f64,
    /// Segment duration in seconds
    pub segment_duration: u32,
    /// Representations ordered lowest to highest rendition
    pub representations: Vec<DashRepresentation>,
}

impl DashManifest {
    /// Assemble manifest data over the renditions that encoded successfully
    pub fn from_renditions(
        output_dir: &Path,
        video_id: &str,
        renditions: &[(BitrateLevel, PathBuf)],
        duration_seconds: f64,
        segment_duration: u32,
    ) -> Self {
        let dash_dir = output_dir.join("dash");
        let representations = renditions
            .iter()
            .map(|(level, rendition)| DashRepresentation {
                id: level.name.clone(),
                width: level.width,
                height: level.height,
                bandwidth: level.bitrate as u64 * 1000,
                codecs: level.codec.rfc6381().to_string(),
                init_segment: format!("{}/{}_init.mp4", level.name, level.name),
                media_template: format!("{}/{}_$Number$.m4s", level.name, level.name),
                rendition: rendition.clone(),
            })
            .collect();

        Self {
            path: dash_dir.join(format!("{}.mpd", video_id)),
            publish_time: Utc::now(),
            duration_seconds,
            segment_duration,
            representations,
        }
    }
}

//! HLS master playlist data model
//!
//! The core does not serialize playlists; it assembles the data a downstream
//! manifest writer needs - one variant entry per successful rendition with
//! bandwidth, resolution, and RFC 6381 codec strings, plus the segment
//! naming scheme the segmenter should use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::model::BitrateLevel;

/// One variant stream entry in the master playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HlsVariant {
    /// Level name the variant was produced from, e.g. "720p"
    pub name: String,
    /// Peak bandwidth in bits per second
    pub bandwidth: u64,
    pub width: u32,
    pub height: u32,
    /// RFC 6381 codec string
    pub codecs: String,
    /// Media playlist URI relative to the master playlist
    pub uri: String,
    /// Segment filename pattern for the segmenter
    pub segment_pattern: String,
    /// Encoded rendition file backing this variant
    pub rendition: PathBuf,
}

/// HLS master playlist data for the downstream writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HlsMasterPlaylist {
    /// Where the writer should place the master playlist
    pub path: PathBuf,
    /// #EXT-X-VERSION value
    pub version: u32,
    /// Segment duration in seconds
    pub segment_duration: u32,
    /// Variants ordered lowest to highest rendition
    pub variants: Vec<HlsVariant>,
}

impl HlsMasterPlaylist {
    /// Assemble playlist data over the renditions that encoded successfully
    pub fn from_renditions(
        output_dir: &Path,
        video_id: &str,
        renditions: &[(BitrateLevel, PathBuf)],
        segment_duration: u32,
    ) -> Self {
        let hls_dir = output_dir.join("hls");
        let variants = renditions
            .iter()
            .map(|(level, rendition)| HlsVariant {
                name: level.name.clone(),
                bandwidth: level.bitrate as u64 * 1000,
                width: level.width,
                height: level.height,
                codecs: level.codec.rfc6381().to_string(),
                uri: format!("{}/{}.m3u8", level.name, level.name),
                segment_pattern: format!("{}/{}_%03d.ts", level.name, level.name),
                rendition: rendition.clone(),
            })
            .collect();

        Self {
            path: hls_dir.join(format!("{}.m3u8", video_id)),
            version: 6,
            segment_duration,
            variants,
        }
    }
}

//! Error handling module for Sphereflow

use thiserror::Error;

use crate::domain::model::ProjectionKind;

/// Main error type for Sphereflow operations
#[derive(Error, Debug)]
pub enum SphereflowError {
    /// Invalid viewport, FOV, resolution, or ladder values (caller bug)
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Metadata probe failure from the external prober
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// Encode failure from the external encoder
    #[error("Encoding operation failed: {message}")]
    Encoding { message: String },

    /// Every rendition in a ladder failed to encode
    #[error("No renditions produced for {video_id}: all {attempted} encode attempts failed")]
    NoRenditionsProduced { video_id: String, attempted: usize },

    /// Requested projection has no geometry implementation for this operation
    #[error("Unsupported projection for {operation}: {projection}")]
    UnsupportedProjection {
        projection: ProjectionKind,
        operation: String,
    },

    /// Configuration file could not be parsed
    #[error("Failed to load configuration: {message}")]
    ConfigFile { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SphereflowError {
    /// Construct a configuration error from any message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Construct a probe error from any message
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    /// Construct an encoding error from any message
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Result type alias for Sphereflow operations
pub type SphereflowResult<T> = std::result::Result<T, SphereflowError>;

use std::path::PathBuf;

use thiserror::Error;

/// Faults that abort a single capture/solve cycle.
///
/// Heuristic misses (nothing parsed, no JSON in a reply) are not errors; they
/// come back as empty values or the decoder's fallback result.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("camera {camera} unavailable: {reason}")]
    DeviceUnavailable { camera: String, reason: String },

    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn device(camera: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            camera: camera.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

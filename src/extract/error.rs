use std::path::PathBuf;
use std::time::Duration;

/// Why a single extraction strategy did not produce an image
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0} is not installed")]
    ToolMissing(String),

    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    #[error("{tool} exited with status {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} produced no image at {path:?}")]
    NoOutput { tool: String, path: PathBuf },

    #[error("{tool} could not be started: {reason}")]
    SpawnFailed { tool: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image conversion failed: {0}")]
    Convert(#[from] image::ImageError),
}

impl ExtractError {
    /// Missing tools are expected on some machines and only skip a strategy
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, ExtractError::ToolMissing(_))
    }
}

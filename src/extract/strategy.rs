use std::fs;
use std::path::Path;

use super::error::ExtractError;
use crate::models::ClipboardImage;
use crate::process::{Invocation, ProcessOutcome, ProcessOutput, ToolRunner};

/// One way of turning clipboard image data into a PNG file on disk
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logs and failure reasons
    fn name(&self) -> &'static str;

    /// Write the clipboard image to `target`.
    /// `Ok` is a claim, not proof: the pipeline still checks the file exists.
    fn extract(&self, image: &ClipboardImage, target: &Path) -> Result<(), ExtractError>;
}

/// Run a tool and map anything but a zero exit to an `ExtractError`
pub fn run_tool(
    runner: &dyn ToolRunner,
    invocation: &Invocation,
) -> Result<ProcessOutput, ExtractError> {
    let tool = invocation.program.clone();
    match runner.run(invocation) {
        ProcessOutcome::Completed(output) if output.success() => Ok(output),
        ProcessOutcome::Completed(output) => Err(ExtractError::ToolFailed {
            tool,
            code: output.code,
            stderr: output.stderr_lossy(),
        }),
        ProcessOutcome::NotFound => Err(ExtractError::ToolMissing(tool)),
        ProcessOutcome::TimedOut => Err(ExtractError::Timeout {
            tool,
            after: invocation.timeout,
        }),
        ProcessOutcome::SpawnFailed(reason) => Err(ExtractError::SpawnFailed { tool, reason }),
    }
}

/// A file exists at `path` and is not empty
pub fn has_output(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

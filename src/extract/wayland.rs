use std::path::Path;
use std::sync::Arc;

use super::TOOL_TIMEOUT;
use super::convert;
use super::error::ExtractError;
use super::strategy::{ExtractionStrategy, run_tool};
use crate::models::ClipboardImage;
use crate::process::{Invocation, ToolRunner};

/// `wl-paste --type <mime>`; non-PNG data is converted in-process
pub struct WlPasteStrategy {
    runner: Arc<dyn ToolRunner>,
}

impl WlPasteStrategy {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        WlPasteStrategy { runner }
    }
}

impl ExtractionStrategy for WlPasteStrategy {
    fn name(&self) -> &'static str {
        "wl-paste"
    }

    fn extract(&self, image: &ClipboardImage, target: &Path) -> Result<(), ExtractError> {
        let output = run_tool(
            self.runner.as_ref(),
            &Invocation::new("wl-paste", TOOL_TIMEOUT).args(["--type", image.format.mime_type()]),
        )?;

        if output.stdout.is_empty() {
            return Err(ExtractError::NoOutput {
                tool: "wl-paste".to_string(),
                path: target.to_path_buf(),
            });
        }

        log::debug!(
            "Read {} bytes of {} from clipboard",
            output.stdout.len(),
            image.format.mime_type()
        );
        convert::write_png(&output.stdout, image.format, target)
    }
}

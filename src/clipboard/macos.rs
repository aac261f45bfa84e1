use std::sync::Arc;

use super::backend::ClipboardBackend;
use super::{PROBE_TIMEOUT, log_probe_failure};
use crate::models::{ClipboardImage, ClipboardKind, ImageFormat};
use crate::process::{Invocation, ToolRunner};

/// Pasteboard type tags probed in priority order
const IMAGE_TAGS: [(&str, ImageFormat); 2] = [
    ("PNGf", ImageFormat::Png),
    ("TIFF", ImageFormat::Tiff),
];

/// macOS pasteboard backend using osascript and pbpaste
pub struct MacBackend {
    runner: Arc<dyn ToolRunner>,
}

impl MacBackend {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        MacBackend { runner }
    }

    /// Does the pasteboard advertise data for this type tag?
    fn has_type(&self, tag: &str) -> bool {
        let script = format!(
            concat!(
                "tell application \"System Events\" to return ",
                "(clipboard info for «class {}») is not {{}}"
            ),
            tag
        );
        let outcome = self
            .runner
            .run(&Invocation::new("osascript", PROBE_TIMEOUT).args(["-e", script.as_str()]));

        match outcome.succeeded() {
            Some(output) => output.stdout_lossy().trim() == "true",
            None => {
                log_probe_failure(&format!("Probe for «class {}»", tag), &outcome);
                false
            }
        }
    }
}

impl ClipboardBackend for MacBackend {
    fn classify(&self) -> ClipboardKind {
        for (tag, format) in IMAGE_TAGS {
            if self.has_type(tag) {
                log::debug!("Pasteboard holds {:?} image", format);
                return ClipboardKind::Image(ClipboardImage::new(format));
            }
        }

        match self.read_text() {
            Some(text) => ClipboardKind::Text(text),
            None => ClipboardKind::Empty,
        }
    }

    fn read_text(&self) -> Option<String> {
        let outcome = self.runner.run(&Invocation::new("pbpaste", PROBE_TIMEOUT));
        let Some(output) = outcome.succeeded() else {
            log_probe_failure("pbpaste", &outcome);
            return None;
        };

        let text = output.stdout_lossy();
        if text.is_empty() { None } else { Some(text) }
    }

    fn name(&self) -> &'static str {
        "macOS"
    }
}

use std::sync::Arc;

use super::backend::ClipboardBackend;
use super::{PROBE_TIMEOUT, log_probe_failure};
use crate::models::{ClipboardImage, ClipboardKind, ImageFormat};
use crate::process::{Invocation, ToolRunner};

/// Image formats in the order they are preferred when several are offered
const IMAGE_PREFERENCE: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Tiff, ImageFormat::Bmp];

/// Wayland clipboard backend using wl-clipboard tools
/// Requires wl-paste to be installed
pub struct WaylandBackend {
    runner: Arc<dyn ToolRunner>,
}

impl WaylandBackend {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        WaylandBackend { runner }
    }

    /// MIME types offered by the current clipboard owner
    fn offered_types(&self) -> Vec<String> {
        let outcome = self
            .runner
            .run(&Invocation::new("wl-paste", PROBE_TIMEOUT).arg("--list-types"));

        match outcome.succeeded() {
            Some(output) => output
                .stdout_lossy()
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            None => {
                log_probe_failure("wl-paste --list-types", &outcome);
                Vec::new()
            }
        }
    }
}

fn is_text_type(mime: &str) -> bool {
    mime.starts_with("text/plain") || matches!(mime, "UTF8_STRING" | "STRING" | "TEXT")
}

impl ClipboardBackend for WaylandBackend {
    fn classify(&self) -> ClipboardKind {
        let types = self.offered_types();
        log::debug!("Clipboard offers {:?}", types);

        for format in IMAGE_PREFERENCE {
            if types
                .iter()
                .any(|t| ImageFormat::from_mime_type(t) == Some(format))
            {
                return ClipboardKind::Image(ClipboardImage::new(format));
            }
        }

        if !types.iter().any(|t| is_text_type(t)) {
            return ClipboardKind::Empty;
        }

        match self.read_text() {
            Some(text) => ClipboardKind::Text(text),
            None => ClipboardKind::Empty,
        }
    }

    fn read_text(&self) -> Option<String> {
        let outcome = self.runner.run(
            &Invocation::new("wl-paste", PROBE_TIMEOUT).args(["--no-newline", "--type", "text"]),
        );
        let Some(output) = outcome.succeeded() else {
            log_probe_failure("wl-paste --type text", &outcome);
            return None;
        };

        let text = output.stdout_lossy();
        if text.is_empty() { None } else { Some(text) }
    }

    fn name(&self) -> &'static str {
        "Wayland"
    }
}

pub mod backend;
pub mod macos;
pub mod wayland;

use anyhow::{Result, anyhow};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::process::{ProcessOutcome, ToolRunner};

pub use backend::ClipboardBackend;
pub use macos::MacBackend;
pub use wayland::WaylandBackend;

/// Bound on each clipboard probe or text fetch
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Clipboard system the process runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS pasteboard via osascript, pbpaste, pngpaste and sips
    MacOs,
    /// Wayland via wl-clipboard
    Wayland,
}

impl Platform {
    /// Detect the platform: macOS at compile time, Wayland via WAYLAND_DISPLAY
    /// Returns error if no supported clipboard system is detected
    pub fn detect() -> Result<Self> {
        if cfg!(target_os = "macos") {
            log::info!("Detected macOS pasteboard");
            return Ok(Platform::MacOs);
        }

        if env::var_os("WAYLAND_DISPLAY").is_some() {
            log::info!("Detected Wayland display server");
            return Ok(Platform::Wayland);
        }

        Err(anyhow!(
            "No supported clipboard detected. Run on macOS or set WAYLAND_DISPLAY for Wayland"
        ))
    }
}

/// Create the clipboard backend for a platform
pub fn create_backend(
    platform: Platform,
    runner: Arc<dyn ToolRunner>,
) -> Box<dyn ClipboardBackend> {
    match platform {
        Platform::MacOs => Box::new(MacBackend::new(runner)),
        Platform::Wayland => Box::new(WaylandBackend::new(runner)),
    }
}

/// Log why a probe produced nothing usable
pub(crate) fn log_probe_failure(what: &str, outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Completed(output) => {
            log::debug!("{} exited with {:?}: {}", what, output.code, output.stderr_lossy())
        }
        ProcessOutcome::NotFound => log::warn!("{}: tool not installed", what),
        ProcessOutcome::TimedOut => log::warn!("{} timed out after {:?}", what, PROBE_TIMEOUT),
        ProcessOutcome::SpawnFailed(e) => log::warn!("{} could not run: {}", what, e),
    }
}

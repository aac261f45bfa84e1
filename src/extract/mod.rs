//! Clipboard image extraction
//!
//! A [`Pipeline`] holds an ordered list of [`ExtractionStrategy`] values and
//! tries them one after another until one leaves a usable file at the target.

pub mod convert;
pub mod error;
pub mod macos;
pub mod strategy;
pub mod wayland;

use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::clipboard::Platform;
use crate::models::{ClipboardImage, ExtractionResult};
use crate::process::ToolRunner;
use crate::storage::{ensure_save_directory, unique_image_path};

pub use error::ExtractError;
pub use macos::{PngpasteStrategy, ScriptedTiffStrategy};
pub use strategy::{ExtractionStrategy, has_output};
pub use wayland::WlPasteStrategy;

/// Bound on every external process run by a strategy
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Ordered fallback chain of extraction strategies
pub struct Pipeline {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Pipeline {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Pipeline { strategies }
    }

    /// Default strategy order for a platform
    pub fn for_platform(platform: Platform, runner: Arc<dyn ToolRunner>) -> Self {
        let strategies: Vec<Box<dyn ExtractionStrategy>> = match platform {
            Platform::MacOs => vec![
                Box::new(PngpasteStrategy::new(runner.clone())),
                Box::new(ScriptedTiffStrategy::new(runner)),
            ],
            Platform::Wayland => vec![Box::new(WlPasteStrategy::new(runner))],
        };
        Pipeline::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Save the clipboard image into `target_dir` under a fresh, non-colliding name.
    /// Always returns a result; strategy errors are logged and folded into `Failed`.
    pub fn extract(
        &self,
        image: &ClipboardImage,
        target_dir: &Path,
        filename_template: &str,
    ) -> ExtractionResult {
        if let Err(e) = ensure_save_directory(target_dir) {
            log::error!("{:#}", e);
            return ExtractionResult::Failed(format!("{:#}", e));
        }

        let target = unique_image_path(target_dir, filename_template, &Local::now());
        // A `/` in the template nests the image below the save directory
        if let Some(parent) = target.parent().filter(|p| *p != target_dir) {
            if let Err(e) = ensure_save_directory(parent) {
                log::error!("{:#}", e);
                return ExtractionResult::Failed(format!("{:#}", e));
            }
        }
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            log::debug!("Trying {} for {:?}", strategy.name(), target);

            let result = strategy.extract(image, &target).and_then(|()| {
                if has_output(&target) {
                    Ok(())
                } else {
                    Err(ExtractError::NoOutput {
                        tool: strategy.name().to_string(),
                        path: target.clone(),
                    })
                }
            });

            match result {
                Ok(()) => {
                    log::info!("Saved clipboard image to {:?} via {}", target, strategy.name());
                    return ExtractionResult::Saved(target);
                }
                Err(e) if e.is_tool_missing() => {
                    log::debug!("Skipping {}: {}", strategy.name(), e);
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
                Err(e) => {
                    log::warn!("{} failed: {}", strategy.name(), e);
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
            }

            remove_partial(&target);
        }

        if failures.is_empty() {
            failures.push("no extraction strategies configured".to_string());
        }
        ExtractionResult::Failed(failures.join("; "))
    }
}

/// Drop whatever a failed strategy left at the target
fn remove_partial(target: &Path) {
    if target.exists() {
        if let Err(e) = fs::remove_file(target) {
            log::error!("Failed to remove partial image {:?}: {}", target, e);
        }
    }
}

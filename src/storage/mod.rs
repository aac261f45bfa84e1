pub mod config;
pub mod naming;

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use config::{
    ConfigStorage, JsonConfigStorage, ResolvedConfig, Settings, candidate_paths, load_config,
    resolve_config,
};
pub use naming::{IMAGE_EXTENSION, unique_image_path};

/// Directory name used under XDG and home locations
pub const APP_DIR: &str = "pastepath";

/// Home directory from `$HOME`
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Data directory for logs
///
/// XDG Base Directory Specification:
/// - Data: $XDG_DATA_HOME/pastepath (default: ~/.local/share/pastepath)
pub fn data_dir() -> Result<PathBuf> {
    if let Some(xdg_data) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg_data).join(APP_DIR));
    }
    let home = home_dir().context("HOME environment variable not set")?;
    Ok(home.join(".local/share").join(APP_DIR))
}

/// Expand a leading `~` against `home`. Other paths are returned untouched.
pub fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Create the save directory if missing. Idempotent.
pub fn ensure_save_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create save directory {:?}", dir))?;
    Ok(())
}

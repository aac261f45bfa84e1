use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{APP_DIR, expand_tilde};

pub const DEFAULT_SAVE_DIRECTORY: &str = "~/.pastepath/images";
pub const DEFAULT_FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const DEFAULT_OUTPUT_FORMAT: &str = "{path}";

/// Config file name inside each candidate directory
const CONFIG_FILE: &str = "config.json";

/// Settings as written in the JSON file. Keys missing from the file take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Where images are saved (`~` expanded)
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// strftime pattern for the file stem
    #[serde(default = "default_filename_format")]
    pub filename_format: String,

    /// Text injected for a saved image: `{path}`, `{filename}`, `{dir}`
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            save_directory: default_save_directory(),
            filename_format: default_filename_format(),
            output_format: default_output_format(),
        }
    }
}

// Default value functions for serde
fn default_save_directory() -> String {
    DEFAULT_SAVE_DIRECTORY.to_string()
}

fn default_filename_format() -> String {
    DEFAULT_FILENAME_FORMAT.to_string()
}

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

/// Read-only configuration built once at startup and shared by every paste
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Absolute directory for saved images, created lazily on first write
    pub save_directory: PathBuf,
    pub filename_template: String,
    pub output_template: String,
    /// File the values came from, `None` for built-in defaults
    pub source: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Resolve raw settings: expand `~` and make the save directory absolute
    pub fn from_settings(settings: Settings, home: Option<&Path>, source: Option<PathBuf>) -> Self {
        let expanded = expand_tilde(&settings.save_directory, home);
        let save_directory = if expanded.is_absolute() {
            expanded
        } else {
            std::path::absolute(&expanded).unwrap_or(expanded)
        };

        ResolvedConfig {
            save_directory,
            filename_template: settings.filename_format,
            output_template: settings.output_format,
            source,
        }
    }

    /// Built-in defaults
    pub fn defaults(home: Option<&Path>) -> Self {
        Self::from_settings(Settings::default(), home, None)
    }
}

/// Trait for configuration storage
pub trait ConfigStorage {
    /// Load settings. `Ok(None)` when the file does not exist.
    fn load(&self) -> Result<Option<Settings>>;

    /// Get the config file path
    fn path(&self) -> &Path;
}

/// JSON-file implementation of ConfigStorage
#[derive(Debug, Clone)]
pub struct JsonConfigStorage {
    path: PathBuf,
}

impl JsonConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        JsonConfigStorage { path }
    }
}

impl ConfigStorage for JsonConfigStorage {
    fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            log::debug!("No config file at {:?}", self.path);
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        Ok(Some(settings))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Config file locations in priority order
///
/// 1. explicit path from the command line
/// 2. $XDG_CONFIG_HOME/pastepath/config.json (default: ~/.config/pastepath/config.json)
/// 3. ~/.pastepath/config.json
pub fn candidate_paths(
    explicit: Option<&Path>,
    home: Option<&Path>,
    xdg_config_home: Option<&Path>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(explicit) = explicit {
        paths.push(explicit.to_path_buf());
    }

    match (xdg_config_home, home) {
        (Some(xdg), _) => paths.push(xdg.join(APP_DIR).join(CONFIG_FILE)),
        (None, Some(home)) => paths.push(home.join(".config").join(APP_DIR).join(CONFIG_FILE)),
        (None, None) => {}
    }

    if let Some(home) = home {
        paths.push(home.join(format!(".{}", APP_DIR)).join(CONFIG_FILE));
    }

    paths
}

/// Candidate paths from the process environment
pub fn candidate_paths_from_env(explicit: Option<&Path>) -> Vec<PathBuf> {
    let home = super::home_dir();
    let xdg = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    candidate_paths(explicit, home.as_deref(), xdg.as_deref())
}

/// First existing-and-parseable storage wins; otherwise built-in defaults.
/// Unreadable or malformed files are logged and skipped, never fatal.
pub fn resolve_config<S: ConfigStorage>(storages: &[S], home: Option<&Path>) -> ResolvedConfig {
    for storage in storages {
        match storage.load() {
            Ok(Some(settings)) => {
                let config = ResolvedConfig::from_settings(
                    settings,
                    home,
                    Some(storage.path().to_path_buf()),
                );
                log::debug!(
                    "Config: save_directory={:?}, filename_format={:?}, output_format={:?}",
                    config.save_directory,
                    config.filename_template,
                    config.output_template
                );
                return config;
            }
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Ignoring config file: {:#}", e);
                continue;
            }
        }
    }

    log::info!("No usable config file found, using defaults");
    ResolvedConfig::defaults(home)
}

/// Resolve configuration from the standard locations
pub fn load_config(explicit: Option<&Path>) -> ResolvedConfig {
    let storages: Vec<JsonConfigStorage> = candidate_paths_from_env(explicit)
        .into_iter()
        .map(JsonConfigStorage::new)
        .collect();
    resolve_config(&storages, super::home_dir().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storages(paths: &[PathBuf]) -> Vec<JsonConfigStorage> {
        paths.iter().cloned().map(JsonConfigStorage::new).collect()
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.save_directory, "~/.pastepath/images");
        assert_eq!(settings.filename_format, "%Y%m%d_%H%M%S");
        assert_eq!(settings.output_format, "{path}");

        let resolved = ResolvedConfig::defaults(Some(Path::new("/home/me")));
        assert_eq!(resolved.save_directory, PathBuf::from("/home/me/.pastepath/images"));
        assert_eq!(resolved.source, None);
    }

    #[test]
    fn test_candidate_paths_order() {
        let home = Path::new("/home/me");
        let paths = candidate_paths(Some(Path::new("/etc/pp.json")), Some(home), None);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/etc/pp.json"),
                PathBuf::from("/home/me/.config/pastepath/config.json"),
                PathBuf::from("/home/me/.pastepath/config.json"),
            ]
        );

        let paths = candidate_paths(None, Some(home), Some(Path::new("/xdg")));
        assert_eq!(paths[0], PathBuf::from("/xdg/pastepath/config.json"));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_absent_files_resolve_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        let paths = candidate_paths(None, Some(home), None);

        let resolved = resolve_config(&storages(&paths), Some(home));
        assert_eq!(resolved, ResolvedConfig::defaults(Some(home)));
    }

    #[test]
    fn test_malformed_first_valid_second() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        let paths = candidate_paths(None, Some(home), None);
        write(&paths[0], "{ not json");
        write(
            &paths[1],
            concat!(
                r#"{"save_directory": "/srv/shots", "filename_format": "%H%M", "#,
                r#""output_format": "@{filename}"}"#
            ),
        );

        let resolved = resolve_config(&storages(&paths), Some(home));
        assert_eq!(resolved.save_directory, PathBuf::from("/srv/shots"));
        assert_eq!(resolved.filename_template, "%H%M");
        assert_eq!(resolved.output_template, "@{filename}");
        assert_eq!(resolved.source.as_deref(), Some(paths[1].as_path()));
    }

    #[test]
    fn test_first_valid_file_wins() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        let paths = candidate_paths(None, Some(home), None);
        write(&paths[0], r#"{"output_format": "first"}"#);
        write(&paths[1], r#"{"output_format": "second"}"#);

        let resolved = resolve_config(&storages(&paths), Some(home));
        assert_eq!(resolved.output_template, "first");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        let paths = candidate_paths(None, Some(home), None);
        write(&paths[1], r#"{"save_directory": "~/Pictures/pasted", "extra": true}"#);

        let resolved = resolve_config(&storages(&paths), Some(home));
        assert_eq!(resolved.save_directory, home.join("Pictures/pasted"));
        assert_eq!(resolved.filename_template, DEFAULT_FILENAME_FORMAT);
        assert_eq!(resolved.output_template, DEFAULT_OUTPUT_FORMAT);
    }

    #[test]
    fn test_wrong_value_type_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        let paths = candidate_paths(None, Some(home), None);
        write(&paths[0], r#"{"save_directory": 42}"#);

        let resolved = resolve_config(&storages(&paths), Some(home));
        assert_eq!(resolved, ResolvedConfig::defaults(Some(home)));
    }
}

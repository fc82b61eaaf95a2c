//! Configuration for snippetstore

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application support directory; the computed default snippet directory lives under it
    #[serde(default = "default_app_support_dir")]
    pub app_support_dir: PathBuf,

    /// Default snippet directory used when preferences have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_snippet_directory: Option<String>,

    /// Folder holding the bundled snippet sets, one subdirectory each
    #[serde(default = "default_snippets_path")]
    pub default_snippets_path: PathBuf,

    /// Preferences file (registered directories, default directory)
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_app_support_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snippetstore")
}

/// Next to the executable when installed, else the workspace copy
fn default_snippets_path() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| dir.join(crate::DEFAULT_SNIPPETS_DIR_NAME));
    if let Some(path) = installed.filter(|p| p.is_dir()) {
        return path;
    }
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(crate::DEFAULT_SNIPPETS_DIR_NAME)
}

fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snippetstore")
        .join("preferences.yml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_support_dir: default_app_support_dir(),
            default_snippet_directory: None,
            default_snippets_path: default_snippets_path(),
            preferences_path: default_preferences_path(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from the given file, else the first default location found, else defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::default_locations() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!("Failed to load config from {}: {}", path.display(), e),
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(path) => Some(path.clone()),
            None => Self::default_locations().into_iter().find(|p| p.exists()),
        }?;
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(".snippetstore.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("snippetstore").join("snippetstore.yml"));
        }
        locations
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "load_from_file: called");
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

//! Persisted preferences: registered snippet directories and the default directory

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, SnippetError};

/// A directory the loader scans at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRegistration {
    pub full_path: String,
    pub auto_load: bool,
}

impl DirectoryRegistration {
    pub fn new(full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            auto_load: true,
        }
    }
}

/// Preference storage the manager reads and writes
pub trait Preferences: Send + Sync {
    fn snippet_directories(&self) -> Vec<DirectoryRegistration>;

    fn set_snippet_directories(&mut self, directories: Vec<DirectoryRegistration>) -> Result<()>;

    fn default_snippet_directory(&self) -> Option<String>;

    fn set_default_snippet_directory(&mut self, directory: String) -> Result<()>;
}

/// On-disk layout of the preferences document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceValues {
    #[serde(default)]
    pub snippet_directories: Vec<DirectoryRegistration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_snippet_directory: Option<String>,
}

/// YAML-file preferences, rewritten on every change
#[derive(Debug, Clone, Default)]
pub struct FilePreferences {
    path: Option<PathBuf>,
    values: PreferenceValues,
}

impl FilePreferences {
    /// Open preferences at `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "FilePreferences::open: called");

        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => PreferenceValues::default(),
            Ok(content) => serde_yaml::from_str(&content)
                .map_err(|e| SnippetError::Preferences(format!("Failed to parse {}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("FilePreferences::open: no preferences file yet");
                PreferenceValues::default()
            }
            Err(e) => return Err(SnippetError::from_io(&path, e)),
        };

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Preferences that are never written anywhere
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_values(mut self, values: PreferenceValues) -> Self {
        self.values = values;
        self
    }

    pub fn values(&self) -> &PreferenceValues {
        &self.values
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        debug!(path = %path.display(), "FilePreferences::save: called");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SnippetError::from_io(parent, e))?;
        }

        let content = serde_yaml::to_string(&self.values)
            .map_err(|e| SnippetError::Preferences(format!("Failed to serialize preferences: {}", e)))?;
        fs::write(path, content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to write preferences");
            SnippetError::from_io(path, e)
        })
    }
}

impl Preferences for FilePreferences {
    fn snippet_directories(&self) -> Vec<DirectoryRegistration> {
        self.values.snippet_directories.clone()
    }

    fn set_snippet_directories(&mut self, directories: Vec<DirectoryRegistration>) -> Result<()> {
        debug!(count = directories.len(), "set_snippet_directories: called");
        self.values.snippet_directories = directories;
        self.save()
    }

    fn default_snippet_directory(&self) -> Option<String> {
        self.values.default_snippet_directory.clone()
    }

    fn set_default_snippet_directory(&mut self, directory: String) -> Result<()> {
        debug!(%directory, "set_default_snippet_directory: called");
        self.values.default_snippet_directory = Some(directory);
        self.save()
    }
}

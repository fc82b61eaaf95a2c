//! Snippet error types

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::snippet::SnippetId;

/// Errors surfaced by snippet operations
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    #[error("File already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directory is not an absolute path: {path}")]
    NotAbsolute { path: String },

    #[error("{path} is not a directory!")]
    NotADirectory { path: PathBuf },

    #[error("Can't edit non-directory snippet: {name}")]
    NotDirectorySnippet { name: String },

    #[error("Snippet '{name}' has no backing file")]
    MissingFilePath { name: String },

    #[error("Invalid snippet name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Another snippet is already named '{name}'")]
    NameTaken { name: String },

    #[error("Unknown snippet id: {0}")]
    UnknownSnippet(SnippetId),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("Invalid search query: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result alias for snippet operations
pub type Result<T> = std::result::Result<T, SnippetError>;

impl SnippetError {
    /// Tag an io::Error with the path it happened on
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// NotFound is benign on the create-new-file and make-directory paths
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

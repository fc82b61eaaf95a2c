//! File system access used by the snippet manager
//!
//! The manager never touches `tokio::fs` directly; everything goes through
//! [`FileSystem`] so hosts can substitute their own implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SnippetError};

/// Kind of a resolved entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// A resolved file system entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Last path segment
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Asynchronous file system operations
///
/// Errors are tagged: `NotFound` and `AlreadyExists` are distinguishable from
/// other I/O failures.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Look up an entry without reading it
    async fn resolve(&self, path: &Path) -> Result<Entry>;

    /// Read a whole file as text
    async fn read(&self, path: &Path) -> Result<String>;

    /// Create or truncate a file with `content`
    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Remove a file
    async fn unlink(&self, path: &Path) -> Result<()>;

    /// Move a file; fails with `AlreadyExists` when `to` is taken
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Direct children of a directory
    async fn contents(&self, dir: &Path) -> Result<Vec<Entry>>;

    /// Create a directory and any missing parents
    async fn make_directory(&self, path: &Path, mode: u32) -> Result<()>;

    fn is_absolute_path(&self, path: &str) -> bool {
        Path::new(path).is_absolute()
    }
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn resolve(&self, path: &Path) -> Result<Entry> {
        debug!(path = %path.display(), "LocalFileSystem::resolve: called");
        // A trailing slash on a regular file fails with ENOTDIR instead of reporting the file
        let target: PathBuf = path.components().collect();
        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| SnippetError::from_io(path, e))?;

        Ok(Entry {
            name: entry_name(path),
            path: path.to_path_buf(),
            kind: kind_of(metadata.file_type()),
        })
    }

    async fn read(&self, path: &Path) -> Result<String> {
        debug!(path = %path.display(), "LocalFileSystem::read: called");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SnippetError::from_io(path, e))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        debug!(path = %path.display(), bytes = content.len(), "LocalFileSystem::write: called");
        tokio::fs::write(path, content)
            .await
            .map_err(|e| SnippetError::from_io(path, e))
    }

    async fn unlink(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "LocalFileSystem::unlink: called");
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| SnippetError::from_io(path, e))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(from = %from.display(), to = %to.display(), "LocalFileSystem::rename: called");
        // std::fs::rename silently replaces an existing target on unix
        let taken = tokio::fs::try_exists(to)
            .await
            .map_err(|e| SnippetError::from_io(to, e))?;
        if taken {
            debug!("LocalFileSystem::rename: target already exists");
            return Err(SnippetError::AlreadyExists { path: to.to_path_buf() });
        }

        tokio::fs::rename(from, to)
            .await
            .map_err(|e| SnippetError::from_io(from, e))
    }

    async fn contents(&self, dir: &Path) -> Result<Vec<Entry>> {
        debug!(dir = %dir.display(), "LocalFileSystem::contents: called");
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| SnippetError::from_io(dir, e))?;

        let mut entries = Vec::new();
        while let Some(child) = reader.next_entry().await.map_err(|e| SnippetError::from_io(dir, e))? {
            let path = child.path();
            // Follow symlinks so linked snippet files and folders count
            let kind = match tokio::fs::metadata(&path).await {
                Ok(metadata) => kind_of(metadata.file_type()),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "LocalFileSystem::contents: dangling entry");
                    EntryKind::Other
                }
            };
            entries.push(Entry {
                name: child.file_name().to_string_lossy().to_string(),
                path,
                kind,
            });
        }

        debug!(count = entries.len(), "LocalFileSystem::contents: done");
        Ok(entries)
    }

    async fn make_directory(&self, path: &Path, mode: u32) -> Result<()> {
        debug!(path = %path.display(), mode = %format!("{:o}", mode), "LocalFileSystem::make_directory: called");
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path).await.map_err(|e| SnippetError::from_io(path, e))
    }
}

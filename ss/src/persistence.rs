//! Snippet file operations: create, rename, overwrite, delete, edit
//!
//! Every failure is reported where it is detected and returned, so callers
//! can stop (keep a dialog open, skip the store update).

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SnippetError};
use crate::manager::SnippetManager;
use crate::snippet::{NewSnippet, Snippet, SnippetDraft};
use crate::store::LoadOutcome;

impl SnippetManager {
    /// Write a new snippet file into the default directory and load it
    ///
    /// Fails with `InvalidName` when `name` is not a plain file name and with
    /// `AlreadyExists` when the file is already there.
    pub async fn create(&mut self, name: &str, template: &str) -> Result<LoadOutcome> {
        debug!(%name, "create: called");
        SnippetDraft::new(name, template).validate().map_err(|e| self.surface(e))?;
        let target = PathBuf::from(format!("{}{}", self.default_directory(), name));

        match self.fs.resolve(&target).await {
            Err(e) if e.is_not_found() => debug!(target = %target.display(), "create: target is free"),
            Err(e) => return Err(self.surface(e)),
            Ok(_) => return Err(self.surface(SnippetError::AlreadyExists { path: target })),
        }

        self.fs.write(&target, template).await.map_err(|e| self.surface(e))?;

        let outcome = self.store.load(NewSnippet::from_file(name, template, &target));
        info!(%name, path = %target.display(), ?outcome, "Created snippet");
        Ok(outcome)
    }

    /// Rename a snippet file within its directory, returning the new path
    pub async fn rename(&self, old_name: &str, new_name: &str, old_full_path: &Path) -> Result<PathBuf> {
        debug!(%old_name, %new_name, path = %old_full_path.display(), "rename: called");
        let new_full_path = old_full_path.with_file_name(new_name);

        self.fs.resolve(old_full_path).await.map_err(|e| self.surface(e))?;

        match self.fs.rename(old_full_path, &new_full_path).await {
            Ok(()) => {
                debug!(path = %new_full_path.display(), "rename: done");
                Ok(new_full_path)
            }
            Err(e) if e.is_already_exists() => Err(self.surface(SnippetError::AlreadyExists { path: new_full_path })),
            Err(e) => Err(self.surface(e)),
        }
    }

    /// Write `content` to `full_path` whatever the resolve says
    ///
    /// The file may have just been renamed, so a failed resolve is not fatal.
    pub async fn overwrite(&self, full_path: &Path, content: &str) -> Result<()> {
        debug!(path = %full_path.display(), "overwrite: called");
        if let Err(e) = self.fs.resolve(full_path).await {
            debug!(error = %e, "overwrite: resolve failed, writing anyway");
        }

        self.fs.write(full_path, content).await.map_err(|e| self.surface(e))
    }

    /// Remove the snippet's file, then the snippet
    pub async fn delete(&mut self, record: &Snippet) -> Result<()> {
        debug!(id = record.id, name = %record.name, "delete: called");
        let Some(path) = record.file_path.as_deref() else {
            return Err(self.surface(SnippetError::MissingFilePath {
                name: record.name.clone(),
            }));
        };

        self.fs.resolve(path).await.map_err(|e| self.surface(e))?;
        self.fs.unlink(path).await.map_err(|e| self.surface(e))?;

        let removed = self.store.delete(record.id);
        info!(name = %record.name, removed, "Deleted snippet");
        Ok(())
    }

    /// Apply `draft` to a directory snippet: rename if needed, write, then update the store
    pub async fn edit(&mut self, record: &Snippet, draft: SnippetDraft) -> Result<Snippet> {
        debug!(id = record.id, old_name = %record.name, new_name = %draft.name, "edit: called");
        if !record.is_directory_snippet() {
            return Err(self.surface(SnippetError::NotDirectorySnippet {
                name: record.name.clone(),
            }));
        }
        draft.validate().map_err(|e| self.surface(e))?;

        let Some(current_path) = record.file_path.clone() else {
            return Err(self.surface(SnippetError::MissingFilePath {
                name: record.name.clone(),
            }));
        };

        let path = if draft.name != record.name {
            if let Some(other) = self.store.find_other_named(&draft.name, record.id) {
                let path = other
                    .file_path
                    .clone()
                    .unwrap_or_else(|| current_path.with_file_name(&draft.name));
                return Err(self.surface(SnippetError::AlreadyExists { path }));
            }
            self.rename(&record.name, &draft.name, &current_path).await?
        } else {
            current_path
        };

        self.overwrite(&path, &draft.template).await?;

        let updated = Snippet {
            id: record.id,
            name: draft.name,
            template: draft.template,
            source: record.source,
            file_path: Some(path),
        };
        self.store.update(updated.clone()).map_err(|e| self.surface(e))?;
        info!(id = updated.id, name = %updated.name, "Edited snippet");
        Ok(updated)
    }

    /// Empty the collection; files on disk are left alone
    pub fn clear_all(&mut self) -> usize {
        debug!("clear_all: called");
        self.store.clear()
    }
}

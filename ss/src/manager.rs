//! SnippetManager - owns the snippet store and the collaborators it persists through
//!
//! Disk is the durable copy of every directory snippet; the store is a cache
//! of it. Operations that touch disk finish there before the store changes.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::dialog::{QUESTION, SNIPPET_DELETE_ALL_CONFIRM, SNIPPET_DELETE_CONFIRM, SnippetDialog};
use crate::error::{Result, SnippetError};
use crate::fs::FileSystem;
use crate::prefs::Preferences;
use crate::reporter::ErrorReporter;
use crate::snippet::{NewSnippet, Snippet, SnippetDraft, SnippetId};
use crate::store::{LoadOutcome, SnippetStore};

/// Paths the manager needs besides preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// The computed default snippet directory is `<app_support_dir>/snippets/`
    pub app_support_dir: PathBuf,
    /// Used when preferences carry no default directory
    pub default_snippet_directory: Option<String>,
    /// Bundled snippet sets, one subdirectory each
    pub default_snippets_path: PathBuf,
}

impl From<&Config> for ManagerOptions {
    fn from(config: &Config) -> Self {
        Self {
            app_support_dir: config.app_support_dir.clone(),
            default_snippet_directory: config.default_snippet_directory.clone(),
            default_snippets_path: config.default_snippets_path.clone(),
        }
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Forward slashes, exactly one trailing slash
pub fn normalize_directory(directory: &str) -> String {
    let mut normalized = directory.replace('\\', "/").trim_end_matches('/').to_string();
    normalized.push('/');
    normalized
}

pub struct SnippetManager {
    pub(crate) store: SnippetStore,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) prefs: Box<dyn Preferences>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) options: ManagerOptions,
}

impl SnippetManager {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        prefs: Box<dyn Preferences>,
        reporter: Arc<dyn ErrorReporter>,
        options: ManagerOptions,
    ) -> Self {
        debug!(?options, "SnippetManager::new: called");
        Self {
            store: SnippetStore::new(),
            fs,
            prefs,
            reporter,
            options,
        }
    }

    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    pub fn preferences(&self) -> &dyn Preferences {
        self.prefs.as_ref()
    }

    pub fn get_all(&self) -> &[Snippet] {
        self.store.get_all()
    }

    pub fn search(&self, query: Option<&str>) -> Result<Vec<&Snippet>> {
        self.store.search(query)
    }

    /// Feed a candidate into the store under the precedence rule
    pub fn load_snippet(&mut self, candidate: NewSnippet) -> LoadOutcome {
        self.store.load(candidate)
    }

    /// `<app_support_dir>/snippets/`
    pub fn computed_default_directory(&self) -> String {
        normalize_directory(&self.options.app_support_dir.join("snippets").to_string_lossy())
    }

    /// The default snippet directory currently in effect
    pub fn default_directory(&self) -> String {
        let directory = self
            .prefs
            .default_snippet_directory()
            .filter(|d| !d.is_empty())
            .or_else(|| self.options.default_snippet_directory.clone().filter(|d| !d.is_empty()))
            .unwrap_or_else(|| self.computed_default_directory());
        normalize_directory(&directory)
    }

    /// Report a failure and hand it back for propagation
    pub(crate) fn surface(&self, err: SnippetError) -> SnippetError {
        self.reporter.report(&err);
        err
    }

    /// Ask for a new snippet until it is saved or the dialog is cancelled
    pub async fn add_new_snippet_dialog(
        &mut self,
        dialog: &dyn SnippetDialog,
        initial: SnippetDraft,
    ) -> Option<LoadOutcome> {
        debug!(name = %initial.name, "add_new_snippet_dialog: called");
        let mut draft = initial;
        loop {
            let submission = dialog.present(&draft).await?;
            match self.create(&submission.name, &submission.template).await {
                Ok(outcome) => {
                    dialog.complete(Ok(())).await;
                    return Some(outcome);
                }
                Err(e) => {
                    debug!(error = %e, "add_new_snippet_dialog: submission rejected, presenting again");
                    dialog.complete(Err(&e)).await;
                    draft = submission;
                }
            }
        }
    }

    /// Edit a directory snippet until the change is saved or the dialog is cancelled
    pub async fn edit_snippet_dialog(&mut self, dialog: &dyn SnippetDialog, id: SnippetId) -> Result<Option<Snippet>> {
        debug!(id, "edit_snippet_dialog: called");
        let record = match self.store.get(id) {
            Some(record) => record.clone(),
            None => return Err(self.surface(SnippetError::UnknownSnippet(id))),
        };
        if !record.is_directory_snippet() {
            return Err(self.surface(SnippetError::NotDirectorySnippet { name: record.name }));
        }

        let mut draft = record.draft();
        loop {
            let Some(submission) = dialog.present(&draft).await else {
                debug!("edit_snippet_dialog: cancelled");
                return Ok(None);
            };

            match self.edit(&record, submission.clone()).await {
                Ok(updated) => {
                    dialog.complete(Ok(())).await;
                    return Ok(Some(updated));
                }
                Err(e) => {
                    debug!(error = %e, "edit_snippet_dialog: submission rejected, presenting again");
                    dialog.complete(Err(&e)).await;
                    draft = submission;
                }
            }
        }
    }

    /// Confirm, then delete one snippet and its file
    pub async fn delete_snippet_dialog(&mut self, dialog: &dyn SnippetDialog, id: SnippetId) -> Result<bool> {
        debug!(id, "delete_snippet_dialog: called");
        if !dialog.ask_yes_no(QUESTION, SNIPPET_DELETE_CONFIRM).await {
            debug!("delete_snippet_dialog: declined");
            return Ok(false);
        }

        let record = match self.store.get(id) {
            Some(record) => record.clone(),
            None => return Err(self.surface(SnippetError::UnknownSnippet(id))),
        };
        self.delete(&record).await?;
        Ok(true)
    }

    /// Confirm, then empty the store; files stay on disk
    pub async fn delete_all_snippets_dialog(&mut self, dialog: &dyn SnippetDialog) -> Option<usize> {
        debug!("delete_all_snippets_dialog: called");
        if !dialog.ask_yes_no(QUESTION, SNIPPET_DELETE_ALL_CONFIRM).await {
            debug!("delete_all_snippets_dialog: declined");
            return None;
        }
        let removed = self.clear_all();
        info!(removed, "Removed all snippets from the collection");
        Some(removed)
    }
}

//! Confirmation and edit dialogs presented by the host

use async_trait::async_trait;

use crate::error::SnippetError;
use crate::snippet::SnippetDraft;

pub const QUESTION: &str = "Question";
pub const SNIPPET_DELETE_CONFIRM: &str = "Are you sure you want to delete this snippet?";
pub const SNIPPET_DELETE_ALL_CONFIRM: &str = "Are you sure you want to delete all snippets?";

/// Host dialogs, driven by the manager
///
/// Editing is two-phase: `present` hands back a submission, the manager
/// validates and persists it, then `complete` tells the dialog whether it may
/// close. After a failed `complete` the manager presents the rejected
/// submission again.
#[async_trait]
pub trait SnippetDialog: Send + Sync {
    /// Ask a yes/no question; `false` when the user declines or dismisses
    async fn ask_yes_no(&self, title: &str, message: &str) -> bool;

    /// Show `draft` for editing; `None` when the user cancels
    async fn present(&self, draft: &SnippetDraft) -> Option<SnippetDraft>;

    /// Outcome of persisting the last submission
    async fn complete(&self, outcome: Result<(), &SnippetError>);
}

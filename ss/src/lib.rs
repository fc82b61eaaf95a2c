//! SnippetStore - file-backed snippet collection for code editors
//!
//! Snippets are reusable code templates kept one per file: the file name is
//! the snippet name and the content is the template, verbatim. The manager
//! scans registered directories at startup, keeps the snippets in a sorted
//! in-memory collection, and writes every add/edit/delete back to disk.
//!
//! # Layout
//!
//! ```text
//! <app support>/snippets/        # default snippet directory, always scanned
//! ├── for-loop.rs
//! └── match-arm.rs
//! <install>/default_snippets/    # bundled sets, registered on first start
//! ├── javascript/
//! └── rust/
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use snippetstore::{FilePreferences, LocalFileSystem, LogReporter, ManagerOptions, SnippetManager};
//!
//! let prefs = FilePreferences::open("preferences.yml")?;
//! let mut manager = SnippetManager::new(
//!     Arc::new(LocalFileSystem::new()),
//!     Box::new(prefs),
//!     Arc::new(LogReporter),
//!     ManagerOptions::default(),
//! );
//! manager.init().await?;
//! manager.create("hello.rs", "fn main() {}\n").await?;
//! let hits = manager.search(Some("hello"))?;
//! ```

pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod fs;
pub mod pattern;
pub mod prefs;
pub mod reporter;
pub mod snippet;

mod bootstrap;
mod loader;
mod manager;
mod persistence;
mod store;

#[cfg(test)]
mod testing;

pub use bootstrap::DEFAULT_DIRECTORY_MODE;
pub use config::Config;
pub use dialog::SnippetDialog;
pub use error::{Result, SnippetError};
pub use fs::{Entry, EntryKind, FileSystem, LocalFileSystem};
pub use loader::LoadSummary;
pub use manager::{ManagerOptions, SnippetManager, normalize_directory};
pub use prefs::{DirectoryRegistration, FilePreferences, PreferenceValues, Preferences};
pub use reporter::{ErrorReporter, LogReporter, MemoryReporter};
pub use snippet::{NewSnippet, Snippet, SnippetDraft, SnippetId, SnippetSource};
pub use store::{LoadOutcome, SnippetStore};

/// Name of the bundled snippet sets folder
pub const DEFAULT_SNIPPETS_DIR_NAME: &str = "default_snippets";

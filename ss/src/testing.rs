//! Shared fixtures for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::dialog::SnippetDialog;
use crate::error::{Result, SnippetError};
use crate::fs::{Entry, FileSystem, LocalFileSystem};
use crate::manager::{ManagerOptions, SnippetManager, normalize_directory};
use crate::prefs::{FilePreferences, PreferenceValues};
use crate::reporter::MemoryReporter;
use crate::snippet::SnippetDraft;

/// LocalFileSystem that counts every call
#[derive(Debug, Default)]
pub(crate) struct CountingFileSystem {
    inner: LocalFileSystem,
    calls: AtomicUsize,
}

impl CountingFileSystem {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileSystem for CountingFileSystem {
    async fn resolve(&self, path: &Path) -> Result<Entry> {
        self.tick();
        self.inner.resolve(path).await
    }

    async fn read(&self, path: &Path) -> Result<String> {
        self.tick();
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.tick();
        self.inner.write(path, content).await
    }

    async fn unlink(&self, path: &Path) -> Result<()> {
        self.tick();
        self.inner.unlink(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.tick();
        self.inner.rename(from, to).await
    }

    async fn contents(&self, dir: &Path) -> Result<Vec<Entry>> {
        self.tick();
        self.inner.contents(dir).await
    }

    async fn make_directory(&self, path: &Path, mode: u32) -> Result<()> {
        self.tick();
        self.inner.make_directory(path, mode).await
    }
}

/// A manager over a temp dir: `app/` is the app support dir, `bundled/` the
/// default snippets folder, `snippets/` the default snippet directory
pub(crate) struct TestBed {
    pub temp: TempDir,
    pub fs: Arc<CountingFileSystem>,
    pub reporter: MemoryReporter,
    pub manager: SnippetManager,
}

impl TestBed {
    /// Default directory set in preferences but not created
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let default_dir = normalize_directory(&temp.path().join("snippets").to_string_lossy());
        let prefs = FilePreferences::in_memory().with_values(PreferenceValues {
            snippet_directories: Vec::new(),
            default_snippet_directory: Some(default_dir),
        });
        Self::with_preferences(temp, prefs)
    }

    /// Default directory set in preferences and present on disk
    pub fn with_default_dir() -> Self {
        let bed = Self::new();
        std::fs::create_dir_all(bed.default_path()).unwrap();
        bed
    }

    pub fn with_preferences(temp: TempDir, prefs: FilePreferences) -> Self {
        let fs = Arc::new(CountingFileSystem::default());
        let reporter = MemoryReporter::new();
        let options = ManagerOptions {
            app_support_dir: temp.path().join("app"),
            default_snippet_directory: None,
            default_snippets_path: temp.path().join("bundled"),
        };
        let manager = SnippetManager::new(fs.clone(), Box::new(prefs), Arc::new(reporter.clone()), options);
        Self {
            temp,
            fs,
            reporter,
            manager,
        }
    }

    pub fn default_dir(&self) -> String {
        normalize_directory(&self.temp.path().join("snippets").to_string_lossy())
    }

    pub fn default_path(&self) -> PathBuf {
        self.temp.path().join("snippets")
    }
}

/// Dialog that replays queued submissions and a fixed yes/no answer
#[derive(Debug, Default)]
pub(crate) struct ScriptedDialog {
    submissions: Mutex<VecDeque<Option<SnippetDraft>>>,
    answer: bool,
    presented: AtomicUsize,
    completions: Mutex<Vec<bool>>,
}

impl ScriptedDialog {
    pub fn new(submissions: Vec<Option<SnippetDraft>>) -> Self {
        Self {
            submissions: Mutex::new(submissions.into()),
            ..Default::default()
        }
    }

    pub fn answering(mut self, answer: bool) -> Self {
        self.answer = answer;
        self
    }

    pub fn presented(&self) -> usize {
        self.presented.load(Ordering::SeqCst)
    }

    /// `true` per successful completion, `false` per rejected one
    pub fn completions(&self) -> Vec<bool> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnippetDialog for ScriptedDialog {
    async fn ask_yes_no(&self, _title: &str, _message: &str) -> bool {
        self.answer
    }

    async fn present(&self, _draft: &SnippetDraft) -> Option<SnippetDraft> {
        self.presented.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().unwrap().pop_front().flatten()
    }

    async fn complete(&self, outcome: std::result::Result<(), &SnippetError>) {
        self.completions.lock().unwrap().push(outcome.is_ok());
    }
}

//! Bulk loading of snippet directories
//!
//! Directory listings and file reads run concurrently on the calling task;
//! each snippet enters the store as soon as its read completes, so load order
//! across files and directories is unspecified. A failing directory or file
//! is reported and skipped without affecting the others.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{Result, SnippetError};
use crate::fs::{Entry, FileSystem};
use crate::manager::SnippetManager;
use crate::prefs::DirectoryRegistration;
use crate::snippet::NewSnippet;

/// Counts from one `load_from_directories` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Directories listed successfully
    pub directories: usize,
    /// Snippets accepted by the store
    pub loaded: usize,
    /// Snippets dropped by load precedence
    pub ignored: usize,
    /// Directories or files that could not be loaded
    pub failed: usize,
}

enum Step {
    Listed { index: usize, result: Result<Vec<Entry>> },
    Read { entry: Entry, result: Result<String> },
}

async fn list_directory(fs: &dyn FileSystem, index: usize, path: PathBuf) -> Step {
    let result = match fs.resolve(&path).await {
        Ok(entry) if entry.is_directory() => fs.contents(&path).await,
        Ok(_) => Err(SnippetError::NotADirectory { path }),
        Err(e) => Err(e),
    };
    Step::Listed { index, result }
}

async fn read_file(fs: &dyn FileSystem, entry: Entry) -> Step {
    let result = fs.read(&entry.path).await;
    Step::Read { entry, result }
}

impl SnippetManager {
    /// Load every auto-load directory plus the default directory into the store
    pub async fn load_from_directories(&mut self) -> LoadSummary {
        let mut registrations = self.prefs.snippet_directories();
        let persisted = registrations.len();
        // The default directory is always scanned but never persisted as a registration
        registrations.push(DirectoryRegistration::new(self.default_directory()));
        debug!(count = registrations.len(), "load_from_directories: called");

        let fs: &dyn FileSystem = self.fs.as_ref();
        let mut summary = LoadSummary::default();
        let mut pending: FuturesUnordered<BoxFuture<'_, Step>> = FuturesUnordered::new();
        let mut disabled = Vec::new();

        for (index, registration) in registrations.iter().enumerate() {
            if !registration.auto_load {
                debug!(path = %registration.full_path, "load_from_directories: skipping directory");
                continue;
            }
            if !fs.is_absolute_path(&registration.full_path) {
                self.reporter.report(&SnippetError::NotAbsolute {
                    path: registration.full_path.clone(),
                });
                summary.failed += 1;
                disabled.push(index);
                continue;
            }
            pending.push(list_directory(fs, index, PathBuf::from(&registration.full_path)).boxed());
        }

        while let Some(step) = pending.next().await {
            match step {
                Step::Listed { result: Ok(entries), .. } => {
                    summary.directories += 1;
                    for entry in entries.into_iter().filter(Entry::is_file) {
                        pending.push(read_file(fs, entry).boxed());
                    }
                }
                Step::Listed { index, result: Err(e) } => {
                    if matches!(e, SnippetError::NotADirectory { .. }) {
                        disabled.push(index);
                    }
                    self.reporter.report(&e);
                    summary.failed += 1;
                }
                Step::Read { entry, result: Ok(content) } => {
                    let outcome = self.store.load(NewSnippet::from_file(entry.name, content, entry.path));
                    if outcome.is_ignored() {
                        summary.ignored += 1;
                    } else {
                        summary.loaded += 1;
                    }
                }
                Step::Read { result: Err(e), .. } => {
                    self.reporter.report(&e);
                    summary.failed += 1;
                }
            }
        }
        drop(pending);

        if !disabled.is_empty() {
            for &index in &disabled {
                warn!(path = %registrations[index].full_path, "Disabling auto-load for snippet directory");
                registrations[index].auto_load = false;
            }
            registrations.truncate(persisted);
            if disabled.iter().any(|&index| index < persisted)
                && let Err(e) = self.prefs.set_snippet_directories(registrations)
            {
                self.reporter.report(&e);
            }
        }

        info!(
            directories = summary.directories,
            loaded = summary.loaded,
            ignored = summary.ignored,
            failed = summary.failed,
            "Loaded snippets from directories"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{FilePreferences, PreferenceValues};
    use crate::snippet::SnippetSource;
    use crate::testing::TestBed;
    use std::fs;
    use tempfile::TempDir;

    fn bed_with_directories(build: impl FnOnce(&std::path::Path) -> Vec<DirectoryRegistration>) -> TestBed {
        let temp = TempDir::new().unwrap();
        let snippet_directories = build(temp.path());
        let default_dir = crate::manager::normalize_directory(&temp.path().join("snippets").to_string_lossy());
        fs::create_dir_all(temp.path().join("snippets")).unwrap();
        let prefs = FilePreferences::in_memory().with_values(PreferenceValues {
            snippet_directories,
            default_snippet_directory: Some(default_dir),
        });
        TestBed::with_preferences(temp, prefs)
    }

    #[tokio::test]
    async fn test_loads_default_directory_files() {
        let mut bed = TestBed::with_default_dir();
        fs::write(bed.default_path().join("for.rs"), "for x in xs {}").unwrap();
        fs::write(bed.default_path().join("main.rs"), "fn main() {}").unwrap();
        fs::create_dir(bed.default_path().join("nested")).unwrap();

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.directories, 1);
        assert_eq!(summary.loaded, 2);
        let names: Vec<&str> = bed.manager.get_all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["for.rs", "main.rs"]);
        let main = bed.manager.store().find_by_name("main.rs").unwrap();
        assert_eq!(main.template, "fn main() {}");
        assert_eq!(main.source, SnippetSource::Directory);
        assert_eq!(main.file_path.as_deref(), Some(bed.default_path().join("main.rs").as_path()));
    }

    #[tokio::test]
    async fn test_registered_directories_are_loaded() {
        let mut bed = bed_with_directories(|root| {
            let rust = root.join("sets").join("rust");
            fs::create_dir_all(&rust).unwrap();
            fs::write(rust.join("impl"), "impl X {}").unwrap();
            vec![DirectoryRegistration::new(rust.to_string_lossy())]
        });

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.directories, 2);
        assert_eq!(summary.loaded, 1);
        assert!(bed.manager.store().find_by_name("impl").is_some());
    }

    #[tokio::test]
    async fn test_skips_directories_without_auto_load() {
        let mut bed = bed_with_directories(|root| {
            let off = root.join("off");
            fs::create_dir_all(&off).unwrap();
            fs::write(off.join("hidden"), "x").unwrap();
            vec![DirectoryRegistration {
                full_path: off.to_string_lossy().to_string(),
                auto_load: false,
            }]
        });

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.loaded, 0);
        assert!(bed.manager.store().is_empty());
        assert!(bed.reporter.is_empty());
    }

    #[tokio::test]
    async fn test_relative_directory_is_disabled() {
        let mut bed = bed_with_directories(|_| vec![DirectoryRegistration::new("relative/snippets")]);

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.failed, 1);
        let registrations = bed.manager.preferences().snippet_directories();
        assert_eq!(registrations.len(), 1);
        assert!(!registrations[0].auto_load);
        assert!(bed.reporter.messages()[0].contains("not an absolute path"));
    }

    #[tokio::test]
    async fn test_file_registration_is_disabled() {
        let mut bed = bed_with_directories(|root| {
            let file = root.join("not-a-dir");
            fs::write(&file, "x").unwrap();
            vec![DirectoryRegistration::new(file.to_string_lossy())]
        });

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.failed, 1);
        assert!(!bed.manager.preferences().snippet_directories()[0].auto_load);
        assert!(bed.reporter.messages()[0].contains("is not a directory"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_reported_but_stays_enabled() {
        let mut bed = bed_with_directories(|root| {
            let good = root.join("good");
            fs::create_dir_all(&good).unwrap();
            fs::write(good.join("ok"), "fine").unwrap();
            vec![
                DirectoryRegistration::new(root.join("vanished").to_string_lossy()),
                DirectoryRegistration::new(good.to_string_lossy()),
            ]
        });

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.loaded, 1);
        assert!(bed.manager.store().find_by_name("ok").is_some());
        assert!(bed.manager.preferences().snippet_directories().iter().all(|r| r.auto_load));
    }

    #[tokio::test]
    async fn test_same_name_in_two_directories_keeps_one() {
        let mut bed = bed_with_directories(|root| {
            let other = root.join("other");
            fs::create_dir_all(&other).unwrap();
            fs::write(other.join("dup"), "from other").unwrap();
            vec![DirectoryRegistration::new(other.to_string_lossy())]
        });
        fs::write(bed.default_path().join("dup"), "from default").unwrap();

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.loaded, 2);
        assert_eq!(bed.manager.store().len(), 1);
    }

    #[tokio::test]
    async fn test_user_snippet_outranks_directory_file() {
        let mut bed = TestBed::with_default_dir();
        bed.manager.load_snippet(NewSnippet {
            name: "pinned".to_string(),
            template: "mine".to_string(),
            source: SnippetSource::User,
            file_path: None,
        });
        fs::write(bed.default_path().join("pinned"), "from disk").unwrap();

        let summary = bed.manager.load_from_directories().await;

        assert_eq!(summary.ignored, 1);
        assert_eq!(bed.manager.store().find_by_name("pinned").unwrap().template, "mine");
        assert!(bed.reporter.is_empty());
    }
}

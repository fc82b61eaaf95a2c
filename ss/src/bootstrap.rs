//! Startup: default directory, bundled snippet sets, initial load

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Result, SnippetError};
use crate::loader::LoadSummary;
use crate::manager::{SnippetManager, normalize_directory};
use crate::prefs::DirectoryRegistration;

/// Access mode for a newly created default directory
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o777;

impl SnippetManager {
    /// Make sure the default snippet directory exists and record it in preferences
    ///
    /// On failure the preference is reset to the computed default, so a bad
    /// manual override heals on the next start.
    pub async fn ensure_default_directory(&mut self) -> Result<String> {
        let directory = self.default_directory();
        debug!(%directory, "ensure_default_directory: called");

        match self.prepare_default_directory(&directory).await {
            Ok(()) => {
                self.prefs
                    .set_default_snippet_directory(directory.clone())
                    .map_err(|e| self.surface(e))?;
                Ok(directory)
            }
            Err(e) => {
                let fallback = self.computed_default_directory();
                warn!(%directory, %fallback, "Resetting default snippet directory");
                if let Err(pe) = self.prefs.set_default_snippet_directory(fallback) {
                    self.reporter.report(&pe);
                }
                Err(e)
            }
        }
    }

    async fn prepare_default_directory(&self, directory: &str) -> Result<()> {
        let path = Path::new(directory);
        match self.fs.resolve(path).await {
            Ok(entry) if entry.is_directory() => {
                debug!("prepare_default_directory: directory exists");
                Ok(())
            }
            Ok(_) => Err(self.surface(SnippetError::NotADirectory {
                path: path.to_path_buf(),
            })),
            Err(e) if e.is_not_found() => {
                self.fs
                    .make_directory(path, DEFAULT_DIRECTORY_MODE)
                    .await
                    .map_err(|e| self.surface(e))?;
                info!(%directory, "Created default snippet directory");
                Ok(())
            }
            Err(e) => Err(self.surface(e)),
        }
    }

    /// Register every bundled snippet set as an auto-load directory, returning how many were new
    pub async fn check_default_snippets_directories(&mut self) -> Result<usize> {
        let root = self.options.default_snippets_path.clone();
        debug!(root = %root.display(), "check_default_snippets_directories: called");

        self.fs.resolve(&root).await.map_err(|e| self.surface(e))?;
        let entries = self.fs.contents(&root).await.map_err(|e| self.surface(e))?;

        let mut registrations = self.prefs.snippet_directories();
        let mut added = 0;
        for entry in entries.iter().filter(|e| e.is_directory()) {
            let full_path = normalize_directory(&entry.path.to_string_lossy());
            if registrations.iter().any(|r| normalize_directory(&r.full_path) == full_path) {
                continue;
            }
            debug!(%full_path, "check_default_snippets_directories: registering");
            registrations.push(DirectoryRegistration::new(full_path));
            added += 1;
        }

        if added > 0 {
            self.prefs
                .set_snippet_directories(registrations)
                .map_err(|e| self.surface(e))?;
            info!(added, "Registered bundled snippet directories");
        }
        Ok(added)
    }

    /// Startup sequence; a failure in the first two steps stops it
    pub async fn init(&mut self) -> Result<LoadSummary> {
        debug!("init: called");
        self.ensure_default_directory().await?;
        self.check_default_snippets_directories().await?;
        Ok(self.load_from_directories().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Entry, FileSystem, LocalFileSystem};
    use crate::manager::ManagerOptions;
    use crate::prefs::{FilePreferences, PreferenceValues};
    use crate::reporter::MemoryReporter;
    use crate::testing::TestBed;
    use async_trait::async_trait;
    use std::fs;
    use std::io;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn bed_with_default(default_snippet_directory: Option<String>) -> TestBed {
        let temp = TempDir::new().unwrap();
        let prefs = FilePreferences::in_memory().with_values(PreferenceValues {
            snippet_directories: Vec::new(),
            default_snippet_directory,
        });
        TestBed::with_preferences(temp, prefs)
    }

    #[tokio::test]
    async fn test_missing_default_directory_is_created_and_persisted() {
        let mut bed = TestBed::new();
        assert!(!bed.default_path().exists());

        let directory = bed.manager.ensure_default_directory().await.unwrap();

        assert_eq!(directory, bed.default_dir());
        assert!(bed.default_path().is_dir());
        assert_eq!(
            bed.manager.preferences().default_snippet_directory().as_deref(),
            Some(bed.default_dir().as_str())
        );
    }

    #[tokio::test]
    async fn test_unset_preference_uses_computed_default() {
        let mut bed = bed_with_default(None);

        let directory = bed.manager.ensure_default_directory().await.unwrap();

        assert_eq!(directory, bed.manager.computed_default_directory());
        assert!(bed.temp.path().join("app").join("snippets").is_dir());
    }

    #[tokio::test]
    async fn test_trailing_slashes_are_normalized() {
        let bed_temp = TempDir::new().unwrap();
        let raw = bed_temp.path().join("custom").to_string_lossy().to_string();
        let mut bed = bed_with_default(Some(format!("{}//", raw)));

        let directory = bed.manager.ensure_default_directory().await.unwrap();

        assert_eq!(directory, format!("{}/", raw));
        assert!(bed_temp.path().join("custom").is_dir());
    }

    #[tokio::test]
    async fn test_file_in_place_of_directory_resets_preference() {
        let mut bed = TestBed::new();
        fs::write(bed.default_path(), "i am a file").unwrap();

        let err = bed.manager.ensure_default_directory().await.unwrap_err();

        assert!(matches!(err, SnippetError::NotADirectory { .. }));
        assert_eq!(
            bed.manager.preferences().default_snippet_directory(),
            Some(bed.manager.computed_default_directory())
        );
        assert_eq!(bed.reporter.messages().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unresolvable_directory_resets_preference() {
        let mut bed = TestBed::new();
        // A regular file as parent makes the path unresolvable
        fs::write(bed.temp.path().join("blocker"), "x").unwrap();
        let bad = format!("{}/", bed.temp.path().join("blocker").join("snippets").display());
        bed.manager.prefs.set_default_snippet_directory(bad).unwrap();

        let err = bed.manager.ensure_default_directory().await.unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(
            bed.manager.preferences().default_snippet_directory(),
            Some(bed.manager.computed_default_directory())
        );
    }

    /// Resolves through the local disk but refuses to create directories
    struct ReadOnlyFileSystem(LocalFileSystem);

    #[async_trait]
    impl FileSystem for ReadOnlyFileSystem {
        async fn resolve(&self, path: &Path) -> Result<Entry> {
            self.0.resolve(path).await
        }

        async fn read(&self, path: &Path) -> Result<String> {
            self.0.read(path).await
        }

        async fn write(&self, path: &Path, _content: &str) -> Result<()> {
            Err(SnippetError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied)))
        }

        async fn unlink(&self, path: &Path) -> Result<()> {
            Err(SnippetError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied)))
        }

        async fn rename(&self, from: &Path, _to: &Path) -> Result<()> {
            Err(SnippetError::from_io(from, io::Error::from(io::ErrorKind::PermissionDenied)))
        }

        async fn contents(&self, dir: &Path) -> Result<Vec<Entry>> {
            self.0.contents(dir).await
        }

        async fn make_directory(&self, path: &Path, _mode: u32) -> Result<()> {
            Err(SnippetError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied)))
        }
    }

    #[tokio::test]
    async fn test_failed_creation_resets_preference() {
        let temp = TempDir::new().unwrap();
        let wanted = normalize_directory(&temp.path().join("wanted").to_string_lossy());
        let prefs = FilePreferences::in_memory().with_values(PreferenceValues {
            snippet_directories: Vec::new(),
            default_snippet_directory: Some(wanted),
        });
        let reporter = MemoryReporter::new();
        let mut manager = SnippetManager::new(
            Arc::new(ReadOnlyFileSystem(LocalFileSystem::new())),
            Box::new(prefs),
            Arc::new(reporter.clone()),
            ManagerOptions {
                app_support_dir: temp.path().join("app"),
                default_snippet_directory: None,
                default_snippets_path: temp.path().join("bundled"),
            },
        );

        let err = manager.ensure_default_directory().await.unwrap_err();

        assert!(matches!(err, SnippetError::Io { .. }));
        assert!(!temp.path().join("wanted").exists());
        assert_eq!(
            manager.preferences().default_snippet_directory(),
            Some(manager.computed_default_directory())
        );
        assert_eq!(reporter.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_hand_entered_registration_without_slash_is_not_duplicated() {
        let mut bed = TestBed::with_default_dir();
        let rust = bed.temp.path().join("bundled").join("rust");
        fs::create_dir_all(&rust).unwrap();
        bed.manager
            .prefs
            .set_snippet_directories(vec![DirectoryRegistration::new(rust.to_string_lossy().to_string())])
            .unwrap();

        assert_eq!(bed.manager.check_default_snippets_directories().await.unwrap(), 0);
        assert_eq!(bed.manager.preferences().snippet_directories().len(), 1);
    }

    #[tokio::test]
    async fn test_bundled_directories_registered_once() {
        let mut bed = TestBed::with_default_dir();
        let bundled = bed.temp.path().join("bundled");
        fs::create_dir_all(bundled.join("rust")).unwrap();
        fs::create_dir_all(bundled.join("javascript")).unwrap();
        fs::write(bundled.join("README"), "not a set").unwrap();

        assert_eq!(bed.manager.check_default_snippets_directories().await.unwrap(), 2);
        assert_eq!(bed.manager.check_default_snippets_directories().await.unwrap(), 0);

        let registrations = bed.manager.preferences().snippet_directories();
        assert_eq!(registrations.len(), 2);
        assert!(registrations.iter().all(|r| r.auto_load && r.full_path.ends_with('/')));
    }

    #[tokio::test]
    async fn test_missing_bundled_folder_fails() {
        let mut bed = TestBed::with_default_dir();

        let err = bed.manager.check_default_snippets_directories().await.unwrap_err();

        assert!(err.is_not_found());
        assert!(!bed.reporter.is_empty());
    }

    #[tokio::test]
    async fn test_init_runs_the_whole_sequence() {
        let mut bed = TestBed::new();
        let set = bed.temp.path().join("bundled").join("rust");
        fs::create_dir_all(&set).unwrap();
        fs::write(set.join("fn"), "fn name() {}").unwrap();

        let summary = bed.manager.init().await.unwrap();

        assert_eq!(summary.directories, 2);
        assert_eq!(summary.loaded, 1);
        assert!(bed.default_path().is_dir());
        assert_eq!(bed.manager.store().find_by_name("fn").unwrap().template, "fn name() {}");
    }

    #[tokio::test]
    async fn test_init_stops_when_bundled_folder_is_missing() {
        let mut bed = TestBed::new();
        fs::create_dir_all(bed.default_path()).unwrap();
        fs::write(bed.default_path().join("never"), "loaded").unwrap();

        assert!(bed.manager.init().await.is_err());
        assert!(bed.manager.store().is_empty());
    }
}

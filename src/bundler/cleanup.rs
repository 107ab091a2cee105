//! Scoped temporary directories and files.
//!
//! Every ephemeral path a pipeline run creates (staging trees, manifest and
//! entitlement files, asset catalogs, `Payload/` wrappers) is allocated here
//! and removed when its handle drops, on success, early `?` return or panic.
//! Names come from `tempfile`, so concurrent runs never share a root.

use crate::bundler::error::{ErrorExt, Result};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Allocator for the scoped temporary paths of one run.
///
/// A root that did not exist before the run is removed again on drop once
/// every scoped path inside it is gone.
#[derive(Debug)]
pub struct TempWorkspace {
    root: PathBuf,
    created_root: bool,
}

impl TempWorkspace {
    /// Allocates under `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let created_root = !root.exists();
        std::fs::create_dir_all(&root).fs_context("creating temporary root", &root)?;
        Ok(Self { root, created_root })
    }

    /// Directory under which scoped paths are created.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a uniquely named directory, e.g. `toucan-apk-XXXXXX`.
    pub fn dir(&self, purpose: &'static str) -> Result<ScopedDir> {
        ScopedDir::create_in(&self.root, purpose)
    }

    /// Creates a uniquely named file with the given suffix.
    pub fn file(&self, purpose: &'static str, suffix: &str) -> Result<ScopedFile> {
        let file = tempfile::Builder::new()
            .prefix(&format!("toucan-{purpose}-"))
            .suffix(suffix)
            .tempfile_in(&self.root)
            .fs_context("creating temporary file in", &self.root)?;
        log::debug!("Created {purpose} file {}", file.path().display());
        Ok(ScopedFile { file, purpose })
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if !self.created_root {
            return;
        }
        // Only an empty root is removed; anything left inside is kept
        match std::fs::remove_dir(&self.root) {
            Ok(()) => log::debug!("Removed temporary root {}", self.root.display()),
            Err(e) => log::warn!(
                "Failed to remove temporary root {}: {}",
                self.root.display(),
                e
            ),
        }
    }
}

/// A temporary directory removed on drop.
#[derive(Debug)]
pub struct ScopedDir {
    dir: Option<TempDir>,
    path: PathBuf,
    purpose: &'static str,
}

impl ScopedDir {
    /// Creates a scoped directory inside `parent`.
    ///
    /// Final artifacts are staged in a scoped directory next to their public
    /// path so publishing is a same-filesystem rename.
    pub fn create_in(parent: &Path, purpose: &'static str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("toucan-{purpose}-"))
            .tempdir_in(parent)
            .fs_context("creating temporary directory in", parent)?;
        let path = dir.path().to_path_buf();
        log::debug!("Created {purpose} directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            purpose,
        })
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Joins a relative path onto the directory.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.path.join(rel)
    }
}

impl Drop for ScopedDir {
    fn drop(&mut self) {
        // Drop must never panic; removal failures are reported and ignored
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => log::debug!("Removed {} directory {}", self.purpose, self.path.display()),
                Err(e) => log::warn!(
                    "Failed to remove {} directory {}: {}",
                    self.purpose,
                    self.path.display(),
                    e
                ),
            }
        }
    }
}

/// A temporary file removed on drop.
#[derive(Debug)]
pub struct ScopedFile {
    file: NamedTempFile,
    purpose: &'static str,
}

impl ScopedFile {
    /// Path of the file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        log::debug!("Removing {} file {}", self.purpose, self.file.path().display());
    }
}

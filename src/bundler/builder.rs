//! Bundle orchestration.
//!
//! The [`Bundler`] owns one validated [`Settings`], allocates the run's
//! temporary workspace, hands control to the platform pipeline and describes
//! every published artifact with its size and SHA-256 checksum.
//!
//! # Example
//!
//! ```no_run
//! use toucan_bundler::bundler::{Bundler, Platform, SettingsBuilder, TargetDescriptor};
//!
//! # async fn example() -> toucan_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .target(TargetDescriptor::new("demo", Platform::Mac, None)?)
//!     .binary("out/demo")
//!     .output("out/demo.app")
//!     .minimum_version("11.0")
//!     .build()?;
//!
//! for artifact in Bundler::new(settings).bundle().await? {
//!     println!("{}: {} ({} bytes)", artifact.package_type, artifact.path.display(), artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```

use crate::bail;
use crate::bundler::cleanup::TempWorkspace;
use crate::bundler::platform::{self, PackageType, apple::ipa};
use crate::bundler::settings::ToolPaths;
use crate::bundler::{BundledArtifact, Result, Settings, error::ErrorExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main bundler orchestrator.
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a bundler for the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs the whole pipeline for the configured target.
    ///
    /// Returns one [`BundledArtifact`] per published path: the `.apk` or
    /// `.app`, followed by the `.ipa` when one was requested. Any failure
    /// aborts the remaining steps; temporary directories are removed either
    /// way.
    pub async fn bundle(&self) -> Result<Vec<BundledArtifact>> {
        let target = self.settings.target();
        log::info!("Bundling {} for {}", target.name(), target.platform());

        let workspace = TempWorkspace::new(self.settings.temp_root())?;
        let published = platform::bundle_target(&self.settings, &workspace).await?;

        let mut artifacts = Vec::with_capacity(published.len());
        for (package_type, path) in published {
            artifacts.push(describe(package_type, path).await?);
        }
        Ok(artifacts)
    }
}

/// Wraps an existing `.app` into an `.ipa`.
pub async fn package_ipa(
    app: &Path,
    ipa_path: &Path,
    tools: &ToolPaths,
    timeout: Option<Duration>,
    temp_root: &Path,
) -> Result<BundledArtifact> {
    let workspace = TempWorkspace::new(temp_root)?;
    let ipa_path = std::path::absolute(ipa_path).fs_context("resolving", ipa_path)?;
    ipa::package_ipa(app, &ipa_path, &tools.zip, timeout, &workspace).await?;
    describe(PackageType::Ipa, ipa_path).await
}

async fn describe(package_type: PackageType, path: PathBuf) -> Result<BundledArtifact> {
    let size = artifact_size(&path).await?;
    let checksum = calculate_sha256(&path).await?;
    Ok(BundledArtifact {
        package_type,
        path,
        size,
        checksum,
    })
}

/// Size in bytes of a file, or of every file under a directory.
async fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }

    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

/// Calculates the SHA-256 checksum of a file or directory tree.
///
/// Returns the hex-encoded digest (64 characters).
async fn calculate_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;

    if metadata.is_file() {
        let mut file = tokio::fs::File::open(path)
            .await
            .fs_context("opening file for hashing", path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hash calculation", path)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    } else if metadata.is_dir() {
        calculate_directory_sha256(path).await
    } else {
        bail!("Path is neither file nor directory: {}", path.display())
    }
}

/// Calculates the SHA-256 checksum of a directory tree such as an `.app`.
///
/// Files are visited in sorted path order and each contributes its relative
/// path followed by its content, so the digest is stable across runs.
async fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir_path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }
    entries.sort();

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    for path in entries {
        let rel_path = path.strip_prefix(dir_path)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());

        let mut file = tokio::fs::File::open(&path)
            .await
            .fs_context("opening file for hashing", &path)?;

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hash calculation", &path)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_checksum_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.apk");
        std::fs::write(&path, b"abc").unwrap();

        let artifact = describe(PackageType::Apk, path).await.unwrap();

        assert_eq!(artifact.size, 3);
        assert_eq!(
            artifact.checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn directory_checksum_is_stable_and_content_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("demo.app");
        std::fs::create_dir_all(app.join("Contents/MacOS")).unwrap();
        std::fs::write(app.join("Contents/MacOS/demo"), b"exe").unwrap();
        std::fs::write(app.join("Contents/Info.plist"), b"plist").unwrap();

        let first = calculate_sha256(&app).await.unwrap();
        assert_eq!(first, calculate_sha256(&app).await.unwrap());
        assert_eq!(artifact_size(&app).await.unwrap(), 8);

        std::fs::write(app.join("Contents/MacOS/demo"), b"exe2").unwrap();
        assert_ne!(first, calculate_sha256(&app).await.unwrap());
    }

    #[tokio::test]
    async fn unresolvable_ipa_path_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let err = package_ipa(
            &dir.path().join("demo.app"),
            Path::new(""),
            &ToolPaths::default(),
            None,
            &dir.path().join("tmp"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            crate::bundler::Error::Fs {
                context: "resolving",
                ..
            }
        ));
        assert!(!dir.path().join("tmp").exists());
    }

    #[tokio::test]
    async fn missing_artifact_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = describe(PackageType::Ipa, dir.path().join("gone.ipa"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::bundler::ErrorKind::Filesystem);
    }
}

//! File system utilities for bundling.
//!
//! Provides copy/link/remove helpers with path-carrying errors, and the
//! atomic publish step that moves a finished artifact into place.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::fs::FileTimes;
use std::io;
use std::path::Path;
use tokio::fs;

/// Removes a file, symlink or directory tree if anything exists at `path`.
///
/// Symlinks are removed, never followed.
pub async fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).fs_context("inspecting", path),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)
    } else {
        fs::remove_file(path).await.fs_context("removing file", path)
    }
}

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_path(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Copies a regular file, preserving permissions and timestamps.
///
/// Creates the destination's parent directories as needed. Fails with a
/// filesystem error naming `from` if the source is missing or not a file.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from).await.fs_context("reading", from)?;
    if !metadata.is_file() {
        return Err(Error::Fs {
            context: "copying",
            path: from.to_path_buf(),
            error: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }

    // fs::copy carries the permission bits over
    fs::copy(from, to).await.fs_context("copying to", to)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    let dest = fs::File::open(to)
        .await
        .fs_context("opening", to)?
        .into_std()
        .await;
    dest.set_times(times).fs_context("preserving timestamps on", to)?;

    Ok(())
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
pub fn symlink_dir(src: &Path, dst: &Path) -> Result<()> {
    std::os::unix::fs::symlink(src, dst).fs_context("creating symlink", dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
pub fn symlink_dir(src: &Path, dst: &Path) -> Result<()> {
    std::os::windows::fs::symlink_dir(src, dst).fs_context("creating symlink", dst)
}

/// Links `dst` to the absolute location of `src`, copying when the host
/// filesystem refuses symbolic links.
///
/// Fails with a filesystem error naming `src` if it does not exist.
pub async fn link_or_copy(src: &Path, dst: &Path) -> Result<()> {
    let src = fs::canonicalize(src).await.fs_context("resolving", src)?;

    match symlink_file(&src, dst) {
        Ok(()) => Ok(()),
        Err(e) if matches!(e.kind(), io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied) => {
            log::warn!(
                "Symbolic links unavailable at {} ({}), copying {} instead",
                dst.display(),
                e,
                src.display()
            );
            copy_file(&src, dst).await
        }
        Err(e) => Err(e).fs_context("creating symlink", dst),
    }
}

/// Moves a finished artifact from its staging location to its public path.
///
/// Anything already at `dest` is removed first. Both paths must be on the
/// same filesystem so the final rename is atomic.
pub async fn publish(staged: &Path, dest: &Path) -> Result<()> {
    remove_path(dest).await?;
    fs::rename(staged, dest)
        .await
        .fs_context("publishing artifact to", dest)?;
    log::debug!("Published {} -> {}", staged.display(), dest.display());
    Ok(())
}

//! `.ipa` archives.
//!
//! An `.ipa` is a zip whose single top-level entry is `Payload/<App>.app`.
//! The payload directory holds a symlink to the finished bundle, so nothing
//! is copied; `zip` follows the link while archiving.

use crate::bundler::cleanup::{ScopedDir, TempWorkspace};
use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::utils::{fs, process::ToolCommand};
use std::path::Path;
use std::time::Duration;

/// Archives `app` into `ipa`.
///
/// The archive is written beside `ipa` and renamed into place only after
/// `zip` succeeds, so a failed run never leaves a partial file at `ipa`.
///
/// # Errors
///
/// - Filesystem error if `app` is missing or is not a directory
/// - External tool error if `zip` exits non-zero
pub async fn package_ipa(
    app: &Path,
    ipa: &Path,
    zip: &Path,
    timeout: Option<Duration>,
    workspace: &TempWorkspace,
) -> Result<()> {
    let metadata = tokio::fs::metadata(app).await.fs_context("reading app bundle", app)?;
    if !metadata.is_dir() {
        return Err(Error::Fs {
            context: "packaging",
            path: app.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not an .app directory"),
        });
    }

    let app = tokio::fs::canonicalize(app).await.fs_context("resolving", app)?;
    let app_name = app
        .file_name()
        .ok_or_else(|| Error::Config(format!("invalid app bundle path {}", app.display())))?;
    let ipa = std::path::absolute(ipa).fs_context("resolving", ipa)?;
    let ipa_name = ipa
        .file_name()
        .ok_or_else(|| Error::Config(format!("invalid ipa path {}", ipa.display())))?;
    let ipa_dir = ipa
        .parent()
        .ok_or_else(|| Error::Config(format!("invalid ipa path {}", ipa.display())))?;
    fs::create_dir_all(ipa_dir, false).await?;

    let scratch = workspace.dir("payload")?;
    let payload = scratch.join("Payload");
    fs::create_dir_all(&payload, false).await?;
    fs::symlink_dir(&app, &payload.join(app_name))?;

    let staging = ScopedDir::create_in(ipa_dir, "ipa")?;
    let staged_ipa = staging.join(ipa_name);

    log::info!("Packaging {} into {}", app.display(), ipa.display());
    ToolCommand::new(zip)
        .arg("-r")
        .arg(&staged_ipa)
        .arg("Payload")
        .current_dir(scratch.path())
        .timeout(timeout)
        .run()
        .await?;

    fs::publish(&staged_ipa, &ipa).await?;
    Ok(())
}

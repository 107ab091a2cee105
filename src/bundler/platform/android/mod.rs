//! Android APK pipeline.
//!
//! Stage `lib/<abi>/` → render `AndroidManifest.xml` → `aapt package` →
//! `apksigner sign` → publish. The unsigned APK is produced in a staging
//! directory beside the destination and only renamed into place once signed.

pub mod apk;
pub mod manifest;
pub mod sign;

use super::{BundleStrategy, ManifestDocument, PackageType, destination_parent};
use crate::bundler::cleanup::{ScopedDir, TempWorkspace};
use crate::bundler::error::{Context, ErrorExt, Result};
use crate::bundler::settings::Settings;
use crate::bundler::utils::fs;
use std::path::PathBuf;

/// Builds signed APKs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidStrategy;

impl BundleStrategy for AndroidStrategy {
    async fn bundle(
        &self,
        settings: &Settings,
        workspace: &TempWorkspace,
    ) -> Result<Vec<(PackageType, PathBuf)>> {
        let dest = std::path::absolute(settings.artifact_path())
            .fs_context("resolving", settings.artifact_path())?;
        let parent = destination_parent(&dest)?;
        fs::create_dir_all(&parent, false).await?;
        fs::remove_path(&dest).await?;

        let tree = workspace.dir("apk")?;
        apk::stage_native_library(settings, tree.path()).await?;

        let manifest = ManifestDocument::synthesize(settings)?;
        let manifest_dir = workspace.dir("manifest")?;
        let manifest_path = manifest_dir.join("AndroidManifest.xml");
        manifest.write(&manifest_path).await?;

        let staging = ScopedDir::create_in(&parent, "apk-out")?;
        let staged_apk = staging.join(
            dest.file_name()
                .context("output path must name an .apk file")?,
        );

        apk::package_apk(settings, &manifest_path, tree.path(), &staged_apk)
            .await
            .context("packaging APK")?;
        sign::sign_apk(settings, &staged_apk)
            .await
            .context("signing APK")?;

        fs::publish(&staged_apk, &dest).await?;
        log::info!("Created {}", dest.display());

        Ok(vec![(PackageType::Apk, dest)])
    }
}

//! iOS and macOS `.app` pipeline.
//!
//! Stage executable and libraries → compile the app icon → write `Info.plist`
//! → embed the provisioning profile (iOS) → sign → publish, then optionally
//! wrap the published bundle into an `.ipa`.

pub mod app;
pub mod asset_catalog;
pub mod info_plist;
pub mod ipa;
pub mod sign;

use super::{BundleStrategy, ManifestDocument, PackageType, destination_parent};
use crate::bundler::cleanup::{ScopedDir, TempWorkspace};
use crate::bundler::error::{Context, ErrorExt, Result};
use crate::bundler::settings::{Platform, Settings};
use crate::bundler::utils::fs;
use app::AppLayout;
use std::path::PathBuf;

/// Builds `.app` bundles (and `.ipa` archives) for Apple platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppleStrategy;

impl BundleStrategy for AppleStrategy {
    async fn bundle(
        &self,
        settings: &Settings,
        workspace: &TempWorkspace,
    ) -> Result<Vec<(PackageType, PathBuf)>> {
        let platform = settings.target().platform();
        let dest = std::path::absolute(settings.artifact_path())
            .fs_context("resolving", settings.artifact_path())?;
        let parent = destination_parent(&dest)?;
        fs::create_dir_all(&parent, false).await?;
        fs::remove_path(&dest).await?;

        let staging = ScopedDir::create_in(&parent, "app")?;
        let layout = AppLayout::new(
            staging.join(dest.file_name().context("output path must name an .app bundle")?),
            platform,
        )?;
        app::stage_bundle(settings, &layout).await?;

        let assets =
            asset_catalog::compile_app_icon(settings, workspace, layout.resources_dir()).await?;

        let mut manifest = ManifestDocument::synthesize(settings)?;
        if let Some(assets) = assets {
            manifest.merge_assets(assets)?;
        }
        manifest.write(&layout.info_plist_path()).await?;

        if platform == Platform::Ios {
            let profile = settings
                .apple_signing()
                .provisioning_profile
                .as_deref()
                .context("mobile provisioning profile is required for ios targets")?;
            sign::embed_provisioning_profile(profile, layout.root()).await?;
        }
        sign::sign_app(settings, workspace, layout.executable_dir())
            .await
            .context("signing app bundle")?;

        fs::publish(layout.root(), &dest).await?;
        log::info!("Created {}", dest.display());

        let package_type = match platform {
            Platform::Ios => PackageType::IosBundle,
            Platform::Mac | Platform::Android => PackageType::MacOsBundle,
        };
        let mut artifacts = vec![(package_type, dest.clone())];

        if let Some(ipa_path) = settings.ipa_output() {
            let ipa_path = std::path::absolute(ipa_path).fs_context("resolving", ipa_path)?;
            ipa::package_ipa(
                &dest,
                &ipa_path,
                &settings.tools().zip,
                settings.tool_timeout(),
                workspace,
            )
            .await?;
            log::info!("Created {}", ipa_path.display());
            artifacts.push((PackageType::Ipa, ipa_path));
        }

        Ok(artifacts)
    }
}

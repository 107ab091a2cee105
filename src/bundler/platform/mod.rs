//! Platform-specific bundling pipelines.
//!
//! | Platform | Artifacts | Module |
//! |----------|-----------|--------|
//! | Android | `.apk` | [`android`] |
//! | iOS | `.app`, `.ipa` | [`apple`] |
//! | macOS | `.app` | [`apple`] |
//!
//! [`Platform`] is a closed set; [`bundle_target`] matches on it exhaustively
//! and hands the run to the corresponding [`BundleStrategy`].

pub mod android;
pub mod apple;

use crate::bundler::cleanup::TempWorkspace;
use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::settings::{Platform, Settings};
use android::{AndroidStrategy, manifest::AndroidManifest};
use apple::{AppleStrategy, asset_catalog::AssetCompilationResult, info_plist::InfoPlist};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kinds of artifact the bundler produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum PackageType {
    /// Signed Android package (.apk).
    Apk,

    /// macOS application bundle (.app).
    MacOsBundle,

    /// iOS application bundle (.app).
    IosBundle,

    /// iOS application archive (.ipa).
    Ipa,
}

impl PackageType {
    /// Returns the short name used in CLI output.
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageType::Apk => "apk",
            PackageType::MacOsBundle => "macos-app",
            PackageType::IosBundle => "ios-app",
            PackageType::Ipa => "ipa",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// One platform's assembly pipeline.
#[allow(async_fn_in_trait)]
pub trait BundleStrategy {
    /// Runs every step for `settings`, returning the published artifacts in
    /// the order they were produced.
    ///
    /// Scoped temporary paths come from `workspace` and are gone by the time
    /// this returns, whether it succeeds or fails.
    async fn bundle(
        &self,
        settings: &Settings,
        workspace: &TempWorkspace,
    ) -> Result<Vec<(PackageType, PathBuf)>>;
}

/// Dispatches to the strategy serving the target's platform.
pub async fn bundle_target(
    settings: &Settings,
    workspace: &TempWorkspace,
) -> Result<Vec<(PackageType, PathBuf)>> {
    match settings.target().platform() {
        Platform::Android => AndroidStrategy.bundle(settings, workspace).await,
        Platform::Ios | Platform::Mac => AppleStrategy.bundle(settings, workspace).await,
    }
}

/// Platform descriptor written into a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestDocument {
    /// `AndroidManifest.xml`
    Android(AndroidManifest),
    /// `Info.plist`
    Apple(InfoPlist),
}

impl ManifestDocument {
    /// Builds the descriptor for the target's platform.
    pub fn synthesize(settings: &Settings) -> Result<Self> {
        match settings.target().platform() {
            Platform::Android => Ok(Self::Android(AndroidManifest::synthesize(settings)?)),
            Platform::Ios | Platform::Mac => Ok(Self::Apple(InfoPlist::synthesize(settings)?)),
        }
    }

    /// Merges asset compiler output; keys already present are kept.
    pub fn merge_assets(&mut self, assets: AssetCompilationResult) -> Result<()> {
        match self {
            Self::Apple(plist) => {
                plist.merge_fragment(assets.into_fragment());
                Ok(())
            }
            Self::Android(_) => Err(Error::GenericError(
                "asset catalog output cannot be merged into an Android manifest".into(),
            )),
        }
    }

    /// Serialized document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Android(manifest) => Ok(manifest.as_str().as_bytes().to_vec()),
            Self::Apple(plist) => plist.to_xml(),
        }
    }

    /// Serializes the document to `path`.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        tokio::fs::write(path, bytes)
            .await
            .fs_context("writing manifest", path)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn destination_parent(dest: &Path) -> Result<PathBuf> {
    dest.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Config(format!("invalid output path {}", dest.display())))
}

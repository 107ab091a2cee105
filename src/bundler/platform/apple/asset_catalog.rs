//! App icon compilation through `actool`.
//!
//! A throwaway `Assets.xcassets` holding one `AppIcon.appiconset` is staged in
//! a scoped directory, compiled into the bundle's resources directory, and the
//! partial Info.plist that `actool` emits is read back so its icon keys can be
//! merged into the bundle's property list.

use crate::bundler::cleanup::TempWorkspace;
use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::resources::icons::{APP_ICON_SIZE, rasterize_icon};
use crate::bundler::settings::{Platform, Settings};
use crate::bundler::utils::{fs, process::ToolCommand};
use plist::{Dictionary, Value};
use serde::Serialize;
use std::path::Path;

/// Name of the icon set, passed to `actool --app-icon`.
pub const APP_ICON_NAME: &str = "AppIcon";

const APP_ICON_FILE: &str = "AppIcon.png";

/// Partial Info.plist produced by the asset compiler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCompilationResult {
    fragment: Dictionary,
}

impl AssetCompilationResult {
    /// Keys contributed by the asset compiler.
    pub fn fragment(&self) -> &Dictionary {
        &self.fragment
    }

    /// Consumes the result, returning the fragment for merging.
    pub fn into_fragment(self) -> Dictionary {
        self.fragment
    }
}

#[derive(Serialize)]
struct IconSetContents {
    images: Vec<IconSetImage>,
}

#[derive(Serialize)]
struct IconSetImage {
    filename: &'static str,
    idiom: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<&'static str>,
    size: &'static str,
}

/// `actool --platform` value for an Apple target.
pub fn actool_platform(platform: Platform) -> Result<&'static str> {
    match platform {
        Platform::Ios => Ok("iphoneos"),
        Platform::Mac => Ok("macosx"),
        Platform::Android => Err(Error::Config(
            "asset catalogs are only compiled for apple targets".into(),
        )),
    }
}

/// Serialized `Contents.json` for the icon set of `platform`.
pub fn icon_set_contents(platform: Platform) -> Result<Vec<u8>> {
    let image = match platform {
        Platform::Ios => IconSetImage {
            filename: APP_ICON_FILE,
            idiom: "universal",
            platform: Some("ios"),
            scale: None,
            size: "1024x1024",
        },
        Platform::Mac => IconSetImage {
            filename: APP_ICON_FILE,
            idiom: "mac",
            platform: None,
            scale: Some("2x"),
            size: "512x512",
        },
        Platform::Android => {
            return Err(Error::Config(
                "asset catalogs are only compiled for apple targets".into(),
            ));
        }
    };
    let contents = IconSetContents {
        images: vec![image],
    };
    Ok(serde_json::to_vec_pretty(&contents)?)
}

/// Compiles the configured icon into `resources_dir`.
///
/// Returns `None`, without running any tool, when no icon was configured.
/// The staged catalog and partial plist are removed whether or not `actool`
/// succeeds.
pub async fn compile_app_icon(
    settings: &Settings,
    workspace: &TempWorkspace,
    resources_dir: &Path,
) -> Result<Option<AssetCompilationResult>> {
    let Some(icon) = settings.icon() else {
        log::info!("No app icon configured, skipping asset catalog compilation");
        return Ok(None);
    };

    let platform = settings.target().platform();
    let actool_platform = actool_platform(platform)?;
    let minimum_version = settings
        .manifest_options()
        .minimum_version
        .as_deref()
        .ok_or_else(|| Error::Config("minimum deployment target is required".into()))?;

    let scratch = workspace.dir("catalog")?;
    let catalog = scratch.join("Assets.xcassets");
    let icon_set = catalog.join(format!("{APP_ICON_NAME}.appiconset"));
    fs::create_dir_all(&icon_set, false).await?;

    let contents_path = icon_set.join("Contents.json");
    tokio::fs::write(&contents_path, icon_set_contents(platform)?)
        .await
        .fs_context("writing", &contents_path)?;

    rasterize_icon(
        icon,
        &icon_set.join(APP_ICON_FILE),
        APP_ICON_SIZE,
        &settings.tools().sips,
        settings.tool_timeout(),
    )
    .await?;

    fs::create_dir_all(resources_dir, false).await?;
    let partial = scratch.join("partial-info.plist");

    log::info!("Compiling asset catalog for {}", settings.target().name());
    ToolCommand::new(&settings.tools().actool)
        .arg(&catalog)
        .arg("--compile")
        .arg(resources_dir)
        .args(["--output-format", "human-readable-text"])
        .args(["--app-icon", APP_ICON_NAME])
        .arg("--output-partial-info-plist")
        .arg(&partial)
        .args(["--platform", actool_platform])
        .args(["--minimum-deployment-target", minimum_version])
        .timeout(settings.tool_timeout())
        .run()
        .await?;

    tokio::fs::metadata(&partial)
        .await
        .fs_context("reading partial Info.plist", &partial)?;
    let fragment = Value::from_file(&partial)?
        .into_dictionary()
        .ok_or_else(|| Error::GenericError("actool partial Info.plist is not a dictionary".into()))?;

    log::debug!("Asset compiler contributed {} Info.plist keys", fragment.len());
    Ok(Some(AssetCompilationResult { fragment }))
}

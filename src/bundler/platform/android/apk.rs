//! APK staging and packaging.

use crate::bundler::error::{Context, Error, Result};
use crate::bundler::settings::Settings;
use crate::bundler::utils::{fs, process::ToolCommand};
use std::path::{Path, PathBuf};

/// Places the native library at `lib/<abi>/<file name>` under `root`.
///
/// The library is linked to its absolute source path; hosts that refuse
/// symbolic links get a copy instead.
///
/// # Errors
///
/// - Configuration error if the target has no CPU architecture
/// - Filesystem error naming the library if it does not exist
pub async fn stage_native_library(settings: &Settings, root: &Path) -> Result<PathBuf> {
    let abi = settings
        .target()
        .cpu_arch()
        .context("target CPU architecture is required for android targets")?
        .abi_tag();
    let source = settings.binary_path();
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::Config(format!("invalid source library path {}", source.display())))?;

    let lib_dir = root.join("lib").join(abi);
    fs::create_dir_all(&lib_dir, false).await?;

    let dest = lib_dir.join(file_name);
    fs::link_or_copy(source, &dest).await?;
    log::debug!("Staged {} as lib/{}/{}", source.display(), abi, file_name.to_string_lossy());
    Ok(dest)
}

/// Runs `aapt package` over the staged tree, writing an unsigned APK to `out`.
pub async fn package_apk(settings: &Settings, manifest: &Path, staged: &Path, out: &Path) -> Result<()> {
    let tools = settings.tools();
    let android_jar = tools
        .android_jar
        .as_deref()
        .context("android.jar location is required to package an APK")?;

    log::info!("Packaging {}", settings.target().name());
    ToolCommand::new(&tools.aapt)
        .args(["package", "-f", "-M"])
        .arg(manifest)
        .arg("-I")
        .arg(android_jar)
        .arg("-F")
        .arg(out)
        .arg(staged)
        .timeout(settings.tool_timeout())
        .run()
        .await
}

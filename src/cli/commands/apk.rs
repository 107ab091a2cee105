//! `toucan-bundler apk`

use super::helpers::{flag_or, with_run_options};
use crate::bundler::{
    AndroidSigning, BundledArtifact, Bundler, CpuArch, DEFAULT_ANDROID_MIN_SDK, Platform,
    SettingsBuilder, TargetDescriptor, ToolPaths,
};
use crate::cli::args::ApkArgs;
use crate::cli::{Args, OutputManager};
use crate::config::FileConfig;
use crate::error::{CliError, Result};

const DEFAULT_BUILD_TOOLS: &str = "latest";

pub(super) async fn execute_apk(
    args: &Args,
    apk: &ApkArgs,
    config: &FileConfig,
    output: &OutputManager,
) -> Result<Vec<BundledArtifact>> {
    let cpu_arch: CpuArch = apk.target_cpu.parse()?;
    let target = TargetDescriptor::new(&apk.target_name, Platform::Android, Some(cpu_arch))?;

    let tools = android_tools(apk, config)?;
    let keystore = flag_or(&apk.keystore, &config.android.keystore).ok_or_else(|| {
        CliError::MissingArgument {
            argument: "keystore".to_string(),
        }
    })?;
    let passphrase = flag_or(&apk.keystore_pass, &config.android.keystore_pass);

    let mut manifest = config.manifest.clone();
    if let Some(min_sdk) = apk.min_sdk {
        manifest.minimum_version = Some(min_sdk.to_string());
    }
    manifest.debuggable |= apk.debuggable;

    let builder = SettingsBuilder::new()
        .target(target)
        .manifest_options(manifest)
        .binary(&apk.source_lib)
        .output(&apk.out)
        .tools(tools)
        .android_signing(AndroidSigning::new(keystore, passphrase));
    let settings = with_run_options(builder, args, config).build()?;

    let _ = output.progress(&format!(
        "Packaging {} for {}",
        apk.target_name,
        cpu_arch.abi_tag()
    ));
    Ok(Bundler::new(settings).bundle().await?)
}

/// Resolves `aapt`, `apksigner` and `android.jar` from the SDK directory.
///
/// Without an SDK directory the `[tools]` table must name the jar itself.
fn android_tools(apk: &ApkArgs, config: &FileConfig) -> Result<ToolPaths> {
    let build_tools = apk
        .build_tools
        .as_deref()
        .or(config.android.build_tools.as_deref())
        .unwrap_or(DEFAULT_BUILD_TOOLS);
    let platform_level = apk
        .platform_level
        .or(config.android.platform_level)
        .unwrap_or(DEFAULT_ANDROID_MIN_SDK);

    match apk.sdk_dir.as_deref().or(config.android.sdk_dir.as_deref()) {
        Some(sdk_dir) => Ok(config
            .tools
            .clone()
            .with_android_sdk(sdk_dir, build_tools, platform_level)),
        None if config.tools.android_jar.is_some() => Ok(config.tools.clone()),
        None => Err(CliError::MissingArgument {
            argument: "sdk-dir".to_string(),
        }
        .into()),
    }
}

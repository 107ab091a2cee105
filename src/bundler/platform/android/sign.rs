//! APK signing through `apksigner`.

use crate::bundler::error::{Context, Result};
use crate::bundler::settings::Settings;
use crate::bundler::utils::process::ToolCommand;
use std::path::Path;

/// Signs `apk` in place with the configured keystore.
pub async fn sign_apk(settings: &Settings, apk: &Path) -> Result<()> {
    let signing = settings
        .android_signing()
        .context("a keystore is required for android targets")?;

    log::info!(
        "Signing {} with keystore {}",
        apk.display(),
        signing.keystore.display()
    );

    ToolCommand::new(&settings.tools().apksigner)
        .args(["sign", "--ks"])
        .arg(&signing.keystore)
        .arg("--ks-pass")
        .arg(format!("pass:{}", signing.passphrase))
        .arg(apk)
        .timeout(settings.tool_timeout())
        .run()
        .await
}

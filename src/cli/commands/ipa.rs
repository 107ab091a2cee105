//! `toucan-bundler ipa`

use super::helpers::{temp_root, tool_timeout};
use crate::bundler::{BundledArtifact, package_ipa};
use crate::cli::args::IpaArgs;
use crate::cli::{Args, OutputManager};
use crate::config::FileConfig;
use crate::error::Result;

pub(super) async fn execute_ipa(
    args: &Args,
    ipa: &IpaArgs,
    config: &FileConfig,
    output: &OutputManager,
) -> Result<Vec<BundledArtifact>> {
    let _ = output.progress(&format!(
        "Archiving {} into {}",
        ipa.app_file.display(),
        ipa.ipa_file.display()
    ));
    let artifact = package_ipa(
        &ipa.app_file,
        &ipa.ipa_file,
        &config.tools,
        tool_timeout(args, config),
        &temp_root(args, config),
    )
    .await?;
    Ok(vec![artifact])
}

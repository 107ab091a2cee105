//! Apple code signing.
//!
//! Builds the entitlements dictionary, embeds the provisioning profile for
//! iOS, and runs `codesign` over the directory that holds the executable.

use super::info_plist::sorted_xml;
use crate::bundler::cleanup::TempWorkspace;
use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::settings::{Platform, Settings};
use crate::bundler::utils::{fs, process::ToolCommand};
use plist::{Dictionary, Value};
use std::path::Path;

/// File name of the provisioning profile inside an iOS bundle.
pub const EMBEDDED_PROFILE: &str = "embedded.mobileprovision";

/// Entitlements attached to a signed bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementsSet {
    dict: Dictionary,
}

impl EntitlementsSet {
    /// Entitlements for `bundle_id` under `team_identifier`.
    ///
    /// `get-task-allow` is only present when debugging is enabled.
    pub fn new(team_identifier: &str, bundle_id: &str, debugging: bool) -> Self {
        let mut dict = Dictionary::new();
        dict.insert(
            "application-identifier".into(),
            format!("{team_identifier}.{bundle_id}").into(),
        );
        dict.insert(
            "com.apple.developer.team-identifier".into(),
            team_identifier.into(),
        );
        if debugging {
            dict.insert("get-task-allow".into(), true.into());
        }
        Self { dict }
    }

    /// Looks up an entitlement.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.dict.get(key)
    }

    /// Serializes as an XML property list.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        sorted_xml(&self.dict)
    }
}

/// Copies the provisioning profile to `embedded.mobileprovision` at the bundle root.
pub async fn embed_provisioning_profile(profile: &Path, bundle_root: &Path) -> Result<()> {
    let dest = bundle_root.join(EMBEDDED_PROFILE);
    fs::copy_file(profile, &dest).await?;
    log::info!("Embedded provisioning profile {}", profile.display());
    Ok(())
}

/// Signs the bundle's executable directory.
///
/// macOS bundles are left unsigned when no identity is configured. The
/// entitlements file lives in a scoped temporary location and is removed on
/// every exit path.
pub async fn sign_app(
    settings: &Settings,
    workspace: &TempWorkspace,
    executable_dir: &Path,
) -> Result<()> {
    let signing = settings.apple_signing();
    let platform = settings.target().platform();

    let Some(identity) = signing.identity.as_deref() else {
        return match platform {
            Platform::Mac => {
                log::info!("No signing identity configured, skipping signing");
                Ok(())
            }
            Platform::Ios | Platform::Android => Err(Error::Config(format!(
                "codesign identity is required for {platform} targets"
            ))),
        };
    };

    log::info!(
        "Signing {} with identity '{}'",
        executable_dir.display(),
        identity
    );

    let mut command = ToolCommand::new(&settings.tools().codesign).args(["-s", identity]);

    let entitlements_file = match signing.team_identifier.as_deref() {
        Some(team) => {
            let entitlements = EntitlementsSet::new(
                team,
                &settings.bundle_identifier(),
                settings.manifest_options().debuggable,
            );
            let file = workspace.file("entitlements", ".plist")?;
            tokio::fs::write(file.path(), entitlements.to_xml()?)
                .await
                .fs_context("writing entitlements", file.path())?;
            command = command.arg("--entitlements").arg(file.path());
            Some(file)
        }
        None => {
            log::debug!("No team identifier configured, signing without entitlements");
            None
        }
    };

    command
        .arg(executable_dir)
        .timeout(settings.tool_timeout())
        .run()
        .await?;
    drop(entitlements_file);

    log::info!("Signed {}", executable_dir.display());
    Ok(())
}

//! `toucan-bundler app`

use super::helpers::{flag_or, with_run_options};
use crate::bundler::{
    AppleSigning, BundledArtifact, Bundler, ManifestOptions, Platform, Settings, SettingsBuilder,
    TargetDescriptor,
};
use crate::cli::args::AppArgs;
use crate::cli::{Args, OutputManager};
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use std::path::PathBuf;

pub(super) async fn execute_app(
    args: &Args,
    app: &AppArgs,
    config: &FileConfig,
    output: &OutputManager,
) -> Result<Vec<BundledArtifact>> {
    let settings = app_settings(args, app, config)?;
    let _ = output.progress(&format!(
        "Assembling {} for {}",
        settings.artifact_path().display(),
        settings.target().platform()
    ));
    Ok(Bundler::new(settings).bundle().await?)
}

fn app_settings(args: &Args, app: &AppArgs, config: &FileConfig) -> Result<Settings> {
    let platform: Platform = app.target_os.parse()?;
    if !platform.is_apple() {
        return Err(CliError::InvalidArguments {
            reason: format!("--target-os {platform} is not an Apple platform; use the apk subcommand"),
        }
        .into());
    }
    let target = TargetDescriptor::new(&app.target_name, platform, None)?;

    let out_dir = app.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let binary = app
        .binary
        .clone()
        .unwrap_or_else(|| out_dir.join(&app.target_name));
    let bundle = out_dir.join(format!("{}.app", app.target_name));

    let signing = AppleSigning {
        identity: flag_or(&app.codesign_identity, &config.apple.codesign_identity),
        team_identifier: flag_or(&app.team_identifier, &config.apple.team_identifier),
        provisioning_profile: flag_or(&app.mobile_provision, &config.apple.mobile_provision),
    };

    let mut builder = SettingsBuilder::new()
        .target(target)
        .manifest_options(manifest_options(app, config))
        .binary(binary)
        .output(bundle)
        .tools(config.tools.clone())
        .apple_signing(signing);

    let dylibs = if app.dylibs.is_empty() {
        config.apple.dylibs.clone()
    } else {
        Some(app.dylibs.clone())
    };
    if let Some(dylibs) = dylibs {
        builder = builder.dependency_libraries(dylibs);
    }
    if let Some(icon) = flag_or(&app.app_icon, &config.apple.app_icon) {
        builder = builder.icon(icon);
    }
    if let Some(ipa) = &app.ipa {
        builder = builder.ipa_output(ipa);
    }

    Ok(with_run_options(builder, args, config).build()?)
}

fn manifest_options(app: &AppArgs, config: &FileConfig) -> ManifestOptions {
    let mut manifest = config.manifest.clone();
    if let Some(version) = &app.minimum_deployment_target {
        manifest.minimum_version = Some(version.clone());
    }
    if let Some(prefix) = &app.bundle_id_prefix {
        manifest.bundle_id_prefix = prefix.clone();
    }
    if let Some(label) = &app.label {
        manifest.label = Some(label.clone());
    }
    if let Some(version) = &app.version {
        manifest.version = Some(version.clone());
    }
    manifest.debuggable |= app.enable_debugging;
    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use clap::Parser;
    use std::path::Path;

    fn parse(extra: &[&str]) -> (Args, AppArgs) {
        let mut argv = vec!["toucan-bundler", "app", "--target-name", "demo"];
        argv.extend_from_slice(extra);
        let mut args = Args::try_parse_from(argv).unwrap();
        let command = std::mem::replace(
            &mut args.command,
            crate::cli::Command::Ipa(crate::cli::IpaArgs {
                app_file: PathBuf::new(),
                ipa_file: PathBuf::new(),
            }),
        );
        match command {
            crate::cli::Command::App(app) => (args, app),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bundle_lands_in_out_dir() {
        let (args, app) = parse(&[
            "--target-os",
            "mac",
            "--out-dir",
            "build",
            "--minimum-deployment-target",
            "11.0",
        ]);
        let settings = app_settings(&args, &app, &FileConfig::default()).unwrap();

        assert_eq!(settings.artifact_path(), Path::new("build/demo.app"));
        assert_eq!(settings.binary_path(), Path::new("build/demo"));
        assert_eq!(settings.bundle_identifier(), "org.toucanlang.sample.demo");
    }

    #[test]
    fn flags_override_manifest_table() {
        let mut config = FileConfig::default();
        config.manifest.bundle_id_prefix = "com.config".into();
        config.manifest.minimum_version = Some("10.15".into());
        config.apple.dylibs = Some(vec!["libconfig.dylib".into()]);

        let (args, app) = parse(&["--target-os", "mac", "--bundle-id-prefix", "com.flag"]);
        let settings = app_settings(&args, &app, &config).unwrap();
        assert_eq!(settings.bundle_identifier(), "com.flag.demo");
        assert_eq!(
            settings.manifest_options().minimum_version.as_deref(),
            Some("10.15")
        );
        assert_eq!(settings.dependency_libraries(), ["libconfig.dylib"]);

        let (args, app) = parse(&["--target-os", "mac", "--dylib", "libflag.dylib"]);
        let settings = app_settings(&args, &app, &config).unwrap();
        assert_eq!(settings.dependency_libraries(), ["libflag.dylib"]);
    }

    #[test]
    fn android_is_rejected() {
        let (args, app) = parse(&["--target-os", "android"]);
        let err = app_settings(&args, &app, &FileConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Cli(CliError::InvalidArguments { .. })));
    }

    #[test]
    fn ios_without_signing_inputs_is_configuration_error() {
        let (args, app) = parse(&["--target-os", "ios", "--minimum-deployment-target", "15.0"]);
        let err = app_settings(&args, &app, &FileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIGURATION);
    }
}

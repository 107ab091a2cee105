//! Command line argument parsing and validation.
//!
//! Architecture and platform tokens are taken as plain strings and parsed by
//! the bundler, so an unknown token surfaces as a bundler configuration error
//! with its own message and exit code.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Package native binaries into installable platform bundles
#[derive(Parser, Debug)]
#[command(
    name = "toucan-bundler",
    version,
    about = "Package native binaries into installable platform bundles",
    long_about = "Package a compiled native binary into a signed Android APK or an Apple .app/.ipa.

Usage:
  toucan-bundler apk --target-name demo --target-cpu arm64 --sdk-dir $ANDROID_HOME \\
      --keystore debug.keystore --source-lib out/libdemo.so --out out/demo.apk
  toucan-bundler app --target-name demo --target-os mac --minimum-deployment-target 11.0
  toucan-bundler ipa --app-file out/demo.app --ipa-file out/demo.ipa"
)]
pub struct Args {
    /// TOML configuration file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory under which temporary directories are created
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Kill an external tool that runs longer than this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub tool_timeout: Option<u64>,

    /// Show tool command lines and debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Bundling subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and sign an Android APK around a native library
    Apk(ApkArgs),

    /// Build an iOS or macOS .app bundle
    #[command(disable_version_flag = true)]
    App(AppArgs),

    /// Wrap an existing .app bundle into an .ipa archive
    Ipa(IpaArgs),
}

impl Command {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::Apk(_) => "apk",
            Command::App(_) => "app",
            Command::Ipa(_) => "ipa",
        }
    }
}

/// Arguments of `toucan-bundler apk`
#[derive(ClapArgs, Debug)]
pub struct ApkArgs {
    /// Target name (library, label and package name)
    #[arg(long)]
    pub target_name: String,

    /// CPU architecture: arm, arm64, x86 or x64
    #[arg(long, value_name = "ARCH")]
    pub target_cpu: String,

    /// Android SDK root
    #[arg(long, value_name = "DIR")]
    pub sdk_dir: Option<PathBuf>,

    /// Signing keystore
    #[arg(long, value_name = "FILE")]
    pub keystore: Option<PathBuf>,

    /// Keystore passphrase
    #[arg(long, value_name = "PASS", env = "TOUCAN_KEYSTORE_PASS", hide_env_values = true)]
    pub keystore_pass: Option<String>,

    /// Native library to package
    #[arg(long, value_name = "FILE")]
    pub source_lib: PathBuf,

    /// Output .apk path
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    /// build-tools version directory [default: latest]
    #[arg(long, value_name = "VERSION")]
    pub build_tools: Option<String>,

    /// API level of the platform jar [default: 26]
    #[arg(long, value_name = "LEVEL")]
    pub platform_level: Option<u32>,

    /// minSdkVersion written to the manifest [default: 26]
    #[arg(long, value_name = "LEVEL")]
    pub min_sdk: Option<u32>,

    /// Mark the application debuggable
    #[arg(long)]
    pub debuggable: bool,
}

/// Arguments of `toucan-bundler app`
#[derive(ClapArgs, Debug)]
pub struct AppArgs {
    /// Target name (executable and bundle name)
    #[arg(long)]
    pub target_name: String,

    /// Target operating system: ios or mac
    #[arg(long, value_name = "OS")]
    pub target_os: String,

    /// Executable to bundle [default: <out-dir>/<target-name>]
    #[arg(long, value_name = "FILE")]
    pub binary: Option<PathBuf>,

    /// Directory receiving <target-name>.app [default: .]
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Provisioning profile embedded into iOS bundles
    #[arg(long, value_name = "FILE")]
    pub mobile_provision: Option<PathBuf>,

    /// Developer team identifier
    #[arg(long, value_name = "TEAM")]
    pub team_identifier: Option<String>,

    /// Identity passed to codesign
    #[arg(long, value_name = "IDENTITY")]
    pub codesign_identity: Option<String>,

    /// Source icon (png, jpeg, svg or pdf)
    #[arg(long, value_name = "FILE")]
    pub app_icon: Option<PathBuf>,

    /// Minimum OS version
    #[arg(long, value_name = "VERSION")]
    pub minimum_deployment_target: Option<String>,

    /// Add the get-task-allow entitlement
    #[arg(long)]
    pub enable_debugging: bool,

    /// Library copied next to a macOS executable; repeatable
    #[arg(long = "dylib", value_name = "NAME")]
    pub dylibs: Vec<String>,

    /// Bundle identifier prefix [default: org.toucanlang.sample]
    #[arg(long, value_name = "PREFIX")]
    pub bundle_id_prefix: Option<String>,

    /// Display name [default: target name]
    #[arg(long)]
    pub label: Option<String>,

    /// Bundle version string
    #[arg(long)]
    pub version: Option<String>,

    /// Also produce this .ipa (ios only)
    #[arg(long, value_name = "FILE")]
    pub ipa: Option<PathBuf>,
}

/// Arguments of `toucan-bundler ipa`
#[derive(ClapArgs, Debug)]
pub struct IpaArgs {
    /// Existing .app bundle
    #[arg(long, value_name = "DIR")]
    pub app_file: PathBuf,

    /// Output .ipa path
    #[arg(long, value_name = "FILE")]
    pub ipa_file: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_timeout == Some(0) {
            return Err("--tool-timeout must be greater than zero".to_string());
        }

        match &self.command {
            Command::Apk(apk) if apk.target_name.trim().is_empty() => {
                Err("--target-name must not be empty".to_string())
            }
            Command::App(app) if app.target_name.trim().is_empty() => {
                Err("--target-name must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_app_with_repeated_dylibs() {
        let args = Args::try_parse_from([
            "toucan-bundler",
            "app",
            "--target-name",
            "demo",
            "--target-os",
            "mac",
            "--dylib",
            "liba.dylib",
            "--dylib",
            "libb.dylib",
            "--verbose",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Command::App(app) => assert_eq!(app.dylibs, ["liba.dylib", "libb.dylib"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let result = Args::try_parse_from([
            "toucan-bundler",
            "-v",
            "-q",
            "ipa",
            "--app-file",
            "a.app",
            "--ipa-file",
            "a.ipa",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let args = Args::try_parse_from([
            "toucan-bundler",
            "--tool-timeout",
            "0",
            "ipa",
            "--app-file",
            "a.app",
            "--ipa-file",
            "a.ipa",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }
}

//! TOML configuration file support.
//!
//! A configuration file carries the same options as the command line, grouped
//! into tables. Command line flags always override values read here.
//!
//! ```toml
//! temp-dir = "/tmp/toucan"
//! tool-timeout = 300
//!
//! [manifest]
//! bundle-id-prefix = "com.example"
//! version = "1.2.0"
//! device-families = ["phone"]
//!
//! [tools]
//! codesign = "/usr/bin/codesign"
//!
//! [android]
//! sdk-dir = "/opt/android-sdk"
//! keystore = "debug.keystore"
//!
//! [apple]
//! team-identifier = "ABCDE12345"
//! dylibs = ["libdawn_native.dylib"]
//! ```

use crate::bundler::{ManifestOptions, ToolPaths};
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Manifest synthesizer options
    pub manifest: ManifestOptions,

    /// External tool locations
    pub tools: ToolPaths,

    /// Android SDK and keystore settings
    pub android: AndroidConfig,

    /// Apple signing and bundle settings
    pub apple: AppleConfig,

    /// Root for scoped temporary directories
    pub temp_dir: Option<PathBuf>,

    /// Per-tool timeout in seconds
    pub tool_timeout: Option<u64>,
}

/// `[android]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AndroidConfig {
    /// Android SDK root
    pub sdk_dir: Option<PathBuf>,
    /// `build-tools` version directory (default `latest`)
    pub build_tools: Option<String>,
    /// Platform jar API level (default 26)
    pub platform_level: Option<u32>,
    /// Signing keystore
    pub keystore: Option<PathBuf>,
    /// Keystore passphrase
    pub keystore_pass: Option<String>,
}

/// `[apple]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AppleConfig {
    /// Identity passed to `codesign -s`
    pub codesign_identity: Option<String>,
    /// Developer team identifier
    pub team_identifier: Option<String>,
    /// Provisioning profile for iOS builds
    pub mobile_provision: Option<PathBuf>,
    /// Libraries copied next to a macOS executable
    pub dylibs: Option<Vec<String>>,
    /// Source icon
    pub app_icon: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

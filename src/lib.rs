//! # Toucan Bundler
//!
//! Packages a compiled native binary into an installable platform bundle:
//! a signed Android `.apk`, or an iOS/macOS `.app` with an optional `.ipa`.
//!
//! ## Features
//!
//! - **Manifest synthesis**: `AndroidManifest.xml` and `Info.plist` from target metadata
//! - **Asset catalogs**: app icons rasterized and compiled with `actool`
//! - **Signing**: `apksigner` and `codesign` with generated entitlements
//! - **Atomic publishing**: artifacts appear only after every step succeeded
//! - **Scoped cleanup**: temporary directories are removed on every exit path
//!
//! ## Usage
//!
//! ```bash
//! toucan-bundler apk --target-name demo --target-cpu arm64 --sdk-dir $ANDROID_HOME \
//!     --keystore debug.keystore --source-lib out/libdemo.so --out out/demo.apk
//! toucan-bundler app --target-name demo --target-os mac --minimum-deployment-target 11.0
//! toucan-bundler ipa --app-file out/demo.app --ipa-file out/demo.ipa
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;

// Re-export main types for public API
pub use bundler::{BundledArtifact, Bundler, PackageType, Settings, SettingsBuilder};
pub use cli::Args;
pub use config::FileConfig;
pub use error::{AppError, CliError, ConfigError, Result};

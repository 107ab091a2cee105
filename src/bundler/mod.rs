//! Application bundle assembly.
//!
//! Turns a compiled native binary plus assets into an installable platform
//! package:
//!
//! | Platform | Artifacts | External tools |
//! |----------|-----------|----------------|
//! | Android | `.apk` | `aapt`, `apksigner` |
//! | iOS | `.app`, `.ipa` | `actool`, `sips`, `codesign`, `zip` |
//! | macOS | `.app` | `actool`, `sips`, `codesign` |
//!
//! Every run follows the same shape: stage the binary, describe the bundle
//! (Android manifest or `Info.plist`), compile resources, assemble, sign and
//! publish. Temporary paths are scoped to the run and removed on every exit
//! path, and the public artifact only appears once every step has succeeded.
//!
//! # Example
//!
//! ```no_run
//! use toucan_bundler::bundler::{
//!     AndroidSigning, Bundler, CpuArch, Platform, SettingsBuilder, TargetDescriptor, ToolPaths,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> toucan_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .target(TargetDescriptor::new("demo", Platform::Android, Some(CpuArch::Arm64))?)
//!     .binary("out/libdemo.so")
//!     .output("out/demo.apk")
//!     .tools(ToolPaths::default().with_android_sdk(Path::new("/opt/android-sdk"), "latest", 26))
//!     .android_signing(AndroidSigning::new("debug.keystore", None))
//!     .build()?;
//!
//! let artifacts = Bundler::new(settings).bundle().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
pub mod cleanup;
pub mod error;
pub mod platform;
pub mod resources;
mod settings;
pub mod utils;

// Public re-exports
pub use builder::{Bundler, package_ipa};
pub use error::{Context, Error, ErrorExt, ErrorKind, Result};
pub use platform::{BundleStrategy, ManifestDocument, PackageType};
pub use settings::{
    AndroidSigning, AppleSigning, CpuArch, DEFAULT_ANDROID_MIN_SDK, DEFAULT_ANDROID_PACKAGE_PREFIX,
    DEFAULT_BUNDLE_ID_PREFIX, DEFAULT_MACOS_DYLIBS, DEV_KEYSTORE_PASSPHRASE, DeviceFamily,
    ManifestOptions, Orientation, Platform, Settings, SettingsBuilder, TargetDescriptor, ToolPaths,
    android_abi,
};

/// A published artifact with its size and checksum.
///
/// # Examples
///
/// ```no_run
/// use toucan_bundler::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> toucan_bundler::bundler::Result<()> {
/// for artifact in Bundler::new(settings).bundle().await? {
///     println!("Created {}: {} bytes", artifact.package_type, artifact.size);
///     println!("SHA256: {}", artifact.checksum);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// What was produced.
    pub package_type: PackageType,

    /// Public path of the artifact (a file for `.apk`/`.ipa`, a directory for `.app`).
    pub path: std::path::PathBuf,

    /// Size in bytes; for directories, the sum of every contained file.
    pub size: u64,

    /// SHA-256 checksum, hex encoded.
    pub checksum: String,
}

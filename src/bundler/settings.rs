//! Configuration structures for bundle assembly.
//!
//! This module provides the target descriptor, the manifest option map, the
//! injected external tool paths, signing credentials, and the
//! [`SettingsBuilder`] that validates them into an immutable [`Settings`].

use crate::bundler::error::{Context, Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default reverse-domain prefix for Apple bundle identifiers.
pub const DEFAULT_BUNDLE_ID_PREFIX: &str = "org.toucanlang.sample";

/// Default reverse-domain prefix for Android package names.
pub const DEFAULT_ANDROID_PACKAGE_PREFIX: &str = "org.toucanlang";

/// Default Android `minSdkVersion` and platform jar level.
pub const DEFAULT_ANDROID_MIN_SDK: u32 = 26;

/// Development keystore passphrase, used only when the caller supplies none.
pub const DEV_KEYSTORE_PASSPHRASE: &str = "toucan";

/// Native libraries copied next to a macOS executable unless configured otherwise.
pub const DEFAULT_MACOS_DYLIBS: [&str; 2] = ["libdawn_native.dylib", "libdawn_proc.dylib"];

/// Target platform of a bundle.
///
/// The set is closed: every pipeline stage matches on it exhaustively.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// Android APK.
    Android,
    /// iOS `.app` (flat layout), optionally wrapped into an `.ipa`.
    Ios,
    /// macOS `.app` (`Contents/` layout).
    Mac,
}

impl Platform {
    /// Returns the token used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Mac => "mac",
        }
    }

    /// Returns whether this platform produces an Apple `.app` bundle.
    pub fn is_apple(&self) -> bool {
        matches!(self, Platform::Ios | Platform::Mac)
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "mac" | "macos" => Ok(Platform::Mac),
            other => Err(Error::PlatformError(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of an Android native library.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CpuArch {
    /// 32-bit ARM
    Arm,
    /// 64-bit ARM
    Arm64,
    /// 32-bit Intel
    X86,
    /// 64-bit Intel
    X64,
}

impl CpuArch {
    /// Returns the Android ABI directory name under `lib/`.
    pub fn abi_tag(&self) -> &'static str {
        match self {
            CpuArch::Arm => "armeabi-v7a",
            CpuArch::Arm64 => "arm64-v8a",
            CpuArch::X86 => "x86",
            CpuArch::X64 => "x86_64",
        }
    }
}

impl FromStr for CpuArch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arm" => Ok(CpuArch::Arm),
            "arm64" => Ok(CpuArch::Arm64),
            "x86" => Ok(CpuArch::X86),
            "x64" => Ok(CpuArch::X64),
            other => Err(Error::ArchError(other.to_string())),
        }
    }
}

/// Maps an architecture token straight to its Android ABI tag.
///
/// # Errors
///
/// Returns [`Error::ArchError`] for anything outside `arm`, `arm64`, `x86`, `x64`.
pub fn android_abi(token: &str) -> Result<&'static str> {
    Ok(token.parse::<CpuArch>()?.abi_tag())
}

/// Identifies what is being packaged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetDescriptor {
    name: String,
    platform: Platform,
    cpu_arch: Option<CpuArch>,
}

impl TargetDescriptor {
    /// Creates a descriptor, rejecting an empty target name.
    pub fn new(name: impl Into<String>, platform: Platform, cpu_arch: Option<CpuArch>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("target name must not be empty".into()));
        }
        if platform == Platform::Android && cpu_arch.is_none() {
            return Err(Error::Config(
                "target CPU architecture is required for android targets".into(),
            ));
        }
        Ok(Self {
            name,
            platform,
            cpu_arch,
        })
    }

    /// Target name, used as executable, library and label name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// CPU architecture (always present for Android targets).
    pub fn cpu_arch(&self) -> Option<CpuArch> {
        self.cpu_arch
    }

    /// Target name with hyphens replaced, suitable for a Java package segment.
    pub fn sanitized_name(&self) -> String {
        self.name.replace('-', "_")
    }
}

/// Apple device family identifiers written to `UIDeviceFamily`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceFamily {
    /// iPhone / iPod touch
    Phone,
    /// iPad
    Pad,
}

impl DeviceFamily {
    /// Numeric value used in Info.plist.
    pub fn id(&self) -> i64 {
        match self {
            DeviceFamily::Phone => 1,
            DeviceFamily::Pad => 2,
        }
    }
}

/// Supported interface orientation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Home button at the bottom
    Portrait,
    /// Home button at the top
    PortraitUpsideDown,
    /// Rotated left
    LandscapeLeft,
    /// Rotated right
    LandscapeRight,
}

impl Orientation {
    /// Info.plist value for this orientation.
    pub fn plist_value(&self) -> &'static str {
        match self {
            Orientation::Portrait => "UIInterfaceOrientationPortrait",
            Orientation::PortraitUpsideDown => "UIInterfaceOrientationPortraitUpsideDown",
            Orientation::LandscapeLeft => "UIInterfaceOrientationLandscapeLeft",
            Orientation::LandscapeRight => "UIInterfaceOrientationLandscapeRight",
        }
    }
}

/// String options consumed by the manifest synthesizer.
///
/// Identity-affecting values (the target name) live on [`TargetDescriptor`] and
/// are never defaulted; the values here carry documented defaults except
/// `minimum_version`, which Apple targets must supply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifestOptions {
    /// Prefix for `CFBundleIdentifier`, joined to the target name with a dot.
    pub bundle_id_prefix: String,

    /// Prefix for the Android `package` attribute.
    pub android_package_prefix: String,

    /// Human-readable label. Defaults to the target name.
    pub label: Option<String>,

    /// Minimum platform version: Apple deployment target or Android SDK level.
    pub minimum_version: Option<String>,

    /// Marketing/build version written to `CFBundleShortVersionString` and `CFBundleVersion`.
    pub version: Option<String>,

    /// Device families supported by iOS builds.
    pub device_families: Vec<DeviceFamily>,

    /// Orientations supported on phones.
    pub phone_orientations: Vec<Orientation>,

    /// Orientations supported on tablets.
    pub pad_orientations: Vec<Orientation>,

    /// Produce a debuggable build.
    pub debuggable: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            bundle_id_prefix: DEFAULT_BUNDLE_ID_PREFIX.to_string(),
            android_package_prefix: DEFAULT_ANDROID_PACKAGE_PREFIX.to_string(),
            label: None,
            minimum_version: None,
            version: None,
            device_families: vec![DeviceFamily::Phone, DeviceFamily::Pad],
            phone_orientations: vec![
                Orientation::Portrait,
                Orientation::LandscapeLeft,
                Orientation::LandscapeRight,
            ],
            pad_orientations: vec![
                Orientation::Portrait,
                Orientation::PortraitUpsideDown,
                Orientation::LandscapeLeft,
                Orientation::LandscapeRight,
            ],
            debuggable: false,
        }
    }
}

/// Locations of every external tool the pipeline invokes.
///
/// Bare names are resolved on `PATH` right before spawning; tests substitute
/// absolute paths to fake tools.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolPaths {
    /// Asset catalog compiler
    pub actool: PathBuf,
    /// Image converter for vector icon sources
    pub sips: PathBuf,
    /// Apple code signing tool
    pub codesign: PathBuf,
    /// Deflate archiver used for `.ipa` files
    pub zip: PathBuf,
    /// Android asset packaging tool
    pub aapt: PathBuf,
    /// Android APK signer
    pub apksigner: PathBuf,
    /// Platform SDK jar passed to `aapt -I`
    pub android_jar: Option<PathBuf>,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            actool: PathBuf::from("actool"),
            sips: PathBuf::from("sips"),
            codesign: PathBuf::from("codesign"),
            zip: PathBuf::from("zip"),
            aapt: PathBuf::from("aapt"),
            apksigner: PathBuf::from("apksigner"),
            android_jar: None,
        }
    }
}

impl ToolPaths {
    /// Points the Android tools at an SDK checkout.
    ///
    /// Uses `build-tools/<build_tools>/{aapt,apksigner}` and
    /// `platforms/android-<platform_level>/android.jar`.
    pub fn with_android_sdk(mut self, sdk_dir: &Path, build_tools: &str, platform_level: u32) -> Self {
        let build_tools_dir = sdk_dir.join("build-tools").join(build_tools);
        self.aapt = build_tools_dir.join("aapt");
        self.apksigner = build_tools_dir.join("apksigner");
        self.android_jar = Some(
            sdk_dir
                .join("platforms")
                .join(format!("android-{platform_level}"))
                .join("android.jar"),
        );
        self
    }
}

/// Keystore credential for the Android signing step.
#[derive(Debug, Clone, PartialEq)]
pub struct AndroidSigning {
    /// Path to the keystore file.
    pub keystore: PathBuf,
    /// Keystore passphrase passed as `pass:<passphrase>`.
    pub passphrase: String,
}

impl AndroidSigning {
    /// Creates a signing credential, falling back to the development passphrase.
    pub fn new(keystore: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        let passphrase = passphrase.unwrap_or_else(|| {
            log::warn!("No keystore passphrase supplied, using the development passphrase");
            DEV_KEYSTORE_PASSPHRASE.to_string()
        });
        Self {
            keystore: keystore.into(),
            passphrase,
        }
    }
}

/// Code signing inputs for Apple targets.
///
/// iOS builds require all three values. macOS builds are signed only when an
/// identity is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppleSigning {
    /// Identity passed to `codesign -s`.
    pub identity: Option<String>,
    /// Apple developer team identifier.
    pub team_identifier: Option<String>,
    /// Provisioning profile copied to `embedded.mobileprovision`.
    pub provisioning_profile: Option<PathBuf>,
}

/// Complete, validated configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    target: TargetDescriptor,
    manifest: ManifestOptions,
    binary: PathBuf,
    icon: Option<PathBuf>,
    dependency_libraries: Vec<String>,
    tools: ToolPaths,
    android_signing: Option<AndroidSigning>,
    apple_signing: AppleSigning,
    output: PathBuf,
    ipa_output: Option<PathBuf>,
    temp_root: PathBuf,
    tool_timeout: Option<Duration>,
}

impl Settings {
    /// Returns the target descriptor.
    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    /// Returns the manifest options.
    pub fn manifest_options(&self) -> &ManifestOptions {
        &self.manifest
    }

    /// Path of the source executable or native library.
    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Source icon, if one was supplied.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Library file names copied next to a macOS executable.
    pub fn dependency_libraries(&self) -> &[String] {
        &self.dependency_libraries
    }

    /// External tool locations.
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Android keystore credential.
    pub fn android_signing(&self) -> Option<&AndroidSigning> {
        self.android_signing.as_ref()
    }

    /// Apple code signing inputs.
    pub fn apple_signing(&self) -> &AppleSigning {
        &self.apple_signing
    }

    /// Public path of the final artifact (`.apk` file or `.app` directory).
    pub fn artifact_path(&self) -> &Path {
        &self.output
    }

    /// Optional `.ipa` to derive from the `.app`.
    pub fn ipa_output(&self) -> Option<&Path> {
        self.ipa_output.as_deref()
    }

    /// Directory under which scoped temporary directories are allocated.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Per-invocation timeout for external tools.
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout
    }

    /// Reverse-domain Apple bundle identifier, e.g. `org.toucanlang.sample.demo`.
    pub fn bundle_identifier(&self) -> String {
        format!("{}.{}", self.manifest.bundle_id_prefix, self.target.name())
    }

    /// Android package attribute, e.g. `org.toucanlang.my_game`.
    pub fn android_package(&self) -> String {
        format!(
            "{}.{}",
            self.manifest.android_package_prefix,
            self.target.sanitized_name()
        )
    }

    /// Human-readable label, defaulting to the target name.
    pub fn label(&self) -> &str {
        self.manifest.label.as_deref().unwrap_or(self.target.name())
    }
}

/// Builder for constructing [`Settings`].
///
/// ```no_run
/// use toucan_bundler::bundler::{Platform, SettingsBuilder, TargetDescriptor};
///
/// # fn example() -> toucan_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .target(TargetDescriptor::new("demo", Platform::Mac, None)?)
///     .binary("out/demo")
///     .output("out/demo.app")
///     .minimum_version("11.0")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    target: Option<TargetDescriptor>,
    manifest: ManifestOptions,
    binary: Option<PathBuf>,
    icon: Option<PathBuf>,
    dependency_libraries: Option<Vec<String>>,
    tools: ToolPaths,
    android_signing: Option<AndroidSigning>,
    apple_signing: AppleSigning,
    output: Option<PathBuf>,
    ipa_output: Option<PathBuf>,
    temp_root: Option<PathBuf>,
    tool_timeout: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the target descriptor. Required.
    pub fn target(mut self, target: TargetDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    /// Replaces the manifest options.
    pub fn manifest_options(mut self, options: ManifestOptions) -> Self {
        self.manifest = options;
        self
    }

    /// Sets the minimum platform version.
    pub fn minimum_version(mut self, version: impl Into<String>) -> Self {
        self.manifest.minimum_version = Some(version.into());
        self
    }

    /// Enables or disables debuggable builds.
    pub fn debuggable(mut self, debuggable: bool) -> Self {
        self.manifest.debuggable = debuggable;
        self
    }

    /// Sets the source executable or library. Required.
    pub fn binary<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.binary = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the source icon.
    pub fn icon<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the macOS dependency library names.
    ///
    /// Default: [`DEFAULT_MACOS_DYLIBS`]
    pub fn dependency_libraries(mut self, libs: Vec<String>) -> Self {
        self.dependency_libraries = Some(libs);
        self
    }

    /// Sets the external tool locations.
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    /// Sets the Android keystore credential.
    pub fn android_signing(mut self, signing: AndroidSigning) -> Self {
        self.android_signing = Some(signing);
        self
    }

    /// Sets the Apple code signing inputs.
    pub fn apple_signing(mut self, signing: AppleSigning) -> Self {
        self.apple_signing = signing;
        self
    }

    /// Sets the public artifact path. Required.
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Requests an `.ipa` derived from the produced `.app`.
    pub fn ipa_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.ipa_output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the temporary directory root.
    ///
    /// Default: the system temporary directory.
    pub fn temp_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.temp_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets a timeout applied to every external tool invocation.
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the target, binary or output is
    /// missing, if an Apple target has no minimum deployment target, if an
    /// Android target has no keystore, or if an iOS target lacks any of its
    /// signing inputs.
    pub fn build(self) -> Result<Settings> {
        let target = self.target.context("target descriptor is required")?;
        let binary = self.binary.context("source binary path is required")?;
        let output = self.output.context("output artifact path is required")?;

        match target.platform() {
            Platform::Android => {
                if self.android_signing.is_none() {
                    return Err(Error::Config("a keystore is required for android targets".into()));
                }
                if let Some(version) = &self.manifest.minimum_version {
                    version.parse::<u32>().map_err(|_| {
                        Error::Config(format!("android minimum SDK must be an integer, got {version}"))
                    })?;
                }
            }
            Platform::Ios | Platform::Mac => {
                if self.manifest.minimum_version.is_none() {
                    return Err(Error::Config(format!(
                        "minimum deployment target is required for {} targets",
                        target.platform()
                    )));
                }
            }
        }

        if target.platform() == Platform::Ios {
            let signing = &self.apple_signing;
            if signing.identity.is_none() {
                return Err(Error::Config("codesign identity is required for ios targets".into()));
            }
            if signing.team_identifier.is_none() {
                return Err(Error::Config("team identifier is required for ios targets".into()));
            }
            if signing.provisioning_profile.is_none() {
                return Err(Error::Config(
                    "mobile provisioning profile is required for ios targets".into(),
                ));
            }
        }

        if self.ipa_output.is_some() && target.platform() != Platform::Ios {
            return Err(Error::Config("an .ipa can only be produced for ios targets".into()));
        }

        let dependency_libraries = match self.dependency_libraries {
            Some(libs) => libs,
            None if target.platform() == Platform::Mac => {
                DEFAULT_MACOS_DYLIBS.iter().map(|s| s.to_string()).collect()
            }
            None => Vec::new(),
        };

        Ok(Settings {
            target,
            manifest: self.manifest,
            binary,
            icon: self.icon,
            dependency_libraries,
            tools: self.tools,
            android_signing: self.android_signing,
            apple_signing: self.apple_signing,
            output,
            ipa_output: self.ipa_output,
            temp_root: self.temp_root.unwrap_or_else(std::env::temp_dir),
            tool_timeout: self.tool_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::ErrorKind;

    #[test]
    fn abi_mapping_is_total_over_declared_tokens() {
        assert_eq!(android_abi("arm").unwrap(), "armeabi-v7a");
        assert_eq!(android_abi("arm64").unwrap(), "arm64-v8a");
        assert_eq!(android_abi("x86").unwrap(), "x86");
        assert_eq!(android_abi("x64").unwrap(), "x86_64");
    }

    #[test]
    fn unknown_arch_is_configuration_error() {
        for token in ["mips", "aarch64", "", "ARM"] {
            let err = android_abi(token).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "token {token:?}");
        }
    }

    #[test]
    fn unknown_platform_is_configuration_error() {
        let err = "windows".parse::<Platform>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!("mac".parse::<Platform>().unwrap(), Platform::Mac);
    }

    #[test]
    fn empty_target_name_is_rejected() {
        assert!(TargetDescriptor::new("  ", Platform::Mac, None).is_err());
        assert!(TargetDescriptor::new("demo", Platform::Android, None).is_err());
    }

    #[test]
    fn identifiers_follow_prefixes() {
        let settings = SettingsBuilder::new()
            .target(TargetDescriptor::new("demo", Platform::Mac, None).unwrap())
            .binary("demo")
            .output("demo.app")
            .minimum_version("11.0")
            .build()
            .unwrap();
        assert_eq!(settings.bundle_identifier(), "org.toucanlang.sample.demo");

        let settings = SettingsBuilder::new()
            .target(TargetDescriptor::new("my-game", Platform::Android, Some(CpuArch::Arm64)).unwrap())
            .binary("libmy-game.so")
            .output("my-game.apk")
            .android_signing(AndroidSigning::new("debug.keystore", Some("secret".into())))
            .build()
            .unwrap();
        assert_eq!(settings.android_package(), "org.toucanlang.my_game");
    }

    #[test]
    fn apple_targets_require_minimum_version() {
        let err = SettingsBuilder::new()
            .target(TargetDescriptor::new("demo", Platform::Mac, None).unwrap())
            .binary("demo")
            .output("demo.app")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn ios_requires_signing_inputs() {
        let err = SettingsBuilder::new()
            .target(TargetDescriptor::new("demo", Platform::Ios, None).unwrap())
            .binary("demo")
            .output("demo.app")
            .minimum_version("15.0")
            .apple_signing(AppleSigning {
                identity: Some("Apple Development".into()),
                team_identifier: None,
                provisioning_profile: Some("demo.mobileprovision".into()),
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("team identifier"));
    }

    #[test]
    fn mac_defaults_dependency_libraries() {
        let settings = SettingsBuilder::new()
            .target(TargetDescriptor::new("demo", Platform::Mac, None).unwrap())
            .binary("demo")
            .output("demo.app")
            .minimum_version("11.0")
            .build()
            .unwrap();
        assert_eq!(
            settings.dependency_libraries(),
            ["libdawn_native.dylib", "libdawn_proc.dylib"]
        );
    }

    #[test]
    fn android_sdk_layout() {
        let tools = ToolPaths::default().with_android_sdk(Path::new("/sdk"), "latest", 26);
        assert_eq!(tools.aapt, Path::new("/sdk/build-tools/latest/aapt"));
        assert_eq!(tools.apksigner, Path::new("/sdk/build-tools/latest/apksigner"));
        assert_eq!(
            tools.android_jar.as_deref(),
            Some(Path::new("/sdk/platforms/android-26/android.jar"))
        );
    }
}

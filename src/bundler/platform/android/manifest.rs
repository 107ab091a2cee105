//! `AndroidManifest.xml` generation.
//!
//! Every APK produced here has the same shape: one `NativeActivity` that
//! loads the target's shared library, launched from a single MAIN/LAUNCHER
//! intent filter, with no Java code. Only the package, labels, library
//! name, minimum SDK and debuggable flag vary.

use crate::bundler::error::{Error, Result};
use crate::bundler::settings::{DEFAULT_ANDROID_MIN_SDK, Platform, Settings};
use handlebars::Handlebars;
use serde::Serialize;

const MANIFEST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
          xmlns:tools="http://schemas.android.com/tools"
          package="{{package}}">
  <uses-sdk android:minSdkVersion="{{min_sdk}}"/>
  <application android:allowBackup="false"
               android:label="{{label}}"
               android:hasCode="false"{{#if debuggable}}
               android:debuggable="true"{{/if}}>
    <activity android:name="android.app.NativeActivity"
              android:label="{{label}}"
              android:exported="true">
      <meta-data android:name="android.app.lib_name"
                 android:value="{{lib_name}}"/>
      <intent-filter>
        <action android:name="android.intent.action.MAIN"/>
        <category android:name="android.intent.category.LAUNCHER"/>
      </intent-filter>
    </activity>
  </application>
</manifest>
"#;

#[derive(Serialize)]
struct ManifestData<'a> {
    package: String,
    min_sdk: u32,
    label: &'a str,
    lib_name: &'a str,
    debuggable: bool,
}

/// A rendered Android manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidManifest {
    package: String,
    xml: String,
}

impl AndroidManifest {
    /// Renders the manifest for an Android target.
    ///
    /// The library name is the unmodified target name (it must match
    /// `lib<name>.so`), while the package attribute uses the sanitized name.
    pub fn synthesize(settings: &Settings) -> Result<Self> {
        let target = settings.target();
        if target.platform() != Platform::Android {
            return Err(Error::Config(format!(
                "cannot write an Android manifest for a {} target",
                target.platform()
            )));
        }

        let options = settings.manifest_options();
        let min_sdk = match options.minimum_version.as_deref() {
            Some(level) => level.parse::<u32>().map_err(|_| {
                Error::Config(format!("android minimum SDK must be an integer, got {level}"))
            })?,
            None => DEFAULT_ANDROID_MIN_SDK,
        };

        let data = ManifestData {
            package: settings.android_package(),
            min_sdk,
            label: settings.label(),
            lib_name: target.name(),
            debuggable: options.debuggable,
        };

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_template_string("AndroidManifest.xml", MANIFEST_TEMPLATE)?;
        let xml = handlebars.render("AndroidManifest.xml", &data)?;

        Ok(Self {
            package: data.package,
            xml,
        })
    }

    /// The `package` attribute.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The serialized document.
    pub fn as_str(&self) -> &str {
        &self.xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{
        AndroidSigning, CpuArch, ManifestOptions, SettingsBuilder, TargetDescriptor,
    };

    fn settings(name: &str, options: ManifestOptions) -> Settings {
        SettingsBuilder::new()
            .target(TargetDescriptor::new(name, Platform::Android, Some(CpuArch::Arm64)).unwrap())
            .manifest_options(options)
            .binary(format!("lib{name}.so"))
            .output(format!("{name}.apk"))
            .android_signing(AndroidSigning::new("debug.keystore", Some("pw".into())))
            .build()
            .unwrap()
    }

    #[test]
    fn substitutes_package_and_library_names() {
        let manifest = AndroidManifest::synthesize(&settings("my-game", Default::default())).unwrap();
        let xml = manifest.as_str();

        assert_eq!(manifest.package(), "org.toucanlang.my_game");
        assert!(xml.contains(r#"package="org.toucanlang.my_game""#));
        assert!(xml.contains(r#"android:value="my-game""#));
        assert!(xml.contains(r#"android:label="my-game""#));
        assert!(xml.contains(r#"<uses-sdk android:minSdkVersion="26"/>"#));
        assert!(xml.contains(r#"android:name="android.app.NativeActivity""#));
        assert!(xml.contains(r#"android:hasCode="false""#));
        assert!(!xml.contains("debuggable"));
    }

    #[test]
    fn label_override_leaves_library_name() {
        let options = ManifestOptions {
            label: Some("My Game".into()),
            minimum_version: Some("28".into()),
            debuggable: true,
            ..Default::default()
        };
        let xml = AndroidManifest::synthesize(&settings("my-game", options))
            .unwrap()
            .as_str()
            .to_string();

        assert_eq!(xml.matches(r#"android:label="My Game""#).count(), 2);
        assert!(xml.contains(r#"android:value="my-game""#));
        assert!(xml.contains(r#"android:minSdkVersion="28""#));
        assert!(xml.contains(r#"android:debuggable="true""#));
    }

    #[test]
    fn label_is_escaped() {
        let options = ManifestOptions {
            label: Some("Cats & \"Dogs\"".into()),
            ..Default::default()
        };
        let xml = AndroidManifest::synthesize(&settings("pets", options))
            .unwrap()
            .as_str()
            .to_string();

        assert!(xml.contains("Cats &amp; &quot;Dogs&quot;"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let settings = settings("demo", Default::default());
        let first = AndroidManifest::synthesize(&settings).unwrap();
        let second = AndroidManifest::synthesize(&settings).unwrap();
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
    }
}

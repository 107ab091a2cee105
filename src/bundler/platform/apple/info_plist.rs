//! `Info.plist` synthesis for iOS and macOS bundles.
//!
//! The dictionary is built from the target descriptor and manifest options,
//! optionally enriched by the asset compiler's partial plist, and serialized
//! once with every dictionary's keys sorted so identical inputs always give
//! identical bytes.

use crate::bundler::error::{Context, Error, Result};
use crate::bundler::settings::{Orientation, Platform, Settings};
use plist::{Dictionary, Value};

/// Property list describing an Apple application bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoPlist {
    dict: Dictionary,
}

impl InfoPlist {
    /// Builds the dictionary for an iOS or macOS target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for Android targets or when no minimum
    /// deployment target was supplied.
    pub fn synthesize(settings: &Settings) -> Result<Self> {
        let target = settings.target();
        let options = settings.manifest_options();
        let minimum_version = options
            .minimum_version
            .clone()
            .context("minimum deployment target is required for apple targets")?;

        let mut dict = Dictionary::new();
        dict.insert("CFBundleExecutable".into(), target.name().into());
        dict.insert("CFBundleIdentifier".into(), settings.bundle_identifier().into());
        dict.insert("CFBundleName".into(), target.name().into());
        dict.insert("CFBundleDisplayName".into(), settings.label().into());
        dict.insert("CFBundlePackageType".into(), "APPL".into());
        dict.insert("CFBundleInfoDictionaryVersion".into(), "6.0".into());
        if let Some(version) = &options.version {
            dict.insert("CFBundleShortVersionString".into(), version.clone().into());
            dict.insert("CFBundleVersion".into(), version.clone().into());
        }

        match target.platform() {
            Platform::Ios => {
                let families = options
                    .device_families
                    .iter()
                    .map(|family| Value::Integer(family.id().into()))
                    .collect();
                dict.insert("UIDeviceFamily".into(), Value::Array(families));
                dict.insert(
                    "UISupportedInterfaceOrientations~iphone".into(),
                    orientations(&options.phone_orientations),
                );
                dict.insert(
                    "UISupportedInterfaceOrientations~ipad".into(),
                    orientations(&options.pad_orientations),
                );
                dict.insert("MinimumOSVersion".into(), minimum_version.into());
            }
            Platform::Mac => {
                dict.insert("LSMinimumSystemVersion".into(), minimum_version.into());
                dict.insert("NSHighResolutionCapable".into(), true.into());
            }
            Platform::Android => {
                return Err(Error::Config(
                    "cannot write an Info.plist for an android target".into(),
                ));
            }
        }

        Ok(Self { dict })
    }

    /// Merges a fragment into the document.
    ///
    /// Keys already present are kept. When both sides hold a dictionary under
    /// the same key, the two are merged recursively with the same rule.
    pub fn merge_fragment(&mut self, fragment: Dictionary) {
        merge_absent(&mut self.dict, fragment);
    }

    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.dict.get(key)
    }

    /// Serializes to XML with all keys sorted.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        sorted_xml(&self.dict)
    }
}

/// Serializes a dictionary as an XML property list with every nested
/// dictionary's keys in sorted order.
pub(crate) fn sorted_xml(dict: &Dictionary) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    Value::Dictionary(sorted(dict)).to_writer_xml(&mut bytes)?;
    Ok(bytes)
}

fn orientations(list: &[Orientation]) -> Value {
    Value::Array(list.iter().map(|o| o.plist_value().into()).collect())
}

fn merge_absent(base: &mut Dictionary, fragment: Dictionary) {
    for (key, value) in fragment {
        match base.get_mut(&key) {
            None => {
                base.insert(key, value);
            }
            Some(Value::Dictionary(existing)) if matches!(value, Value::Dictionary(_)) => {
                if let Value::Dictionary(incoming) = value {
                    merge_absent(existing, incoming);
                }
            }
            Some(_) => {
                log::debug!("Keeping explicit Info.plist value for {key}");
            }
        }
    }
}

fn sorted(dict: &Dictionary) -> Dictionary {
    let mut entries: Vec<(&String, &Value)> = dict.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(key, value)| (key.clone(), sorted_value(value)))
        .collect()
}

fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Dictionary(dict) => Value::Dictionary(sorted(dict)),
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}

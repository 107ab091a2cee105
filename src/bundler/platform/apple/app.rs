//! Apple application bundle (`.app`) staging.
//!
//! macOS bundles use the `Contents/{MacOS,Resources}` layout; iOS bundles are
//! flat, with the executable, resources and `Info.plist` at the bundle root.

use crate::bundler::error::{Context, Error, Result};
use crate::bundler::settings::{Platform, Settings};
use crate::bundler::utils::fs;
use std::path::{Path, PathBuf};

/// Directory layout of an `.app` bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    root: PathBuf,
    contents: PathBuf,
    executable_dir: PathBuf,
    resources_dir: PathBuf,
}

impl AppLayout {
    /// Layout of a bundle rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Result<Self> {
        let root = root.into();
        match platform {
            Platform::Mac => {
                let contents = root.join("Contents");
                Ok(Self {
                    executable_dir: contents.join("MacOS"),
                    resources_dir: contents.join("Resources"),
                    contents,
                    root,
                })
            }
            Platform::Ios => Ok(Self {
                contents: root.clone(),
                executable_dir: root.clone(),
                resources_dir: root.clone(),
                root,
            }),
            Platform::Android => Err(Error::Config(
                "android targets are not packaged as .app bundles".into(),
            )),
        }
    }

    /// Bundle root (`<name>.app`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the executable and its libraries.
    pub fn executable_dir(&self) -> &Path {
        &self.executable_dir
    }

    /// Directory receiving compiled assets.
    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Location of `Info.plist`.
    pub fn info_plist_path(&self) -> PathBuf {
        self.contents.join("Info.plist")
    }
}

/// Creates the bundle skeleton and copies the executable into it.
///
/// Anything already at the bundle root is removed first. On macOS the
/// configured dependency libraries are copied from the binary's directory
/// into `Contents/MacOS` as well.
///
/// # Errors
///
/// Filesystem error naming the missing path if the binary or any
/// dependency library does not exist.
pub async fn stage_bundle(settings: &Settings, layout: &AppLayout) -> Result<()> {
    let target = settings.target();
    log::info!(
        "Staging {} bundle at {}",
        target.platform(),
        layout.root().display()
    );

    fs::create_dir_all(layout.root(), true).await?;
    fs::create_dir_all(layout.executable_dir(), false).await?;
    fs::create_dir_all(layout.resources_dir(), false).await?;

    if target.platform() == Platform::Mac {
        let source_dir = settings
            .binary_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        for library in settings.dependency_libraries() {
            let src = source_dir.join(library);
            fs::copy_file(&src, &layout.executable_dir().join(library))
                .await
                .with_context(|| format!("failed to copy dependency library {library}"))?;
            log::debug!("Copied {}", src.display());
        }
    }

    let dest = layout.executable_dir().join(target.name());
    fs::copy_file(settings.binary_path(), &dest)
        .await
        .with_context(|| format!("failed to copy executable {}", target.name()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{SettingsBuilder, TargetDescriptor};

    fn mac_settings(dir: &Path, libs: Vec<String>) -> Settings {
        SettingsBuilder::new()
            .target(TargetDescriptor::new("demo", Platform::Mac, None).unwrap())
            .binary(dir.join("out/demo"))
            .output(dir.join("demo.app"))
            .minimum_version("11.0")
            .dependency_libraries(libs)
            .build()
            .unwrap()
    }

    #[test]
    fn ios_layout_is_flat() {
        let layout = AppLayout::new("demo.app", Platform::Ios).unwrap();
        assert_eq!(layout.executable_dir(), Path::new("demo.app"));
        assert_eq!(layout.info_plist_path(), Path::new("demo.app/Info.plist"));
    }

    #[test]
    fn mac_layout_uses_contents() {
        let layout = AppLayout::new("demo.app", Platform::Mac).unwrap();
        assert_eq!(layout.executable_dir(), Path::new("demo.app/Contents/MacOS"));
        assert_eq!(layout.resources_dir(), Path::new("demo.app/Contents/Resources"));
        assert_eq!(layout.info_plist_path(), Path::new("demo.app/Contents/Info.plist"));
    }

    #[tokio::test]
    async fn stages_executable_and_libraries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/demo"), b"exe").unwrap();
        std::fs::write(dir.path().join("out/libfoo.dylib"), b"lib").unwrap();

        let settings = mac_settings(dir.path(), vec!["libfoo.dylib".into()]);
        let layout = AppLayout::new(dir.path().join("demo.app"), Platform::Mac).unwrap();
        std::fs::create_dir_all(layout.root().join("stale")).unwrap();

        stage_bundle(&settings, &layout).await.unwrap();

        assert_eq!(std::fs::read(layout.executable_dir().join("demo")).unwrap(), b"exe");
        assert!(layout.executable_dir().join("libfoo.dylib").exists());
        assert!(layout.resources_dir().is_dir());
        assert!(!layout.root().join("stale").exists());
    }

    #[tokio::test]
    async fn missing_library_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/demo"), b"exe").unwrap();

        let settings = mac_settings(dir.path(), vec!["libdawn_proc.dylib".into()]);
        let layout = AppLayout::new(dir.path().join("demo.app"), Platform::Mac).unwrap();

        let err = stage_bundle(&settings, &layout).await.unwrap_err();

        assert_eq!(err.kind(), crate::bundler::ErrorKind::Filesystem);
        assert!(err.to_string().contains("libdawn_proc.dylib"));
    }
}

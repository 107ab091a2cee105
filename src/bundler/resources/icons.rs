//! Application icon rasterization.
//!
//! Asset catalogs take a single square PNG. Raster sources (PNG, JPEG, ...)
//! are resampled in-process; vector sources (`.svg`, `.pdf`) are handed to
//! `sips`, which renders them at the requested size.

use crate::bundler::error::{Context, Error, ErrorExt, Result};
use crate::bundler::utils::process::ToolCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;

/// Edge length, in pixels, of the icon placed in an asset catalog.
pub const APP_ICON_SIZE: u32 = 1024;

/// Returns whether `path` names a vector image that needs an external renderer.
pub fn is_vector_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("pdf"))
}

/// Loads and resizes an icon to exact dimensions.
///
/// Uses Lanczos3 filtering, which gives the best quality when downscaling
/// large artwork.
pub fn load_and_resize(
    source_path: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<image::RgbaImage> {
    let img = image::open(source_path)
        .map_err(Error::from)
        .with_context(|| format!("failed to decode icon {}", source_path.display()))?;

    let resized = img.resize_exact(
        target_width,
        target_height,
        image::imageops::FilterType::Lanczos3,
    );

    Ok(resized.to_rgba8())
}

/// Writes `source` as a `size`×`size` PNG at `dest`.
///
/// # Errors
///
/// - Filesystem error naming `source` if it is missing
/// - Image error naming `source` if it cannot be decoded
/// - External tool error if `sips` fails on a vector source
pub async fn rasterize_icon(
    source: &Path,
    dest: &Path,
    size: u32,
    sips: &Path,
    timeout: Option<Duration>,
) -> Result<()> {
    tokio::fs::metadata(source)
        .await
        .fs_context("reading icon", source)?;

    if is_vector_source(source) {
        log::debug!("Rendering vector icon {} with sips", source.display());
        let edge = size.to_string();
        return ToolCommand::new(sips)
            .arg(source)
            .arg("-o")
            .arg(dest)
            .args(["-s", "format", "png", "--resampleHeightWidth"])
            .args([&edge, &edge])
            .timeout(timeout)
            .run()
            .await;
    }

    let source: PathBuf = source.to_path_buf();
    let output = dest.to_path_buf();

    // Decoding and resampling are CPU-bound
    task::spawn_blocking(move || -> Result<()> {
        let rgba = load_and_resize(&source, size, size)?;
        rgba.save_with_format(&output, image::ImageFormat::Png)?;
        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("icon rasterization task failed: {e}")))??;

    log::debug!("Rasterized icon to {}x{} at {}", size, size, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_vector_sources() {
        assert!(is_vector_source(Path::new("icon.svg")));
        assert!(is_vector_source(Path::new("Icon.PDF")));
        assert!(!is_vector_source(Path::new("icon.png")));
        assert!(!is_vector_source(Path::new("icon")));
    }

    #[tokio::test]
    async fn raster_icons_are_resampled_to_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("icon.png");
        image::RgbaImage::from_pixel(40, 20, image::Rgba([200, 10, 10, 255]))
            .save(&source)
            .unwrap();
        let dest = dir.path().join("AppIcon.png");

        rasterize_icon(&source, &dest, 64, Path::new("sips"), None)
            .await
            .unwrap();

        let output = image::open(&dest).unwrap();
        assert_eq!((output.width(), output.height()), (64, 64));
    }

    #[tokio::test]
    async fn missing_icon_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.png");

        let err = rasterize_icon(&source, &dir.path().join("out.png"), 64, Path::new("sips"), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::bundler::ErrorKind::Filesystem);
        assert!(err.to_string().contains("missing.png"));
    }

    #[tokio::test]
    async fn undecodable_icon_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("corrupt.png");
        std::fs::write(&source, b"not a png").unwrap();
        let dest = dir.path().join("out.png");

        let err = rasterize_icon(&source, &dest, 64, Path::new("sips"), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::bundler::ErrorKind::Internal);
        assert!(matches!(
            &err,
            Error::Context(_, inner) if matches!(**inner, Error::ImageError(_))
        ));
        assert!(err.to_string().contains("corrupt.png"));
        assert!(!dest.exists());
    }
}

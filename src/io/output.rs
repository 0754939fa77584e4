// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Writing exports to disk and the clipboard.

use crate::models::export::{ExportFormat, Quality};
use crate::render::encode::{encode, EncodedImage};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Timestamped default file name, e.g. `snapframe-20250101-120000.png`.
pub fn suggested_filename(format: ExportFormat) -> String {
    format!(
        "snapframe-{}.{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Where direct saves go: the Pictures folder, else home, else cwd.
pub fn pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Persist `encoded`. With a suggested name the file goes straight into
/// the Pictures folder; otherwise, or when that write fails, a save
/// dialog asks for a destination. `None` means the user cancelled or the
/// write failed.
pub fn save_image(encoded: &EncodedImage, suggested: Option<&str>) -> Option<PathBuf> {
    if let Some(name) = suggested {
        match write_image(encoded, &pictures_dir().join(name)) {
            Ok(path) => return Some(path),
            Err(e) => log::warn!("Direct save failed, asking for a location: {:#}", e),
        }
    }

    let default_name = suggested
        .map(str::to_string)
        .unwrap_or_else(|| suggested_filename(encoded.format));
    let path = rfd::FileDialog::new()
        .add_filter("PNG", &["png"])
        .add_filter("JPEG", &["jpg", "jpeg"])
        .set_directory(pictures_dir())
        .set_file_name(default_name)
        .save_file()?;

    match write_image(encoded, &path) {
        Ok(path) => Some(path),
        Err(e) => {
            log::error!("Failed to save image: {:#}", e);
            None
        }
    }
}

/// Write `encoded` to `path`. A path without a known image extension gets
/// the encoded format's extension; one naming the other format is
/// re-encoded to match it.
pub fn write_image(encoded: &EncodedImage, path: &Path) -> Result<PathBuf> {
    let quality = match encoded.format {
        ExportFormat::Jpeg { quality } => quality,
        ExportFormat::Png => Quality::DEFAULT,
    };
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let mut path = path.to_path_buf();
    let reencoded;
    let bytes = match ExportFormat::from_extension(ext, quality) {
        Some(wanted)
            if std::mem::discriminant(&wanted) != std::mem::discriminant(&encoded.format) =>
        {
            log::info!("Re-encoding export as {} to match {}", wanted.mime_type(), path.display());
            let img = encoded.decode().context("Failed to decode export")?;
            reencoded = encode(&img, wanted).context("Failed to re-encode export")?;
            &reencoded.bytes
        }
        Some(_) => &encoded.bytes,
        None => {
            path.set_extension(encoded.extension());
            &encoded.bytes
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Put the export on the clipboard as image data. Failures are logged,
/// never returned.
pub fn copy_to_clipboard(encoded: &EncodedImage) -> bool {
    let img = match encoded.decode() {
        Ok(img) => img,
        Err(e) => {
            log::warn!("Clipboard copy failed, cannot decode export: {}", e);
            return false;
        }
    };
    let data = arboard::ImageData {
        width: img.width() as usize,
        height: img.height() as usize,
        bytes: Cow::Owned(img.into_raw()),
    };
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_image(data)) {
        Ok(()) => {
            log::info!("Copied {}x{} image to clipboard", encoded.width, encoded.height);
            true
        }
        Err(e) => {
            log::warn!("Clipboard copy failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png() -> EncodedImage {
        encode(
            &RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 255])),
            ExportFormat::Png,
        )
        .unwrap()
    }

    #[test]
    fn test_matching_extension_writes_bytes_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let encoded = png();
        let path = write_image(&encoded, &dir.path().join("shot.png")).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), encoded.bytes);
    }

    #[test]
    fn test_mismatched_extension_is_reencoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&png(), &dir.path().join("shot.jpg")).unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_missing_extension_is_added() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&png(), &dir.path().join("shot")).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(path.exists());
    }

    #[test]
    fn test_suggested_filename_extension() {
        let name = suggested_filename(ExportFormat::Jpeg {
            quality: Quality::DEFAULT,
        });
        assert!(name.starts_with("snapframe-"));
        assert!(name.ends_with(".jpg"));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Native capture through `xcap`.

use super::{CaptureSource, CapturedSource};
use crate::error::CaptureError;
use image::RgbaImage;
use xcap::{Monitor, Window};

/// Our own window title, never offered as a capture target.
const OWN_TITLE: &str = "Snapframe";
/// Windows smaller than this in either direction are skipped.
const MIN_WINDOW_SIZE: u32 = 10;

#[derive(Debug, Default)]
pub struct XcapSource;

impl XcapSource {
    pub fn new() -> Self {
        Self
    }
}

/// Re-wrap xcap's bitmap in this crate's image type.
fn to_rgba(img: xcap::image::RgbaImage) -> Result<RgbaImage, CaptureError> {
    let (w, h) = img.dimensions();
    RgbaImage::from_raw(w, h, img.into_raw())
        .ok_or_else(|| CaptureError::Capture("bitmap size mismatch".into()))
}

impl CaptureSource for XcapSource {
    fn capture_screen(&self) -> Result<CapturedSource, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;
        let index = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors.get(index).ok_or(CaptureError::NoDisplay)?;

        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::Capture(e.to_string()))?;
        let name = monitor.name().unwrap_or_else(|_| "Screen".to_string());
        log::info!("Captured screen `{}` ({}x{})", name, image.width(), image.height());

        Ok(CapturedSource {
            id: format!("screen:{index}"),
            name,
            image: to_rgba(image)?,
        })
    }

    fn capture_windows(&self) -> Result<Vec<CapturedSource>, CaptureError> {
        let windows = Window::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;
        let mut captured = Vec::new();

        for window in windows {
            let title = window.title().unwrap_or_default();
            let app_name = window.app_name().unwrap_or_default();
            let usable = !window.is_minimized().unwrap_or(true)
                && !title.is_empty()
                && title != OWN_TITLE
                && window.width().unwrap_or(0) > MIN_WINDOW_SIZE
                && window.height().unwrap_or(0) > MIN_WINDOW_SIZE;
            if !usable {
                continue;
            }

            match window.capture_image() {
                Ok(image) => {
                    let name = if app_name.is_empty() || app_name == title {
                        title
                    } else {
                        format!("{app_name}: {title}")
                    };
                    let id = window.id().map(|id| format!("window:{id}")).unwrap_or_else(|_| {
                        format!("window:{}", captured.len())
                    });
                    captured.push(CapturedSource {
                        id,
                        name,
                        image: to_rgba(image)?,
                    });
                }
                Err(e) => log::warn!("Skipping window `{}`: {}", title, e),
            }
        }

        log::info!("Captured {} window(s)", captured.len());
        Ok(captured)
    }
}

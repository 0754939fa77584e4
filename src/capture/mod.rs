// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Screen and window capture.
//!
//! The OS capture backend sits behind [`CaptureSource`]; the rest of the
//! application only ever sees bitmaps with an identity. The native
//! backend is compiled in with the `native-capture` feature.

pub mod region;
#[cfg(feature = "native-capture")]
pub mod xcap_source;

use crate::error::{CaptureError, ExportError};
use crate::models::export::ExportFormat;
use crate::render::encode::encode;
use image::RgbaImage;
use std::sync::Arc;

/// What the user asked to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Fullscreen,
    Region,
    Window,
}

impl CaptureKind {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureKind::Fullscreen => "Full screen",
            CaptureKind::Region => "Region",
            CaptureKind::Window => "Window",
        }
    }
}

/// One captured bitmap and the source it came from.
#[derive(Debug, Clone)]
pub struct CapturedSource {
    pub id: String,
    pub name: String,
    pub image: RgbaImage,
}

impl CapturedSource {
    /// Embeddable PNG data URL of the bitmap.
    pub fn to_data_url(&self) -> Result<String, ExportError> {
        Ok(encode(&self.image, ExportFormat::Png)?.to_data_url())
    }
}

/// Provider of screen and window bitmaps.
pub trait CaptureSource: Send + Sync {
    /// The entire primary display.
    fn capture_screen(&self) -> Result<CapturedSource, CaptureError>;

    /// Every capturable window, in enumeration order.
    fn capture_windows(&self) -> Result<Vec<CapturedSource>, CaptureError>;
}

/// Stand-in when the build has no native capture backend.
#[derive(Debug, Default)]
pub struct UnavailableSource;

impl CaptureSource for UnavailableSource {
    fn capture_screen(&self) -> Result<CapturedSource, CaptureError> {
        Err(CaptureError::Unavailable)
    }

    fn capture_windows(&self) -> Result<Vec<CapturedSource>, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// The best capture backend compiled into this build.
pub fn default_source() -> Arc<dyn CaptureSource> {
    #[cfg(feature = "native-capture")]
    {
        Arc::new(xcap_source::XcapSource::new())
    }
    #[cfg(not(feature = "native-capture"))]
    {
        log::info!("Built without native capture, only opening images is available");
        Arc::new(UnavailableSource)
    }
}

/// Whether captures can succeed at all in this build.
pub fn is_available() -> bool {
    cfg!(feature = "native-capture")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::encode::decode_data_url;

    #[test]
    fn test_unavailable_source_errors() {
        let source = UnavailableSource;
        assert!(matches!(
            source.capture_screen(),
            Err(CaptureError::Unavailable)
        ));
        assert!(matches!(
            source.capture_windows(),
            Err(CaptureError::Unavailable)
        ));
    }

    #[test]
    fn test_captured_source_as_data_url() {
        let captured = CapturedSource {
            id: "screen-0".into(),
            name: "Screen".into(),
            image: RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255])),
        };
        let url = captured.to_data_url().unwrap();
        assert_eq!(decode_data_url(&url).unwrap(), captured.image);
    }
}

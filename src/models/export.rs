// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export options.
//!
//! Every styling effect is opt-in. An option left unset means the effect is
//! absent from the output, never a default look.

use super::color::Rgba;
use serde::{Deserialize, Serialize};

/// Lossy encoder quality as a fraction in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const DEFAULT: Quality = Quality(0.9);

    /// `None` unless `0 < value <= 1`.
    pub fn new(value: f32) -> Option<Self> {
        (value > 0.0 && value <= 1.0).then_some(Self(value))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Map to the 1..=100 scale used by the JPEG encoder.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Quality {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quality {value} is outside (0, 1]"))
    }
}

impl From<Quality> for f32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

/// Output encoding. Quality only exists for the lossy variant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg { quality: Quality },
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }

    /// Format implied by a file extension, keeping `quality` for JPEG.
    pub fn from_extension(ext: &str, quality: Quality) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg { quality }),
            _ => None,
        }
    }
}

/// Fill painted under the padded content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackgroundFill {
    Solid { color: Rgba },
    /// Diagonal gradient from the top-left to the bottom-right corner.
    Gradient { from: Rgba, to: Rgba },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub background: Option<BackgroundFill>,
    pub padding: Option<u32>,
    pub corner_radius: Option<f32>,
    pub drop_shadow: bool,
}

impl ExportOptions {
    /// Padding in pixels, zero when unset.
    pub fn padding(&self) -> u32 {
        self.padding.unwrap_or(0)
    }

    /// Corner radius in pixels, zero when unset or non-positive.
    pub fn corner_radius(&self) -> f32 {
        self.corner_radius.filter(|r| *r > 0.0).unwrap_or(0.0)
    }

    /// True when no framing is requested and the scene can be encoded as is.
    pub fn is_plain(&self) -> bool {
        self.background.is_none()
            && self.padding() == 0
            && self.corner_radius() == 0.0
            && !self.drop_shadow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bounds() {
        assert!(Quality::new(0.0).is_none());
        assert!(Quality::new(1.01).is_none());
        assert_eq!(Quality::new(1.0).map(Quality::percent), Some(100));
        assert_eq!(Quality::new(0.001).map(Quality::percent), Some(1));
        assert_eq!(Quality::DEFAULT.percent(), 90);
    }

    #[test]
    fn test_default_is_plain_png() {
        let opts = ExportOptions::default();
        assert!(opts.is_plain());
        assert_eq!(opts.format, ExportFormat::Png);
    }

    #[test]
    fn test_any_effect_leaves_fast_path() {
        let padded = ExportOptions {
            padding: Some(20),
            ..Default::default()
        };
        assert!(!padded.is_plain());

        let zero_padding = ExportOptions {
            padding: Some(0),
            corner_radius: Some(0.0),
            ..Default::default()
        };
        assert!(zero_padding.is_plain());

        let shadow = ExportOptions {
            drop_shadow: true,
            ..Default::default()
        };
        assert!(!shadow.is_plain());
    }

    #[test]
    fn test_format_from_extension() {
        let q = Quality::DEFAULT;
        assert_eq!(ExportFormat::from_extension("PNG", q), Some(ExportFormat::Png));
        assert_eq!(
            ExportFormat::from_extension("jpeg", q),
            Some(ExportFormat::Jpeg { quality: q })
        );
        assert_eq!(ExportFormat::from_extension("gif", q), None);
    }

    #[test]
    fn test_invalid_quality_rejected_by_serde() {
        let bad = r#"{"kind":"jpeg","quality":1.5}"#;
        assert!(serde_json::from_str::<ExportFormat>(bad).is_err());
    }
}

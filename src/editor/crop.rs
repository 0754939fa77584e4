// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transient crop rectangle.
//!
//! The crop rectangle lives beside the document, never inside it: it is
//! not snapshotted, not rasterized and disappears before a crop is
//! applied.

use crate::util::geometry::Rect;

/// Placement of a freshly started crop rectangle.
pub const DEFAULT_CROP: Rect = Rect::new(50.0, 50.0, 200.0, 150.0);

/// Crop selection in canvas coordinates.
///
/// `scale_x`/`scale_y` stretch the base rectangle around its origin; they
/// stay at 1.0 unless a caller scales the rectangle as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub rect: Rect,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Integer pixel bounds inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Default crop rectangle, shrunk to fit small canvases.
    pub fn default_for(canvas: (u32, u32)) -> Self {
        let area = Rect::new(0.0, 0.0, canvas.0 as f32, canvas.1 as f32);
        let rect = DEFAULT_CROP.intersect(&area).unwrap_or(area);
        Self::new(rect)
    }

    /// Displayed rectangle: position with the scale factors applied to
    /// the size.
    pub fn scaled(&self) -> Rect {
        Rect::new(
            self.rect.x,
            self.rect.y,
            self.rect.width * self.scale_x,
            self.rect.height * self.scale_y,
        )
    }

    /// Pixel area the crop will keep, clipped to the canvas. `None` when
    /// nothing of at least one pixel remains.
    pub fn effective_bounds(&self, canvas: (u32, u32)) -> Option<PixelBounds> {
        let area = Rect::new(0.0, 0.0, canvas.0 as f32, canvas.1 as f32);
        let clipped = self.scaled().intersect(&area)?;
        let x = clipped.x.round().max(0.0) as u32;
        let y = clipped.y.round().max(0.0) as u32;
        let right = (clipped.right().round() as u32).min(canvas.0);
        let bottom = (clipped.bottom().round() as u32).min(canvas.1);
        let width = right.saturating_sub(x);
        let height = bottom.saturating_sub(y);
        (width > 0 && height > 0).then_some(PixelBounds {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_bounds_applies_scale() {
        let mut crop = CropRect::new(Rect::new(10.0, 20.0, 100.0, 50.0));
        crop.scale_x = 2.0;
        assert_eq!(
            crop.effective_bounds((800, 600)),
            Some(PixelBounds {
                x: 10,
                y: 20,
                width: 200,
                height: 50
            })
        );
    }

    #[test]
    fn test_effective_bounds_clips_to_canvas() {
        let crop = CropRect::new(Rect::new(700.0, 550.0, 300.0, 300.0));
        assert_eq!(
            crop.effective_bounds((800, 600)),
            Some(PixelBounds {
                x: 700,
                y: 550,
                width: 100,
                height: 50
            })
        );
    }

    #[test]
    fn test_zero_area_crop_has_no_bounds() {
        let flat = CropRect::new(Rect::new(10.0, 10.0, 100.0, 0.0));
        assert_eq!(flat.effective_bounds((800, 600)), None);
        let outside = CropRect::new(Rect::new(900.0, 10.0, 50.0, 50.0));
        assert_eq!(outside.effective_bounds((800, 600)), None);
    }

    #[test]
    fn test_default_fits_small_canvas() {
        let crop = CropRect::default_for((120, 100));
        assert_eq!(crop.rect, Rect::new(50.0, 50.0, 70.0, 50.0));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region selector.
//!
//! Turns a press/move/release drag over the capture overlay into a single
//! rectangle in overlay coordinates. Intermediate rectangles are only
//! exposed through [`RegionSelector::preview`] for live feedback.

use crate::editor::crop::PixelBounds;
use crate::util::geometry::{Point, Rect};

/// Selections must be strictly larger than this in both directions.
pub const MIN_REGION_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct RegionSelector {
    drag: Option<(Point, Point)>,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, p: Point) {
        self.drag = Some((p, p));
    }

    pub fn move_to(&mut self, p: Point) {
        if let Some((_, current)) = &mut self.drag {
            *current = p;
        }
    }

    /// Finish the drag. Too-small selections produce nothing.
    pub fn release(&mut self, p: Point) -> Option<Rect> {
        let (start, _) = self.drag.take()?;
        let rect = Rect::from_drag(start, p);
        if rect.width > MIN_REGION_SIZE && rect.height > MIN_REGION_SIZE {
            log::debug!(
                "Selected region {}x{} at ({}, {})",
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
            Some(rect)
        } else {
            log::debug!("Region too small, ignoring");
            None
        }
    }

    /// Drop any drag in progress.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    /// Rectangle spanned by the drag so far.
    pub fn preview(&self) -> Option<Rect> {
        self.drag.map(|(start, current)| Rect::from_drag(start, current))
    }
}

/// Map an overlay rectangle onto the captured bitmap. The overlay shows
/// the capture stretched over `overlay` (width, height) logical pixels.
pub fn to_image_bounds(rect: &Rect, overlay: (f32, f32), image: (u32, u32)) -> Option<PixelBounds> {
    if overlay.0 <= 0.0 || overlay.1 <= 0.0 {
        return None;
    }
    let sx = image.0 as f32 / overlay.0;
    let sy = image.1 as f32 / overlay.1;
    let area = Rect::new(0.0, 0.0, image.0 as f32, image.1 as f32);
    let scaled = rect.scale(sx, sy).intersect(&area)?;

    let x = scaled.x.round() as u32;
    let y = scaled.y.round() as u32;
    let width = (scaled.right().round() as u32).min(image.0).saturating_sub(x);
    let height = (scaled.bottom().round() as u32).min(image.1).saturating_sub(y);
    (width > 0 && height > 0).then_some(PixelBounds {
        x,
        y,
        width,
        height,
    })
}

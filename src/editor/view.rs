// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zoom and pan of the editor viewport.
//!
//! View state only. It never touches the scene and is never recorded in
//! history.

use crate::util::geometry::Point;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 5.0;
/// Factor applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f32 = 1.2;

/// Maps canvas coordinates to view coordinates: `view = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl ViewTransform {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn to_view(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    /// Multiply the zoom by `factor` (clamped) keeping `anchor`, in view
    /// coordinates, over the same canvas point.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old = self.zoom;
        let new = (old * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new / old;
        self.pan = Point::new(
            anchor.x - (anchor.x - self.pan.x) * ratio,
            anchor.y - (anchor.y - self.pan.y) * ratio,
        );
        self.zoom = new;
    }

    pub fn zoom_in(&mut self, center: Point) {
        self.zoom_at(center, ZOOM_STEP);
    }

    pub fn zoom_out(&mut self, center: Point) {
        self.zoom_at(center, 1.0 / ZOOM_STEP);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan = self.pan.offset(dx, dy);
    }

    /// Identity transform at zoom 1.0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

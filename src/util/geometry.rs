// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility types.
//!
//! Rectangles and corner handles shared by the region selector, the
//! annotation model and the crop flow. All values are in canvas (or
//! overlay) pixels.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle with a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Corner handle of a rectangle, used for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the rectangle spanned by a drag from `start` to `current`.
    ///
    /// The origin is the component-wise minimum and the extents are the
    /// absolute deltas, so the drag direction does not matter.
    pub fn from_drag(start: Point, current: Point) -> Self {
        Self {
            x: start.x.min(current.x),
            y: start.y.min(current.y),
            width: (current.x - start.x).abs(),
            height: (current.y - start.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Intersection with another rectangle, `None` when they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle containing all points.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::TopLeft => Point::new(self.x, self.y),
            Handle::TopRight => Point::new(self.right(), self.y),
            Handle::BottomLeft => Point::new(self.x, self.bottom()),
            Handle::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// Corner handle within `tolerance` of `p`, if any.
    pub fn handle_at(&self, p: Point, tolerance: f32) -> Option<Handle> {
        Handle::ALL
            .into_iter()
            .find(|h| self.corner(*h).distance(p) <= tolerance)
    }

    /// Move one corner to `p`, keeping the opposite corner fixed.
    pub fn with_corner(&self, handle: Handle, p: Point) -> Rect {
        let anchor = match handle {
            Handle::TopLeft => self.corner(Handle::BottomRight),
            Handle::TopRight => self.corner(Handle::BottomLeft),
            Handle::BottomLeft => self.corner(Handle::TopRight),
            Handle::BottomRight => self.corner(Handle::TopLeft),
        };
        Rect::from_drag(anchor, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_drag_any_direction() {
        let forward = Rect::from_drag(Point::new(50.0, 50.0), Point::new(200.0, 150.0));
        let backward = Rect::from_drag(Point::new(200.0, 150.0), Point::new(50.0, 50.0));
        assert_eq!(forward, Rect::new(50.0, 50.0, 150.0, 100.0));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 60.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(50.0, 60.0, 50.0, 40.0)));
        assert_eq!(a.intersect(&Rect::new(200.0, 0.0, 5.0, 5.0)), None);
    }

    #[test]
    fn test_handles() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(r.handle_at(Point::new(111.0, 61.0), 4.0), Some(Handle::BottomRight));
        assert_eq!(r.handle_at(Point::new(60.0, 30.0), 4.0), None);

        // Dragging the top-left handle past the opposite corner flips the rect.
        let flipped = r.with_corner(Handle::TopLeft, Point::new(130.0, 70.0));
        assert_eq!(flipped, Rect::new(110.0, 60.0, 20.0, 10.0));
    }

    #[test]
    fn test_bounding() {
        let points = [
            Point::new(5.0, 9.0),
            Point::new(-1.0, 3.0),
            Point::new(7.0, 4.0),
        ];
        assert_eq!(Rect::bounding(&points), Some(Rect::new(-1.0, 3.0, 8.0, 6.0)));
        assert_eq!(Rect::bounding(&[]), None);
    }
}

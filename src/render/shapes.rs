// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Path construction for annotations and export framing.

use crate::util::geometry::{Point, Rect};
use tiny_skia::{Path, PathBuilder};

/// Arrowhead length and base width in pixels, before stroke scaling.
pub const ARROW_HEAD_SIZE: f32 = 20.0;
/// Arrows shorter than this have no direction and draw no head.
pub const ARROW_MIN_LENGTH: f32 = 1.0;

/// Bezier constant for a quarter circle: 4/3 * (sqrt(2) - 1).
const KAPPA: f32 = 0.552_284_8;

pub fn to_skia_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

pub fn rectangle(rect: &Rect) -> Option<Path> {
    Some(PathBuilder::from_rect(to_skia_rect(rect)?))
}

pub fn ellipse(rect: &Rect) -> Option<Path> {
    PathBuilder::from_oval(to_skia_rect(rect)?)
}

/// Open polyline through `points`.
pub fn polyline(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Size of the arrowhead for a given shaft width.
pub fn arrow_head_size(stroke_width: f32) -> f32 {
    ARROW_HEAD_SIZE.max(stroke_width * 4.0)
}

/// Arrow shaft, stopping at the base of the head so the tip stays sharp.
pub fn arrow_shaft(start: Point, end: Point, head_size: f32) -> Option<Path> {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let length = (dx * dx + dy * dy).sqrt();
    let mut pb = PathBuilder::new();
    pb.move_to(start.x, start.y);
    if length < ARROW_MIN_LENGTH {
        pb.line_to(end.x, end.y);
    } else {
        let shaft = (length - head_size * 0.8).max(0.0) / length;
        pb.line_to(start.x + dx * shaft, start.y + dy * shaft);
    }
    pb.finish()
}

/// Filled triangle with its tip at `end`.
pub fn arrow_head(start: Point, end: Point, head_size: f32) -> Option<Path> {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length < ARROW_MIN_LENGTH {
        return None;
    }
    let (nx, ny) = (dx / length, dy / length);
    let base_x = end.x - nx * head_size;
    let base_y = end.y - ny * head_size;
    let half = head_size / 2.0;

    let mut pb = PathBuilder::new();
    pb.move_to(end.x, end.y);
    pb.line_to(base_x - ny * half, base_y + nx * half);
    pb.line_to(base_x + ny * half, base_y - nx * half);
    pb.close();
    pb.finish()
}

/// Rectangle with circular corners. The radius is clamped to half the
/// shorter side.
pub fn rounded_rect(rect: &Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    if r <= 0.0 {
        return rectangle(rect);
    }
    let (l, t, rt, b) = (rect.x, rect.y, rect.right(), rect.bottom());
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_head_points_along_shaft() {
        let head = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20.0).unwrap();
        let bounds = head.bounds();
        assert!((bounds.right() - 100.0).abs() < 1e-3);
        assert!((bounds.left() - 80.0).abs() < 1e-3);
        assert!((bounds.height() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_arrow_has_no_head() {
        assert!(arrow_head(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 20.0).is_none());
    }

    #[test]
    fn test_rounded_rect_radius_is_clamped() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        let path = rounded_rect(&rect, 100.0).unwrap();
        let bounds = path.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-3);
        assert!((bounds.height() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_polyline_needs_a_point() {
        assert!(polyline(&[]).is_none());
        assert!(polyline(&[Point::new(0.0, 0.0), Point::new(3.0, 4.0)]).is_some());
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the user-added objects that sit on top of the
//! screenshot: freehand paths, rectangles, ellipses, arrows and text,
//! along with their style and hit-testing geometry.

use super::color::Rgba;
use crate::util::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Stable identity of an annotation within one scene document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

/// Default placement for objects created by a single-shot tool.
pub const DEFAULT_ORIGIN: Point = Point::new(100.0, 100.0);
/// Default width and height for rectangles and ellipses.
pub const DEFAULT_SHAPE_SIZE: f32 = 100.0;
/// Default shaft length of a new arrow.
pub const DEFAULT_ARROW_LENGTH: f32 = 150.0;
/// Placeholder text of a new text object.
pub const DEFAULT_TEXT: &str = "Type here...";
pub const DEFAULT_FONT_SIZE: f32 = 20.0;

/// Approximate glyph advance as a fraction of the font size, used for
/// text bounds before the text is rasterized.
const TEXT_ADVANCE: f32 = 0.6;
const TEXT_LINE_HEIGHT: f32 = 1.2;

/// Stroke and fill for an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: Rgba,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgba>,
}

impl Style {
    pub fn stroke(color: Rgba, stroke_width: f32) -> Self {
        Self {
            color,
            stroke_width,
            fill: None,
        }
    }
}

/// Geometry of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Path { points: Vec<Point> },
    Rectangle { rect: Rect },
    Ellipse { rect: Rect },
    Arrow { start: Point, end: Point },
    Text { origin: Point, text: String, font_size: f32 },
}

/// One user-added object on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: ObjectId,
    pub shape: Shape,
    pub style: Style,
}

impl Annotation {
    /// Create an annotation. The id is assigned when it's added to a scene.
    pub fn new(shape: Shape, style: Style) -> Self {
        Self {
            id: ObjectId(0),
            shape,
            style,
        }
    }

    /// Default-positioned rectangle, as created by the rectangle tool.
    pub fn default_rectangle(style: Style) -> Self {
        let rect = Rect::new(
            DEFAULT_ORIGIN.x,
            DEFAULT_ORIGIN.y,
            DEFAULT_SHAPE_SIZE,
            DEFAULT_SHAPE_SIZE,
        );
        Self::new(Shape::Rectangle { rect }, style)
    }

    pub fn default_ellipse(style: Style) -> Self {
        let rect = Rect::new(
            DEFAULT_ORIGIN.x,
            DEFAULT_ORIGIN.y,
            DEFAULT_SHAPE_SIZE,
            DEFAULT_SHAPE_SIZE,
        );
        Self::new(Shape::Ellipse { rect }, style)
    }

    pub fn default_arrow(style: Style) -> Self {
        let start = DEFAULT_ORIGIN;
        let end = start.offset(DEFAULT_ARROW_LENGTH, 0.0);
        Self::new(Shape::Arrow { start, end }, style)
    }

    pub fn default_text(style: Style) -> Self {
        Self::new(
            Shape::Text {
                origin: DEFAULT_ORIGIN,
                text: DEFAULT_TEXT.to_string(),
                font_size: DEFAULT_FONT_SIZE,
            },
            style,
        )
    }

    /// Axis-aligned bounds in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.shape {
            Shape::Path { points } => Rect::bounding(points).unwrap_or_default(),
            Shape::Rectangle { rect } | Shape::Ellipse { rect } => *rect,
            Shape::Arrow { start, end } => Rect::from_drag(*start, *end),
            Shape::Text {
                origin,
                text,
                font_size,
            } => {
                let (cols, rows) = text_extent(text);
                Rect::new(
                    origin.x,
                    origin.y,
                    cols as f32 * font_size * TEXT_ADVANCE,
                    rows as f32 * font_size * TEXT_LINE_HEIGHT,
                )
            }
        }
    }

    /// Check whether `p` touches the object, with `tolerance` pixels of slack.
    pub fn hit_test(&self, p: Point, tolerance: f32) -> bool {
        let slack = tolerance + self.style.stroke_width / 2.0;
        match &self.shape {
            Shape::Path { points } => points
                .windows(2)
                .any(|seg| segment_distance(p, seg[0], seg[1]) <= slack),
            Shape::Arrow { start, end } => segment_distance(p, *start, *end) <= slack,
            Shape::Rectangle { rect } if self.style.fill.is_none() => {
                rect.expand(slack).contains(p) && !rect.expand(-slack).contains(p)
            }
            Shape::Ellipse { rect } if self.style.fill.is_none() => {
                let outer = ellipse_norm(p, &rect.expand(slack));
                let inner = ellipse_norm(p, &rect.expand(-slack));
                outer <= 1.0 && (rect.width <= 2.0 * slack || inner >= 1.0)
            }
            Shape::Ellipse { rect } => ellipse_norm(p, &rect.expand(slack)) <= 1.0,
            Shape::Rectangle { rect } => rect.expand(slack).contains(p),
            Shape::Text { .. } => self.bounds().expand(tolerance).contains(p),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match &mut self.shape {
            Shape::Path { points } => {
                for p in points {
                    *p = p.offset(dx, dy);
                }
            }
            Shape::Rectangle { rect } | Shape::Ellipse { rect } => *rect = rect.translate(dx, dy),
            Shape::Arrow { start, end } => {
                *start = start.offset(dx, dy);
                *end = end.offset(dx, dy);
            }
            Shape::Text { origin, .. } => *origin = origin.offset(dx, dy),
        }
    }

    /// Map the object's geometry from its current bounds onto `target`.
    pub fn resize_to(&mut self, target: Rect) {
        let from = self.bounds();
        let sx = if from.width > f32::EPSILON {
            target.width / from.width
        } else {
            1.0
        };
        let sy = if from.height > f32::EPSILON {
            target.height / from.height
        } else {
            1.0
        };
        let map = |p: Point| Point::new(target.x + (p.x - from.x) * sx, target.y + (p.y - from.y) * sy);

        match &mut self.shape {
            Shape::Path { points } => {
                for p in points {
                    *p = map(*p);
                }
            }
            Shape::Rectangle { rect } | Shape::Ellipse { rect } => *rect = target,
            Shape::Arrow { start, end } => {
                *start = map(*start);
                *end = map(*end);
            }
            Shape::Text {
                origin, font_size, ..
            } => {
                *origin = Point::new(target.x, target.y);
                *font_size = (*font_size * sy).max(1.0);
            }
        }
    }

    /// Text content, for text objects.
    pub fn text(&self) -> Option<&str> {
        match &self.shape {
            Shape::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

fn text_extent(text: &str) -> (usize, usize) {
    let cols = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = text.lines().count().max(1);
    (cols.max(1), rows)
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq < f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + dx * t, a.y + dy * t))
}

/// `<= 1.0` inside the ellipse inscribed in `rect`.
fn ellipse_norm(p: Point, rect: &Rect) -> f32 {
    let rx = (rect.width / 2.0).max(f32::EPSILON);
    let ry = (rect.height / 2.0).max(f32::EPSILON);
    let c = rect.center();
    ((p.x - c.x) / rx).powi(2) + ((p.y - c.y) / ry).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> Style {
        Style::stroke(Rgba::rgb(255, 0, 0), 2.0)
    }

    #[test]
    fn test_rectangle_outline_hit() {
        let ann = Annotation::default_rectangle(style());
        assert!(ann.hit_test(Point::new(100.0, 150.0), 3.0));
        assert!(!ann.hit_test(Point::new(150.0, 150.0), 3.0));

        let mut filled = ann.clone();
        filled.style.fill = Some(Rgba::BLACK);
        assert!(filled.hit_test(Point::new(150.0, 150.0), 3.0));
    }

    #[test]
    fn test_arrow_and_path_hit() {
        let arrow = Annotation::default_arrow(style());
        assert!(arrow.hit_test(Point::new(175.0, 101.0), 3.0));
        assert!(!arrow.hit_test(Point::new(175.0, 120.0), 3.0));

        let path = Annotation::new(
            Shape::Path {
                points: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)],
            },
            style(),
        );
        assert!(path.hit_test(Point::new(15.0, 5.0), 2.0));
        assert!(!path.hit_test(Point::new(10.0, 0.0), 2.0));
    }

    #[test]
    fn test_translate_and_resize() {
        let mut ann = Annotation::default_arrow(style());
        ann.translate(10.0, 5.0);
        assert_eq!(ann.bounds(), Rect::new(110.0, 105.0, 150.0, 0.0));

        let mut ellipse = Annotation::default_ellipse(style());
        ellipse.resize_to(Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(ellipse.bounds(), Rect::new(0.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn test_text_bounds_follow_content() {
        let mut text = Annotation::default_text(style());
        let single = text.bounds();
        if let Shape::Text { text: content, .. } = &mut text.shape {
            *content = "a\nb".to_string();
        }
        assert!(text.bounds().height > single.height);
        assert_eq!(text.text(), Some("a\nb"));
    }

    #[test]
    fn test_serde_roundtrip_keeps_geometry() {
        let ann = Annotation::default_text(style());
        let json = serde_json::to_string(&ann).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ann);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rasterize a scene document at native canvas size.

use super::{image_from_pixmap, pixmap_from_image, shapes, surface, text};
use crate::editor::canvas::SceneCanvas;
use crate::error::RenderError;
use crate::models::annotation::{Annotation, Shape};
use crate::models::scene::SceneDocument;
use image::RgbaImage;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Draw the canvas fill, the background image and every object, bottom
/// to top. Selection and crop overlays are not part of the output.
pub fn rasterize(doc: &SceneDocument) -> Result<RgbaImage, RenderError> {
    let (width, height) = doc.size();
    let mut pixmap = surface(width, height)?;
    pixmap.fill(doc.fill().to_skia());

    let bg = doc.background();
    if let Some(img) = doc.image(bg.image) {
        let source = pixmap_from_image(img)?;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_row(bg.scale, 0.0, 0.0, bg.scale, bg.left, bg.top),
            None,
        );
    } else {
        log::warn!("Background image {} missing from pool", bg.image.0);
    }

    for obj in doc.objects() {
        draw_annotation(&mut pixmap, obj);
    }
    image_from_pixmap(&pixmap)
}

/// Draw one annotation with its style.
pub fn draw_annotation(pixmap: &mut Pixmap, obj: &Annotation) {
    let style = &obj.style;
    let stroke = Stroke {
        width: style.stroke_width.max(0.5),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(style.color.to_skia());

    match &obj.shape {
        Shape::Path { points } => {
            if let Some(path) = shapes::polyline(points) {
                stroke_path(pixmap, &path, &paint, &stroke);
            }
        }
        Shape::Rectangle { rect } | Shape::Ellipse { rect } => {
            let path = match obj.shape {
                Shape::Ellipse { .. } => shapes::ellipse(rect),
                _ => shapes::rectangle(rect),
            };
            let Some(path) = path else { return };
            if let Some(fill) = style.fill {
                let mut fill_paint = paint.clone();
                fill_paint.set_color(fill.to_skia());
                pixmap.fill_path(&path, &fill_paint, FillRule::Winding, Transform::identity(), None);
            }
            stroke_path(pixmap, &path, &paint, &stroke);
        }
        Shape::Arrow { start, end } => {
            let head = shapes::arrow_head_size(style.stroke_width);
            if let Some(shaft) = shapes::arrow_shaft(*start, *end, head) {
                stroke_path(pixmap, &shaft, &paint, &stroke);
            }
            if let Some(tip) = shapes::arrow_head(*start, *end, head) {
                pixmap.fill_path(&tip, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        Shape::Text {
            origin,
            text: content,
            font_size,
        } => text::draw_text(pixmap, content, *origin, *font_size, style.color),
    }
}

fn stroke_path(pixmap: &mut Pixmap, path: &Path, paint: &Paint, stroke: &Stroke) {
    pixmap.stroke_path(path, paint, stroke, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Style;
    use crate::models::color::Rgba;
    use crate::util::geometry::Rect;

    fn doc() -> SceneDocument {
        SceneDocument::new(200, 100, RgbaImage::from_pixel(200, 100, image::Rgba([0, 0, 255, 255])))
    }

    #[test]
    fn test_background_fills_canvas() {
        let img = rasterize(&doc()).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
        assert_eq!(img.get_pixel(100, 50).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_letterbox_shows_fill() {
        let doc = SceneDocument::new(200, 100, RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 0, 255])));
        let img = rasterize(&doc).unwrap();
        assert_eq!(img.get_pixel(5, 50).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(100, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_filled_rectangle_is_drawn() {
        let mut doc = doc();
        let style = Style {
            color: Rgba::rgb(255, 0, 0),
            stroke_width: 4.0,
            fill: Some(Rgba::rgb(0, 255, 0)),
        };
        doc.add_object(Annotation::new(
            Shape::Rectangle {
                rect: Rect::new(20.0, 20.0, 60.0, 40.0),
            },
            style,
        ));
        let img = rasterize(&doc).unwrap();
        assert_eq!(img.get_pixel(50, 40).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(20, 40).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_crop_rect_is_not_rendered() {
        let mut doc = doc();
        let plain = rasterize(&doc).unwrap();
        doc.set_crop_rect(Some(crate::editor::crop::CropRect::default_for((200, 100))));
        assert_eq!(rasterize(&doc).unwrap(), plain);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export compositor.
//!
//! Composites a rendered scene onto a styled offscreen surface. Layers are
//! painted in a fixed order: background, shadow, then the content clipped
//! to its rounded rectangle. Only the content is clipped, so background
//! and shadow stay visible in the padding.

use super::encode::{encode, EncodedImage};
use super::{image_from_pixmap, pixmap_from_image, shapes, surface};
use crate::error::{ExportError, RenderError};
use crate::models::color::Rgba;
use crate::models::export::{BackgroundFill, ExportOptions};
use crate::util::geometry::Rect;
use image::RgbaImage;
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Mask, Paint, Pixmap, PixmapPaint, SpreadMode,
    Transform,
};

/// Vertical offset of the drop shadow.
pub const SHADOW_OFFSET_Y: f32 = 10.0;
/// Blur radius of the drop shadow; the gaussian sigma is half of it.
pub const SHADOW_BLUR: f32 = 20.0;
/// Shadow color: black at 30% opacity.
pub const SHADOW_COLOR: Rgba = Rgba([0, 0, 0, 77]);

/// Frame and encode an already rendered scene. Safe to call off the UI
/// thread since it touches no editor state.
pub fn finish(rendered: RgbaImage, options: &ExportOptions) -> Result<EncodedImage, ExportError> {
    let composed = compose(rendered, options)?;
    let encoded = encode(&composed, options.format)?;
    log::info!(
        "Exported {}x{} {} ({} bytes)",
        encoded.width,
        encoded.height,
        encoded.mime_type(),
        encoded.bytes.len()
    );
    Ok(encoded)
}

/// Apply the framing in `options` to an already rendered scene.
pub fn compose(content: RgbaImage, options: &ExportOptions) -> Result<RgbaImage, RenderError> {
    if options.is_plain() {
        return Ok(content);
    }

    let padding = options.padding();
    let (width, height) = content.dimensions();
    let out_w = width.saturating_add(padding.saturating_mul(2));
    let out_h = height.saturating_add(padding.saturating_mul(2));
    let mut pixmap = surface(out_w, out_h)?;

    let content_rect = Rect::new(padding as f32, padding as f32, width as f32, height as f32);

    if let Some(fill) = &options.background {
        paint_background(&mut pixmap, fill);
    }
    if options.drop_shadow {
        paint_shadow(&mut pixmap, &content_rect)?;
    }

    let radius = options.corner_radius();
    let mask = if radius > 0.0 {
        Some(rounded_clip(out_w, out_h, &content_rect, radius)?)
    } else {
        None
    };

    let source = pixmap_from_image(&content)?;
    pixmap.draw_pixmap(
        padding as i32,
        padding as i32,
        source.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        mask.as_ref(),
    );

    image_from_pixmap(&pixmap)
}

fn paint_background(pixmap: &mut Pixmap, fill: &BackgroundFill) {
    match fill {
        BackgroundFill::Solid { color } => pixmap.fill(color.to_skia()),
        BackgroundFill::Gradient { from, to } => {
            let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
            let shader = LinearGradient::new(
                tiny_skia::Point::from_xy(0.0, 0.0),
                tiny_skia::Point::from_xy(w, h),
                vec![
                    GradientStop::new(0.0, from.to_skia()),
                    GradientStop::new(1.0, to.to_skia()),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            );
            let (Some(shader), Some(area)) = (shader, tiny_skia::Rect::from_xywh(0.0, 0.0, w, h))
            else {
                // Degenerate gradient, e.g. a 1x0 surface.
                pixmap.fill(from.to_skia());
                return;
            };
            let paint = Paint {
                shader,
                anti_alias: false,
                ..Paint::default()
            };
            pixmap.fill_rect(area, &paint, Transform::identity(), None);
        }
    }
}

/// Blurred copy of the content rectangle, offset downwards.
fn paint_shadow(pixmap: &mut Pixmap, content: &Rect) -> Result<(), RenderError> {
    let (w, h) = (pixmap.width(), pixmap.height());
    let shape = content.translate(0.0, SHADOW_OFFSET_Y);
    let Some(area) = shape.intersect(&Rect::new(0.0, 0.0, w as f32, h as f32)) else {
        return Ok(());
    };

    let mut layer = RgbaImage::new(w, h);
    let (x0, y0) = (area.x.round() as u32, area.y.round() as u32);
    let (x1, y1) = (
        (area.right().round() as u32).min(w),
        (area.bottom().round() as u32).min(h),
    );
    for y in y0..y1 {
        for x in x0..x1 {
            layer.put_pixel(x, y, image::Rgba(SHADOW_COLOR.0));
        }
    }
    let blurred = image::imageops::blur(&layer, SHADOW_BLUR / 2.0);

    let shadow = pixmap_from_image(&blurred)?;
    pixmap.draw_pixmap(
        0,
        0,
        shadow.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(())
}

/// Mask that only lets the rounded content rectangle through.
fn rounded_clip(width: u32, height: u32, content: &Rect, radius: f32) -> Result<Mask, RenderError> {
    let mut mask = Mask::new(width, height).ok_or(RenderError::Surface { width, height })?;
    if let Some(path) = shapes::rounded_rect(content, radius) {
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::canvas::SceneCanvas;
    use crate::models::export::{ExportFormat, Quality};
    use crate::models::scene::SceneDocument;

    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn doc() -> SceneDocument {
        SceneDocument::new(200, 100, RgbaImage::from_pixel(200, 100, image::Rgba(BLUE)))
    }

    fn export(doc: &SceneDocument, options: &ExportOptions) -> Result<EncodedImage, ExportError> {
        finish(doc.render()?, options)
    }

    fn white_padded(padding: u32) -> ExportOptions {
        ExportOptions {
            background: Some(BackgroundFill::Solid {
                color: Rgba::WHITE,
            }),
            padding: Some(padding),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_export_is_native_size() {
        let encoded = export(&doc(), &ExportOptions::default()).unwrap();
        assert_eq!((encoded.width, encoded.height), (200, 100));
        assert_eq!(encoded.format, ExportFormat::Png);
    }

    #[test]
    fn test_padding_offsets_content() {
        let encoded = export(&doc(), &white_padded(20)).unwrap();
        assert_eq!((encoded.width, encoded.height), (240, 140));

        let img = encoded.decode().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(19, 19).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(20, 20).0, BLUE);
        assert_eq!(img.get_pixel(219, 119).0, BLUE);
        assert_eq!(img.get_pixel(220, 120).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_radius_clips_only_content() {
        let rendered = doc().render().unwrap();
        let options = ExportOptions {
            corner_radius: Some(30.0),
            ..white_padded(10)
        };
        let img = compose(rendered, &options).unwrap();

        // Content corner is cut away and shows the background.
        assert_eq!(img.get_pixel(11, 11).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(110, 60).0, BLUE);
        // The padding margin itself is not clipped.
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_radius_without_background_is_transparent() {
        let rendered = doc().render().unwrap();
        let options = ExportOptions {
            corner_radius: Some(20.0),
            ..Default::default()
        };
        let img = compose(rendered, &options).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(100, 50).0, BLUE);
    }

    #[test]
    fn test_shadow_darkens_below_content() {
        let rendered = doc().render().unwrap();
        let options = ExportOptions {
            drop_shadow: true,
            ..white_padded(40)
        };
        let img = compose(rendered, &options).unwrap();
        let below = img.get_pixel(140, 40 + 100 + 5).0;
        let above = img.get_pixel(140, 5).0;
        assert!(below[0] < 240, "shadow missing: {:?}", below);
        assert!(above[0] > below[0]);
        assert_eq!(img.get_pixel(140, 90).0, BLUE);
    }

    #[test]
    fn test_gradient_runs_corner_to_corner() {
        let rendered = doc().render().unwrap();
        let options = ExportOptions {
            background: Some(BackgroundFill::Gradient {
                from: Rgba::BLACK,
                to: Rgba::WHITE,
            }),
            padding: Some(20),
            ..Default::default()
        };
        let img = compose(rendered, &options).unwrap();
        let start = img.get_pixel(0, 0).0;
        let end = img.get_pixel(239, 139).0;
        assert!(start[0] < 20);
        assert!(end[0] > 235);
    }

    #[test]
    fn test_jpeg_export_is_flattened() {
        let options = ExportOptions {
            format: ExportFormat::Jpeg {
                quality: Quality::new(1.0).unwrap(),
            },
            corner_radius: Some(50.0),
            ..Default::default()
        };
        let img = export(&doc(), &options).unwrap().decode().unwrap();
        assert_eq!(img.get_pixel(0, 0).0[3], 255);
        assert!(img.get_pixel(0, 0).0[0] > 200);
    }
}

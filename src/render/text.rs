// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Text rasterization for text annotations.
//!
//! Uses the proportional font bundled with egui so exported text matches
//! the editor's UI font without shipping extra assets.

use crate::models::color::Rgba;
use crate::util::geometry::Point;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use std::sync::OnceLock;
use tiny_skia::{Pixmap, PremultipliedColorU8};

static FONT: OnceLock<Option<FontArc>> = OnceLock::new();

fn font() -> Option<&'static FontArc> {
    FONT.get_or_init(|| {
        let defs = egui::FontDefinitions::default();
        let name = defs
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())?;
        let data = defs.font_data.get(name)?;
        match FontArc::try_from_vec(data.font.to_vec()) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Bundled font `{}` is unusable: {}", name, e);
                None
            }
        }
    })
    .as_ref()
}

/// Draw `text` with its top-left corner at `origin`. Lines are split on
/// `\n`. Without a usable font nothing is drawn.
pub fn draw_text(pixmap: &mut Pixmap, text: &str, origin: Point, font_size: f32, color: Rgba) {
    let Some(font) = font() else {
        log::warn!("No font available, skipping text annotation");
        return;
    };
    let scale = PxScale::from(font_size.max(1.0));
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();

    for (row, line) in text.lines().enumerate() {
        let baseline = origin.y + scaled.ascent() + row as f32 * line_height;
        let mut caret = origin.x;
        let mut previous = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            previous = Some(id);
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
            caret += scaled.h_advance(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                blend(pixmap, x, y, color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` into one pixel.
fn blend(pixmap: &mut Pixmap, x: i32, y: i32, color: Rgba, coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let width = pixmap.width() as usize;
    let [r, g, b, a] = color.0;
    let src_a = (a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let pixel = &mut pixmap.pixels_mut()[y as usize * width + x as usize];
    let inv = 1.0 - src_a;
    let out_a = (src_a * 255.0 + pixel.alpha() as f32 * inv).round().min(255.0) as u8;
    let channel = |src: u8, dst: u8| {
        ((src as f32 * src_a + dst as f32 * inv).round() as u8).min(out_a)
    };
    let (out_r, out_g, out_b) = (
        channel(r, pixel.red()),
        channel(g, pixel.green()),
        channel(b, pixel.blue()),
    );
    if let Some(px) = PremultipliedColorU8::from_rgba(out_r, out_g, out_b, out_a) {
        *pixel = px;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_over_transparent() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        blend(&mut pixmap, 1, 1, Rgba::rgb(255, 0, 0), 1.0);
        let px = pixmap.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.alpha()), (255, 255));

        // Out of range writes are ignored.
        blend(&mut pixmap, 5, 5, Rgba::rgb(255, 0, 0), 1.0);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        if font().is_none() {
            return;
        }
        let mut pixmap = Pixmap::new(120, 40).unwrap();
        draw_text(&mut pixmap, "Hi", Point::new(4.0, 4.0), 24.0, Rgba::BLACK);
        assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
    }
}

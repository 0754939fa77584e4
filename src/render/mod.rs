// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rasterization of the scene and the export compositing pipeline.
//!
//! Drawing goes through tiny-skia pixmaps (premultiplied RGBA); the rest
//! of the application exchanges straight-alpha `image::RgbaImage`s.

pub mod compositor;
pub mod encode;
pub mod scene;
pub mod shapes;
pub mod text;

use crate::error::RenderError;
use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

/// Allocate a transparent surface.
pub fn surface(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })
}

/// Copy a straight-alpha image into a premultiplied pixmap.
pub fn pixmap_from_image(img: &RgbaImage) -> Result<Pixmap, RenderError> {
    let mut pixmap = surface(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Copy a pixmap back into a straight-alpha image.
pub fn image_from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or(RenderError::Bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixmap_roundtrip_opaque() {
        let img = RgbaImage::from_fn(4, 3, |x, y| image::Rgba([x as u8 * 40, y as u8 * 60, 7, 255]));
        let pixmap = pixmap_from_image(&img).unwrap();
        assert_eq!(image_from_pixmap(&pixmap).unwrap(), img);
    }

    #[test]
    fn test_zero_sized_surface_is_an_error() {
        assert!(matches!(
            surface(0, 10),
            Err(RenderError::Surface { width: 0, height: 10 })
        ));
    }
}

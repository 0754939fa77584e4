// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Encoding of export bitmaps and data-URL conversion.

use crate::error::ExportError;
use crate::models::export::ExportFormat;
use anyhow::{anyhow, Context};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

/// An encoded export ready to be written, copied or embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    /// Decode back to straight-alpha RGBA pixels.
    pub fn decode(&self) -> Result<RgbaImage, ExportError> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }
}

/// Encode `img` in `format`. Lossy output has no alpha channel, so it is
/// flattened onto white first.
pub fn encode(img: &RgbaImage, format: ExportFormat) -> Result<EncodedImage, ExportError> {
    let (width, height) = img.dimensions();
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                img.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg { quality } => {
            let flat = flatten_on_white(img);
            JpegEncoder::new_with_quality(&mut bytes, quality.percent()).write_image(
                flat.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(EncodedImage {
        format,
        width,
        height,
        bytes,
    })
}

fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = a as u16;
        let over = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over(r), over(g), over(b)])
    })
}

/// PNG data URL of `img` scaled down to at most `max_width` pixels wide.
pub fn thumbnail_data_url(img: &RgbaImage, max_width: u32) -> Result<String, ExportError> {
    let thumb = if img.width() > max_width {
        let height = ((img.height() as u64 * max_width as u64) / img.width() as u64).max(1) as u32;
        image::imageops::thumbnail(img, max_width, height)
    } else {
        img.clone()
    };
    Ok(encode(&thumb, ExportFormat::Png)?.to_data_url())
}

/// Decode a `data:image/...;base64,` URL into RGBA pixels.
pub fn decode_data_url(url: &str) -> anyhow::Result<RgbaImage> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| anyhow!("not a data URL"))?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(anyhow!("unsupported data URL header `{header}`"));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .context("data URL payload is not base64")?;
    let img = image::load_from_memory(&bytes).context("data URL payload is not an image")?;
    Ok(img.to_rgba8())
}

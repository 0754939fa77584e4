// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the capture, editing and export pipeline.
//!
//! None of these are fatal: the shell turns them into notifications and
//! the operation that raised them simply does not happen.

use std::io;

/// Failure to obtain a bitmap from the capture source.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to enumerate capture sources: {0}")]
    Enumeration(String),

    #[error("no display available to capture")]
    NoDisplay,

    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("screen capture is not available in this build")]
    Unavailable,
}

/// Failure to rasterize the scene or allocate a surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("bitmap data does not match its dimensions")]
    Bitmap,
}

/// Failure to snapshot or restore the scene document.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot references unknown image {0}")]
    UnknownImage(u64),

    #[error("snapshot contains duplicate object id {0}")]
    DuplicateObject(u64),

    #[error("snapshot has an empty canvas")]
    EmptyCanvas,
}

/// Failure of an editor operation. The scene is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("another crop or export is still in progress")]
    Busy,

    #[error("no crop rectangle is active")]
    NoCrop,

    #[error("crop area is empty")]
    DegenerateCrop,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failure to composite or encode the export bitmap.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failure of the local persistent store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("stored data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A color string that isn't `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color `{0}`, expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The scene-graph capability the editor is built on.
//!
//! History, tools and the export compositor only talk to a scene through
//! this trait, never to a concrete document type.

use crate::editor::crop::CropRect;
use crate::error::{RenderError, SceneError};
use crate::models::annotation::{Annotation, ObjectId};
use crate::util::geometry::Point;
use image::RgbaImage;

pub trait SceneCanvas {
    /// Canvas size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// Add an object on top of the z-order and return its new id.
    fn add_object(&mut self, annotation: Annotation) -> ObjectId;

    fn remove_object(&mut self, id: ObjectId) -> Option<Annotation>;

    fn object(&self, id: ObjectId) -> Option<&Annotation>;

    /// Mutable access to an object. Callers only ask for this when they
    /// are about to change it, so the scene counts it as a change.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Annotation>;

    /// Objects bottom to top.
    fn objects(&self) -> &[Annotation];

    /// Topmost object touching `p`. The background never matches.
    fn object_at(&self, p: Point, tolerance: f32) -> Option<ObjectId>;

    fn selection(&self) -> &[ObjectId];

    fn set_selection(&mut self, ids: Vec<ObjectId>);

    fn crop_rect(&self) -> Option<&CropRect>;

    fn crop_rect_mut(&mut self) -> Option<&mut CropRect>;

    /// Replace the transient crop rectangle, returning the previous one.
    /// This never counts as a document change.
    fn set_crop_rect(&mut self, crop: Option<CropRect>) -> Option<CropRect>;

    /// Clear every object and load `image` as the new background, fitted
    /// to the canvas.
    fn load_background(&mut self, image: RgbaImage);

    /// Serialize the persistent document state.
    fn snapshot(&self) -> Result<String, SceneError>;

    /// Replace the document with a snapshot. On error nothing changes.
    fn restore(&mut self, snapshot: &str) -> Result<(), SceneError>;

    /// Rasterize background and objects at native canvas size. The crop
    /// rectangle and selection are never drawn.
    fn render(&self) -> Result<RgbaImage, RenderError>;

    /// Release data that neither the current state nor any of the `live`
    /// snapshots refers to.
    fn prune(&mut self, live: &[&str]);

    /// Increases on every visible change, including selection and crop.
    fn revision(&self) -> u64;

    /// Return and clear the "document changed since last commit" flag.
    fn take_changed(&mut self) -> bool;
}

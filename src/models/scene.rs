// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene document state.
//!
//! The editable screenshot: a background image fitted to the canvas plus
//! the annotation objects drawn over it. Snapshots are JSON; image pixels
//! stay in a pool of immutable bitmaps referenced by key, so a snapshot is
//! cheap to take and can never alias mutable state. Keys are never reused,
//! and a bitmap leaves the pool only once no history entry names it.

use super::annotation::{Annotation, ObjectId};
use super::color::Rgba;
use crate::editor::canvas::SceneCanvas;
use crate::editor::crop::CropRect;
use crate::error::{RenderError, SceneError};
use crate::render;
use crate::util::geometry::Point;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Key of an image in the document's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageKey(pub u64);

/// Placement of the background image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub image: ImageKey,
    pub left: f32,
    pub top: f32,
    pub scale: f32,
}

/// Serialized form of the persistent document state.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentSnapshot {
    width: u32,
    height: u32,
    fill: Rgba,
    background: Background,
    objects: Vec<Annotation>,
    next_id: u64,
}

/// Just the image reference of a snapshot, for pruning the pool.
#[derive(Deserialize)]
struct BackgroundRef {
    background: Background,
}

/// The editable in-memory screenshot and its annotations.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    width: u32,
    height: u32,
    fill: Rgba,
    /// Always present and always beneath every object.
    background: Background,
    objects: Vec<Annotation>,
    next_id: u64,
    selection: Vec<ObjectId>,
    crop: Option<CropRect>,
    images: HashMap<ImageKey, Arc<RgbaImage>>,
    next_image: u64,
    revision: u64,
    changed: bool,
}

impl SceneDocument {
    /// Create a `width`x`height` canvas holding `image` fitted inside it.
    pub fn new(width: u32, height: u32, image: RgbaImage) -> Self {
        let mut doc = Self {
            width: width.max(1),
            height: height.max(1),
            fill: Rgba::WHITE,
            background: Background {
                image: ImageKey(0),
                left: 0.0,
                top: 0.0,
                scale: 1.0,
            },
            objects: Vec::new(),
            next_id: 1,
            selection: Vec::new(),
            crop: None,
            images: HashMap::new(),
            next_image: 0,
            revision: 0,
            changed: false,
        };
        doc.load_background(image);
        doc
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn fill(&self) -> Rgba {
        self.fill
    }

    /// Pixels of a pooled image.
    pub fn image(&self, key: ImageKey) -> Option<&RgbaImage> {
        self.images.get(&key).map(|img| img.as_ref())
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.touch();
    }

    /// Scale and offset that fit an image of `size` inside the canvas,
    /// centered.
    fn fit(&self, size: (u32, u32)) -> Background {
        let (iw, ih) = (size.0.max(1) as f32, size.1.max(1) as f32);
        let (cw, ch) = (self.width as f32, self.height as f32);
        let scale = (cw / iw).min(ch / ih);
        Background {
            image: ImageKey(0),
            left: (cw - iw * scale) / 2.0,
            top: (ch - ih * scale) / 2.0,
            scale,
        }
    }

    fn validate(&self, snapshot: &DocumentSnapshot) -> Result<(), SceneError> {
        if snapshot.width == 0 || snapshot.height == 0 {
            return Err(SceneError::EmptyCanvas);
        }
        if !self.images.contains_key(&snapshot.background.image) {
            return Err(SceneError::UnknownImage(snapshot.background.image.0));
        }
        let mut seen = HashSet::new();
        for obj in &snapshot.objects {
            if !seen.insert(obj.id) {
                return Err(SceneError::DuplicateObject(obj.id.0));
            }
        }
        Ok(())
    }
}

impl SceneCanvas for SceneDocument {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn add_object(&mut self, mut annotation: Annotation) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        annotation.id = id;
        self.objects.push(annotation);
        self.mark_changed();
        id
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<Annotation> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        self.selection.retain(|s| *s != id);
        self.mark_changed();
        Some(self.objects.remove(index))
    }

    fn object(&self, id: ObjectId) -> Option<&Annotation> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Annotation> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        self.mark_changed();
        self.objects.get_mut(index)
    }

    fn objects(&self) -> &[Annotation] {
        &self.objects
    }

    fn object_at(&self, p: Point, tolerance: f32) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.hit_test(p, tolerance))
            .map(|o| o.id)
    }

    fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    fn set_selection(&mut self, ids: Vec<ObjectId>) {
        let ids: Vec<_> = ids
            .into_iter()
            .filter(|id| self.objects.iter().any(|o| o.id == *id))
            .collect();
        if ids != self.selection {
            self.selection = ids;
            self.touch();
        }
    }

    fn crop_rect(&self) -> Option<&CropRect> {
        self.crop.as_ref()
    }

    fn crop_rect_mut(&mut self) -> Option<&mut CropRect> {
        if self.crop.is_some() {
            self.touch();
        }
        self.crop.as_mut()
    }

    fn set_crop_rect(&mut self, crop: Option<CropRect>) -> Option<CropRect> {
        self.touch();
        std::mem::replace(&mut self.crop, crop)
    }

    fn load_background(&mut self, image: RgbaImage) {
        let key = ImageKey(self.next_image);
        self.next_image += 1;
        let mut background = self.fit(image.dimensions());
        background.image = key;
        self.images.insert(key, Arc::new(image));

        self.background = background;
        self.objects.clear();
        self.selection.clear();
        self.crop = None;
        self.mark_changed();
        log::debug!(
            "Loaded background image {} at scale {:.3}",
            key.0,
            background.scale
        );
    }

    fn snapshot(&self) -> Result<String, SceneError> {
        let snapshot = DocumentSnapshot {
            width: self.width,
            height: self.height,
            fill: self.fill,
            background: self.background,
            objects: self.objects.clone(),
            next_id: self.next_id,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    fn restore(&mut self, snapshot: &str) -> Result<(), SceneError> {
        // Parse and validate completely before touching any field.
        let snapshot: DocumentSnapshot = serde_json::from_str(snapshot)?;
        self.validate(&snapshot)?;

        self.width = snapshot.width;
        self.height = snapshot.height;
        self.fill = snapshot.fill;
        self.background = snapshot.background;
        self.objects = snapshot.objects;
        self.next_id = snapshot.next_id;
        self.selection.clear();
        self.crop = None;
        self.mark_changed();
        Ok(())
    }

    fn render(&self) -> Result<RgbaImage, RenderError> {
        render::scene::rasterize(self)
    }

    fn prune(&mut self, live: &[&str]) {
        let mut keep = HashSet::from([self.background.image]);
        for data in live {
            match serde_json::from_str::<BackgroundRef>(data) {
                Ok(r) => {
                    keep.insert(r.background.image);
                }
                // Unreadable entries could name anything.
                Err(_) => return,
            }
        }
        let before = self.images.len();
        self.images.retain(|key, _| keep.contains(key));
        let released = before - self.images.len();
        if released > 0 {
            log::debug!("Released {} unreferenced image(s)", released);
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

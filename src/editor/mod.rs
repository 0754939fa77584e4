// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotation editor.
//!
//! [`Editor`] is the single owned editor state: the scene, its history,
//! the tool controller, the view transform and the current draw style.
//! Every input handler goes through it, so tool and style are always
//! explicit state rather than something captured by a callback.

pub mod canvas;
pub mod crop;
pub mod history;
pub mod lock;
pub mod tools;
pub mod view;

use crate::error::EditorError;
use crate::models::annotation::{ObjectId, Style};
use crate::models::color::Rgba;
use crate::models::scene::SceneDocument;
use crate::util::geometry::Point;
use canvas::SceneCanvas;
use history::{CommitOutcome, HistoryManager};
use image::RgbaImage;
use lock::{OperationGuard, OperationLock};
use tools::{Tool, ToolController};
use view::ViewTransform;

/// Handle hit radius in screen pixels.
pub const HANDLE_TOLERANCE_PX: f32 = 6.0;

pub struct Editor<C: SceneCanvas = SceneDocument> {
    canvas: C,
    history: HistoryManager,
    tools: ToolController,
    view: ViewTransform,
    style: Style,
    /// Held by a crop apply or an export for its whole duration.
    pipeline: OperationLock,
}

impl Editor<SceneDocument> {
    /// Open `image` on a fresh `width`x`height` canvas.
    pub fn open(image: RgbaImage, width: u32, height: u32, style: Style) -> Self {
        Self::new(SceneDocument::new(width, height, image), style)
    }
}

impl<C: SceneCanvas> Editor<C> {
    /// Wrap a freshly loaded scene. Its state becomes history entry 0.
    pub fn new(canvas: C, style: Style) -> Self {
        let mut editor = Self {
            canvas,
            history: HistoryManager::new(),
            tools: ToolController::new(),
            view: ViewTransform::default(),
            style,
            pipeline: OperationLock::new(),
        };
        editor.commit();
        editor
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Changes whenever the scene needs to be redrawn.
    pub fn revision(&self) -> u64 {
        self.canvas.revision()
    }

    pub fn is_cropping(&self) -> bool {
        self.canvas.crop_rect().is_some()
    }

    pub fn has_selection(&self) -> bool {
        !self.canvas.selection().is_empty()
    }

    /// True while a crop apply or export is running.
    pub fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    fn commit(&mut self) -> bool {
        match self.history.commit(&mut self.canvas) {
            Ok(CommitOutcome::Committed(_)) => true,
            Ok(CommitOutcome::Suppressed) => false,
            Err(e) => {
                log::error!("Failed to snapshot scene: {}", e);
                false
            }
        }
    }

    fn tolerance(&self) -> f32 {
        HANDLE_TOLERANCE_PX / self.view.zoom()
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.finish_text_edit();
        if self.tools.select_tool(&mut self.canvas, tool, self.style) {
            self.commit();
        }
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.finish_text_edit();
        let tolerance = self.tolerance();
        self.tools.pointer_down(&mut self.canvas, p, tolerance);
    }

    pub fn pointer_move(&mut self, p: Point) {
        self.tools.pointer_move(&mut self.canvas, p);
    }

    pub fn pointer_up(&mut self) {
        if self.tools.pointer_up(&mut self.canvas, self.style) {
            self.commit();
        }
    }

    /// Remove every selected object. No-op on an empty selection.
    pub fn delete_selected(&mut self) -> bool {
        let ids: Vec<ObjectId> = self.canvas.selection().to_vec();
        if ids.is_empty() {
            return false;
        }
        self.finish_text_edit();
        for id in &ids {
            self.canvas.remove_object(*id);
        }
        log::info!("Deleted {} object(s)", ids.len());
        self.commit()
    }

    /// Step back one entry. A no-op at the first entry; the active tool
    /// is kept either way.
    pub fn undo(&mut self) -> bool {
        self.finish_text_edit();
        if !self.history.undo(&mut self.canvas) {
            return false;
        }
        self.tools.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.finish_text_edit();
        if !self.history.redo(&mut self.canvas) {
            return false;
        }
        self.tools.after_restore();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn cancel_crop(&mut self) {
        self.tools.cancel_crop(&mut self.canvas);
    }

    /// Replace the scene with the area under the crop rectangle, as one
    /// committed mutation.
    pub fn apply_crop(&mut self) -> Result<(), EditorError> {
        let _guard = self.pipeline.try_acquire().ok_or(EditorError::Busy)?;
        let crop = *self.canvas.crop_rect().ok_or(EditorError::NoCrop)?;
        let bounds = crop
            .effective_bounds(self.canvas.size())
            .ok_or(EditorError::DegenerateCrop)?;

        self.canvas.set_crop_rect(None);
        let rendered = match self.canvas.render() {
            Ok(img) => img,
            Err(e) => {
                self.canvas.set_crop_rect(Some(crop));
                return Err(e.into());
            }
        };
        let cropped =
            image::imageops::crop_imm(&rendered, bounds.x, bounds.y, bounds.width, bounds.height)
                .to_image();

        self.canvas.load_background(cropped);
        self.tools.reset();
        self.commit();
        log::info!(
            "Applied crop {}x{} at ({}, {})",
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y
        );
        Ok(())
    }

    /// Set the draw color for new objects and recolor the selection.
    pub fn set_color(&mut self, color: Rgba) {
        self.style.color = color;
        self.apply_to_selection(|s| s.color = color);
    }

    /// Set the stroke width for new objects and the selection.
    pub fn set_stroke_width(&mut self, width: f32) {
        let width = width.max(0.5);
        self.style.stroke_width = width;
        self.apply_to_selection(|s| s.stroke_width = width);
    }

    fn apply_to_selection(&mut self, edit: impl Fn(&mut Style)) {
        let ids: Vec<ObjectId> = self.canvas.selection().to_vec();
        let mut changed = false;
        for id in ids {
            let Some(current) = self.canvas.object(id).map(|o| o.style) else {
                continue;
            };
            let mut next = current;
            edit(&mut next);
            if next != current {
                if let Some(obj) = self.canvas.object_mut(id) {
                    obj.style = next;
                    changed = true;
                }
            }
        }
        if changed {
            self.commit();
        }
    }

    /// Start editing a text object.
    pub fn begin_text_edit(&mut self, id: ObjectId) {
        self.finish_text_edit();
        self.tools.begin_text_edit(&self.canvas, id);
    }

    pub fn editing_text(&self) -> Option<ObjectId> {
        self.tools.text_edit().map(|e| e.id)
    }

    pub fn edit_text(&mut self, value: &str) {
        self.tools.set_text(&mut self.canvas, value);
    }

    /// Leave text-edit mode, committing once if the text changed.
    pub fn finish_text_edit(&mut self) -> bool {
        if self.tools.end_text_edit(&self.canvas) {
            return self.commit();
        }
        false
    }

    /// Escape: cancel a crop, else end text editing, else deselect.
    pub fn escape(&mut self) {
        if self.canvas.crop_rect().is_some() {
            self.cancel_crop();
        } else if self.editing_text().is_some() {
            self.finish_text_edit();
        } else {
            self.canvas.set_selection(Vec::new());
        }
    }

    /// Render the scene and hand it out with the pipeline guard, for
    /// compositing and encoding on another thread. The editor stays
    /// locked against crop and export until the guard is dropped.
    pub fn begin_export(&self) -> Result<(RgbaImage, OperationGuard), EditorError> {
        let guard = self.pipeline.try_acquire().ok_or(EditorError::Busy)?;
        let rendered = self.canvas.render()?;
        Ok((rendered, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::export::{BackgroundFill, ExportOptions};
    use crate::render::compositor;
    use crate::util::geometry::Rect;

    fn editor() -> Editor {
        let img = RgbaImage::from_fn(400, 300, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        Editor::open(img, 400, 300, Style::stroke(Rgba::rgb(255, 59, 48), 3.0))
    }

    #[test]
    fn test_initial_entry_is_loaded_image() {
        let editor = editor();
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert!(editor.canvas().objects().is_empty());
    }

    #[test]
    fn test_one_commit_per_creation() {
        let mut editor = editor();
        editor.select_tool(Tool::Rectangle);
        assert_eq!(editor.history().len(), 2);
        editor.select_tool(Tool::Select);
        assert_eq!(editor.history().len(), 2);

        // Click without movement.
        editor.pointer_down(Point::new(100.0, 150.0));
        editor.pointer_up();
        assert_eq!(editor.history().len(), 2);

        editor.pointer_down(Point::new(100.0, 150.0));
        editor.pointer_move(Point::new(105.0, 150.0));
        editor.pointer_move(Point::new(115.0, 150.0));
        editor.pointer_up();
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_delete() {
        let mut editor = editor();
        editor.select_tool(Tool::Select);
        assert!(!editor.delete_selected());
        assert_eq!(editor.history().len(), 1);

        editor.select_tool(Tool::Ellipse);
        editor.select_tool(Tool::Arrow);
        assert!(editor.delete_selected());
        assert_eq!(editor.canvas().objects().len(), 1);
        assert_eq!(editor.history().len(), 4);

        assert!(editor.undo());
        assert_eq!(editor.canvas().objects().len(), 2);
    }

    #[test]
    fn test_crop_apply_then_undo_restores_exactly() {
        let mut editor = editor();
        editor.select_tool(Tool::Rectangle);
        editor.select_tool(Tool::Text);
        editor.finish_text_edit();
        let before = editor.canvas().snapshot().unwrap();
        let before_render = editor.canvas().render().unwrap();

        editor.select_tool(Tool::Crop);
        editor.apply_crop().unwrap();
        assert!(editor.canvas().objects().is_empty());
        assert!(editor.canvas().crop_rect().is_none());
        assert_eq!(editor.tool(), Tool::Select);
        let entries = editor.history().len();

        assert!(editor.undo());
        assert_eq!(editor.canvas().snapshot().unwrap(), before);
        assert_eq!(editor.canvas().render().unwrap(), before_render);
        assert!(editor.redo());
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_crop_keeps_only_selected_area() {
        let mut editor = editor();
        editor.select_tool(Tool::Crop);
        editor.apply_crop().unwrap();
        // The 200x150 crop is fitted to the 400x300 canvas at exactly 2x.
        let bg = *editor.canvas().background();
        assert!((bg.scale - 2.0).abs() < 1e-6);
        let key = bg.image;
        assert_eq!(editor.canvas().image(key).map(|i| i.dimensions()), Some((200, 150)));
    }

    #[test]
    fn test_crop_errors() {
        let mut editor = editor();
        assert!(matches!(editor.apply_crop(), Err(EditorError::NoCrop)));

        editor.select_tool(Tool::Crop);
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(900.0, 100.0));
        editor.pointer_up();
        assert!(matches!(editor.apply_crop(), Err(EditorError::DegenerateCrop)));
        // Rejected crops leave the scene and the rectangle alone.
        assert!(editor.canvas().crop_rect().is_some());
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_busy_pipeline_rejects_crop_and_export() {
        let mut editor = editor();
        editor.select_tool(Tool::Crop);
        let (_img, guard) = editor.begin_export().unwrap();
        assert!(matches!(editor.apply_crop(), Err(EditorError::Busy)));
        assert!(matches!(editor.begin_export(), Err(EditorError::Busy)));
        drop(guard);
        assert!(editor.apply_crop().is_ok());
    }

    #[test]
    fn test_switching_crop_to_text_leaves_no_crop_in_export() {
        let mut editor = editor();
        editor.select_tool(Tool::Crop);
        editor.select_tool(Tool::Text);
        assert!(editor.canvas().crop_rect().is_none());
        assert_eq!(editor.editing_text(), editor.canvas().selection().first().copied());

        let options = ExportOptions {
            background: Some(BackgroundFill::Solid { color: Rgba::WHITE }),
            padding: Some(20),
            ..Default::default()
        };
        let (rendered, _guard) = editor.begin_export().unwrap();
        let encoded = compositor::finish(rendered, &options).unwrap();
        assert_eq!((encoded.width, encoded.height), (440, 340));
    }

    #[test]
    fn test_style_applies_to_selection_once() {
        let mut editor = editor();
        editor.select_tool(Tool::Rectangle);
        let entries = editor.history().len();
        let blue = Rgba::rgb(0, 0, 255);

        editor.set_color(blue);
        assert_eq!(editor.history().len(), entries + 1);
        let id = editor.canvas().selection()[0];
        assert_eq!(editor.canvas().object(id).map(|o| o.style.color), Some(blue));

        // Same color again is not a change.
        editor.set_color(blue);
        assert_eq!(editor.history().len(), entries + 1);

        editor.escape();
        editor.set_stroke_width(8.0);
        assert_eq!(editor.history().len(), entries + 1);
        assert_eq!(editor.style().stroke_width, 8.0);
    }

    #[test]
    fn test_text_edit_commits_once_on_finish() {
        let mut editor = editor();
        editor.select_tool(Tool::Text);
        let entries = editor.history().len();
        editor.edit_text("H");
        editor.edit_text("Hi");
        assert_eq!(editor.history().len(), entries);
        assert!(editor.finish_text_edit());
        assert_eq!(editor.history().len(), entries + 1);
        assert!(editor.editing_text().is_none());
    }

    #[test]
    fn test_zoom_scales_handle_tolerance() {
        let mut editor = editor();
        editor.select_tool(Tool::Rectangle);
        let id = editor.canvas().selection()[0];
        let bounds = |editor: &Editor| editor.canvas().object(id).map(|o| o.bounds());

        // 4 canvas units off the corner is 16 screen pixels at 4x: a miss.
        editor.view_mut().zoom_at(Point::default(), 4.0);
        editor.pointer_down(Point::new(204.0, 204.0));
        editor.pointer_move(Point::new(224.0, 224.0));
        editor.pointer_up();
        assert_eq!(bounds(&editor), Some(Rect::new(100.0, 100.0, 100.0, 100.0)));

        // At 1x the same press grabs the handle.
        editor.view_mut().reset();
        editor.canvas.set_selection(vec![id]);
        editor.pointer_down(Point::new(204.0, 204.0));
        editor.pointer_move(Point::new(224.0, 224.0));
        editor.pointer_up();
        assert_eq!(bounds(&editor), Some(Rect::new(100.0, 100.0, 120.0, 120.0)));
    }

    #[test]
    fn test_undo_keeps_freehand_tool() {
        let mut editor = editor();
        editor.select_tool(Tool::Freehand);
        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_move(Point::new(40.0, 30.0));
        editor.pointer_up();
        assert_eq!(editor.canvas().objects().len(), 1);

        assert!(editor.undo());
        assert!(editor.canvas().objects().is_empty());
        assert_eq!(editor.tool(), Tool::Freehand);
        assert!(editor.redo());
        assert_eq!(editor.tool(), Tool::Freehand);
    }

    #[test]
    fn test_undo_at_first_entry_changes_nothing() {
        let mut editor = editor();
        editor.select_tool(Tool::Freehand);
        assert!(!editor.undo());
        assert!(!editor.redo());
        assert_eq!(editor.tool(), Tool::Freehand);
    }

    #[test]
    fn test_undo_while_cropping_leaves_crop_tool() {
        let mut editor = editor();
        editor.select_tool(Tool::Rectangle);
        editor.select_tool(Tool::Crop);
        assert!(editor.undo());
        assert!(editor.canvas().crop_rect().is_none());
        assert_eq!(editor.tool(), Tool::Select);
    }

    #[test]
    fn test_recrop_after_undo_releases_abandoned_bitmap() {
        let mut editor = editor();
        editor.select_tool(Tool::Crop);
        editor.apply_crop().unwrap();
        let abandoned = editor.canvas().background().image;

        assert!(editor.undo());
        let original = editor.canvas().background().image;
        editor.select_tool(Tool::Crop);
        editor.apply_crop().unwrap();

        assert!(editor.canvas().image(abandoned).is_none());
        assert!(editor.canvas().image(original).is_some());
        assert!(editor.undo());
        assert_eq!(editor.canvas().background().image, original);
    }
}

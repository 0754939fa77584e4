// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool state machine and input routing.
//!
//! Maps the active tool and pointer gestures to scene mutations. The
//! controller never commits history itself: every operation reports
//! whether it altered the document and the editor commits once for it.

use super::canvas::SceneCanvas;
use super::crop::CropRect;
use crate::models::annotation::{Annotation, ObjectId, Shape, Style};
use crate::util::geometry::{Handle, Point, Rect};

/// Objects and crop rectangles never shrink below this while resizing.
const MIN_RESIZE: f32 = 1.0;

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Freehand,
    Rectangle,
    Ellipse,
    Arrow,
    Text,
    Crop,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Select,
        Tool::Freehand,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Arrow,
        Tool::Text,
        Tool::Crop,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Freehand => "Draw",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
            Tool::Arrow => "Arrow",
            Tool::Text => "Text",
            Tool::Crop => "Crop",
        }
    }

}

/// What a drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    Object(ObjectId),
    Crop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    Move,
    Resize(Handle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub target: DragTarget,
    pub kind: DragKind,
    origin: Point,
    last: Point,
    start_bounds: Rect,
    moved: bool,
}

/// Gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing(Vec<Point>),
    Dragging(Drag),
}

/// Text object being edited and its text when editing began.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub id: ObjectId,
    original: String,
}

#[derive(Debug, Clone, Default)]
pub struct ToolController {
    tool: Tool,
    gesture: Gesture,
    text_edit: Option<TextEdit>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[cfg(test)]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    /// Switch to `tool`. Leaving crop for any other tool cancels the crop
    /// first. Returns true when a default object was created.
    pub fn select_tool<C: SceneCanvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        tool: Tool,
        style: Style,
    ) -> bool {
        if self.tool == Tool::Crop && tool != Tool::Crop {
            self.cancel_crop(canvas);
        }
        self.gesture = Gesture::Idle;

        match tool {
            Tool::Select => {
                self.tool = Tool::Select;
                false
            }
            Tool::Freehand => {
                canvas.set_selection(Vec::new());
                self.tool = Tool::Freehand;
                false
            }
            Tool::Crop => {
                self.start_crop(canvas);
                false
            }
            Tool::Rectangle | Tool::Ellipse | Tool::Arrow | Tool::Text => {
                let annotation = match tool {
                    Tool::Rectangle => Annotation::default_rectangle(style),
                    Tool::Ellipse => Annotation::default_ellipse(style),
                    Tool::Arrow => Annotation::default_arrow(style),
                    _ => Annotation::default_text(style),
                };
                let id = canvas.add_object(annotation);
                canvas.set_selection(vec![id]);
                if tool == Tool::Text {
                    self.begin_text_edit(canvas, id);
                }
                self.tool = Tool::Select;
                log::debug!("Created {:?} object {}", tool, id.0);
                true
            }
        }
    }

    /// Place a fresh default crop rectangle, replacing any prior one.
    pub fn start_crop<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C) {
        canvas.set_selection(Vec::new());
        canvas.set_crop_rect(Some(CropRect::default_for(canvas.size())));
        self.tool = Tool::Crop;
        self.gesture = Gesture::Idle;
    }

    /// Drop the crop rectangle and return to selection. Never a document
    /// change.
    pub fn cancel_crop<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C) {
        canvas.set_crop_rect(None);
        canvas.set_selection(Vec::new());
        self.tool = Tool::Select;
        self.gesture = Gesture::Idle;
    }

    /// Back to plain selection after the scene was replaced wholesale.
    pub fn reset(&mut self) {
        self.tool = Tool::Select;
        self.gesture = Gesture::Idle;
        self.text_edit = None;
    }

    /// Drop per-gesture state after an undo or redo. The active tool
    /// survives unless it was crop, whose rectangle the restore removed.
    pub fn after_restore(&mut self) {
        if self.tool == Tool::Crop {
            self.tool = Tool::Select;
        }
        self.gesture = Gesture::Idle;
        self.text_edit = None;
    }

    pub fn begin_text_edit<C: SceneCanvas + ?Sized>(&mut self, canvas: &C, id: ObjectId) {
        if let Some(text) = canvas.object(id).and_then(|o| o.text()) {
            self.text_edit = Some(TextEdit {
                id,
                original: text.to_string(),
            });
        }
    }

    /// Replace the text of the object being edited.
    pub fn set_text<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C, value: &str) {
        let Some(edit) = &self.text_edit else {
            return;
        };
        if canvas.object(edit.id).and_then(|o| o.text()) == Some(value) {
            return;
        }
        if let Some(obj) = canvas.object_mut(edit.id) {
            if let Shape::Text { text, .. } = &mut obj.shape {
                *text = value.to_string();
            }
        }
    }

    /// Leave text-edit mode. Returns true if the text differs from when
    /// editing began.
    pub fn end_text_edit<C: SceneCanvas + ?Sized>(&mut self, canvas: &C) -> bool {
        let Some(edit) = self.text_edit.take() else {
            return false;
        };
        canvas
            .object(edit.id)
            .and_then(|o| o.text())
            .is_some_and(|text| text != edit.original)
    }

    /// Pointer pressed at canvas point `p`. `tolerance` is the handle hit
    /// radius in canvas units.
    pub fn pointer_down<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C, p: Point, tolerance: f32) {
        self.gesture = Gesture::Idle;

        if self.tool == Tool::Freehand {
            self.gesture = Gesture::Drawing(vec![p]);
            return;
        }

        // The crop rectangle sits above everything else.
        if let Some(crop) = canvas.crop_rect() {
            let rect = crop.scaled();
            let kind = match rect.handle_at(p, tolerance) {
                Some(handle) => Some(DragKind::Resize(handle)),
                None if rect.contains(p) => Some(DragKind::Move),
                None => None,
            };
            if let Some(kind) = kind {
                self.gesture = Gesture::Dragging(Drag {
                    target: DragTarget::Crop,
                    kind,
                    origin: p,
                    last: p,
                    start_bounds: rect,
                    moved: false,
                });
                return;
            }
            if self.tool == Tool::Crop {
                return;
            }
        }

        let handle_hit = canvas.selection().iter().find_map(|id| {
            let bounds = canvas.object(*id)?.bounds();
            bounds.handle_at(p, tolerance).map(|h| (*id, h, bounds))
        });
        if let Some((id, handle, bounds)) = handle_hit {
            self.gesture = Gesture::Dragging(Drag {
                target: DragTarget::Object(id),
                kind: DragKind::Resize(handle),
                origin: p,
                last: p,
                start_bounds: bounds,
                moved: false,
            });
            return;
        }

        match canvas.object_at(p, tolerance) {
            Some(id) => {
                if !canvas.selection().contains(&id) {
                    canvas.set_selection(vec![id]);
                }
                let start_bounds = canvas.object(id).map(|o| o.bounds()).unwrap_or_default();
                self.gesture = Gesture::Dragging(Drag {
                    target: DragTarget::Object(id),
                    kind: DragKind::Move,
                    origin: p,
                    last: p,
                    start_bounds,
                    moved: false,
                });
            }
            None => canvas.set_selection(Vec::new()),
        }
    }

    pub fn pointer_move<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C, p: Point) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing(points) => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
            }
            Gesture::Dragging(drag) => {
                if p == drag.last {
                    return;
                }
                let (dx, dy) = (p.x - drag.last.x, p.y - drag.last.y);
                drag.last = p;
                let target = match drag.kind {
                    DragKind::Move => None,
                    DragKind::Resize(handle) => {
                        let corner = drag.start_bounds.corner(handle);
                        let moved_to = corner.offset(p.x - drag.origin.x, p.y - drag.origin.y);
                        let rect = drag.start_bounds.with_corner(handle, moved_to);
                        // Flat axes (a horizontal arrow, a straight stroke) have
                        // nothing to shrink, so only extents that started
                        // non-zero are held to the minimum.
                        let start = drag.start_bounds;
                        if (start.width > 0.0 && rect.width < MIN_RESIZE)
                            || (start.height > 0.0 && rect.height < MIN_RESIZE)
                        {
                            return;
                        }
                        Some(rect)
                    }
                };

                match drag.target {
                    DragTarget::Crop => {
                        if let Some(crop) = canvas.crop_rect_mut() {
                            let next = target.unwrap_or_else(|| crop.scaled().translate(dx, dy));
                            *crop = CropRect::new(next);
                            drag.moved = true;
                        }
                    }
                    DragTarget::Object(id) => {
                        if let Some(obj) = canvas.object_mut(id) {
                            match target {
                                Some(rect) => obj.resize_to(rect),
                                None => obj.translate(dx, dy),
                            }
                            drag.moved = true;
                        }
                    }
                }
            }
        }
    }

    /// Pointer released. Returns true when the gesture altered the
    /// document and needs exactly one commit.
    pub fn pointer_up<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C, style: Style) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Drawing(points) => {
                if points.len() < 2 {
                    return false;
                }
                let count = points.len();
                canvas.add_object(Annotation::new(Shape::Path { points }, style));
                log::debug!("Captured freehand path with {} points", count);
                true
            }
            Gesture::Dragging(drag) => drag.moved && matches!(drag.target, DragTarget::Object(_)),
        }
    }

    /// Points of the path being drawn, for live feedback.
    pub fn drawing_points(&self) -> Option<&[Point]> {
        match &self.gesture {
            Gesture::Drawing(points) => Some(points),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::color::Rgba;
    use crate::models::scene::SceneDocument;
    use image::RgbaImage;

    fn doc() -> SceneDocument {
        SceneDocument::new(800, 600, RgbaImage::from_pixel(80, 60, image::Rgba([0, 0, 0, 255])))
    }

    fn style() -> Style {
        Style::stroke(Rgba::rgb(255, 59, 48), 3.0)
    }

    #[test]
    fn test_single_shot_tools_return_to_select() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        for tool in [Tool::Rectangle, Tool::Ellipse, Tool::Arrow] {
            assert!(tools.select_tool(&mut doc, tool, style()));
            assert_eq!(tools.tool(), Tool::Select);
            assert_eq!(doc.selection().len(), 1);
        }
        assert_eq!(doc.objects().len(), 3);
        assert!(tools.text_edit().is_none());
    }

    #[test]
    fn test_text_tool_enters_edit_mode() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Text, style());
        let id = tools.text_edit().map(|e| e.id).unwrap();
        assert_eq!(doc.selection(), &[id]);

        tools.set_text(&mut doc, "Type here...");
        assert!(!tools.end_text_edit(&doc));

        tools.begin_text_edit(&doc, id);
        tools.set_text(&mut doc, "hello");
        assert!(tools.end_text_edit(&doc));
        assert_eq!(doc.object(id).and_then(|o| o.text()), Some("hello"));
    }

    #[test]
    fn test_leaving_crop_removes_crop_rect() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Crop, style());
        assert!(doc.crop_rect().is_some());
        assert_eq!(tools.tool(), Tool::Crop);

        tools.select_tool(&mut doc, Tool::Text, style());
        assert!(doc.crop_rect().is_none());
        assert_eq!(doc.objects().len(), 1);
    }

    #[test]
    fn test_freehand_needs_two_points() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Freehand, style());

        tools.pointer_down(&mut doc, Point::new(10.0, 10.0), 6.0);
        assert!(!tools.pointer_up(&mut doc, style()));
        assert!(doc.objects().is_empty());

        tools.pointer_down(&mut doc, Point::new(10.0, 10.0), 6.0);
        tools.pointer_move(&mut doc, Point::new(20.0, 15.0));
        tools.pointer_move(&mut doc, Point::new(30.0, 12.0));
        assert_eq!(tools.drawing_points().map(<[Point]>::len), Some(3));
        assert!(tools.pointer_up(&mut doc, style()));
        assert_eq!(doc.objects().len(), 1);
        assert_eq!(tools.tool(), Tool::Freehand);
    }

    #[test]
    fn test_move_and_click_without_move() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Rectangle, style());
        let id = doc.selection()[0];
        doc.take_changed();

        // Click on the outline without moving: nothing to commit.
        tools.pointer_down(&mut doc, Point::new(100.0, 150.0), 6.0);
        assert!(!tools.pointer_up(&mut doc, style()));
        assert!(!doc.take_changed());

        tools.pointer_down(&mut doc, Point::new(100.0, 150.0), 6.0);
        tools.pointer_move(&mut doc, Point::new(110.0, 160.0));
        assert!(tools.pointer_up(&mut doc, style()));
        assert_eq!(
            doc.object(id).map(|o| o.bounds()),
            Some(Rect::new(110.0, 110.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_resize_by_corner_handle() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Ellipse, style());
        let id = doc.selection()[0];

        tools.pointer_down(&mut doc, Point::new(201.0, 201.0), 6.0);
        assert!(matches!(
            tools.gesture(),
            Gesture::Dragging(Drag {
                kind: DragKind::Resize(Handle::BottomRight),
                ..
            })
        ));
        tools.pointer_move(&mut doc, Point::new(251.0, 231.0));
        assert!(tools.pointer_up(&mut doc, style()));
        assert_eq!(
            doc.object(id).map(|o| o.bounds()),
            Some(Rect::new(100.0, 100.0, 150.0, 130.0))
        );
    }

    #[test]
    fn test_horizontal_arrow_stretches_by_its_tip() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Arrow, style());
        let id = doc.selection()[0];

        // The default arrow runs from (100, 100) to (250, 100), so its
        // bounds are flat and the tip sits on the top-right handle.
        tools.pointer_down(&mut doc, Point::new(250.0, 100.0), 6.0);
        tools.pointer_move(&mut doc, Point::new(350.0, 100.0));
        assert!(tools.pointer_up(&mut doc, style()));
        assert_eq!(
            doc.object(id).map(|o| o.shape.clone()),
            Some(Shape::Arrow {
                start: Point::new(100.0, 100.0),
                end: Point::new(350.0, 100.0),
            })
        );
    }

    #[test]
    fn test_resize_still_refuses_collapsing_an_axis() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Rectangle, style());
        let id = doc.selection()[0];

        tools.pointer_down(&mut doc, Point::new(200.0, 200.0), 6.0);
        tools.pointer_move(&mut doc, Point::new(250.0, 100.0));
        tools.pointer_up(&mut doc, style());
        assert_eq!(
            doc.object(id).map(|o| o.bounds()),
            Some(Rect::new(100.0, 100.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_after_restore_keeps_tool_but_leaves_crop() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Freehand, style());
        tools.pointer_down(&mut doc, Point::new(10.0, 10.0), 6.0);
        tools.after_restore();
        assert_eq!(tools.tool(), Tool::Freehand);
        assert!(tools.drawing_points().is_none());

        tools.select_tool(&mut doc, Tool::Crop, style());
        tools.after_restore();
        assert_eq!(tools.tool(), Tool::Select);
    }

    #[test]
    fn test_crop_rect_has_hit_priority_and_never_commits() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Rectangle, style());
        tools.select_tool(&mut doc, Tool::Crop, style());
        doc.take_changed();

        // (100, 150) is on the rectangle but inside the crop rect.
        tools.pointer_down(&mut doc, Point::new(100.0, 150.0), 6.0);
        tools.pointer_move(&mut doc, Point::new(120.0, 150.0));
        assert!(!tools.pointer_up(&mut doc, style()));
        assert_eq!(doc.crop_rect().map(|c| c.rect.x), Some(70.0));
        assert!(!doc.take_changed());
    }

    #[test]
    fn test_empty_click_clears_selection() {
        let mut doc = doc();
        let mut tools = ToolController::new();
        tools.select_tool(&mut doc, Tool::Arrow, style());
        assert_eq!(doc.selection().len(), 1);
        tools.pointer_down(&mut doc, Point::new(700.0, 500.0), 6.0);
        assert!(doc.selection().is_empty());
        assert!(!tools.pointer_up(&mut doc, style()));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor canvas view.
//!
//! Paints the rendered scene through the editor's zoom/pan transform and
//! draws the interactive overlays (selection handles, crop box, the path
//! being drawn). Pointer input is translated to canvas coordinates and
//! handed back as [`CanvasAction`]s; the canvas never mutates the editor.

use crate::editor::canvas::SceneCanvas;
use crate::editor::Editor;
use crate::util::geometry::{Handle, Point, Rect};

const HANDLE_SIZE: f32 = 8.0;
const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 122, 255);

/// Result of canvas interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// Double click, used to start editing text.
    Activate(Point),
    /// Zoom by `factor` around `anchor` in view coordinates.
    Zoom { anchor: Point, factor: f32 },
    Pan(f32, f32),
}

/// Maps between screen positions and the editor's view space.
struct Viewport {
    origin: egui::Pos2,
}

impl Viewport {
    fn to_view(&self, pos: egui::Pos2) -> Point {
        Point::new(pos.x - self.origin.x, pos.y - self.origin.y)
    }

    fn to_screen(&self, editor: &Editor, p: Point) -> egui::Pos2 {
        let v = editor.view().to_view(p);
        egui::pos2(self.origin.x + v.x, self.origin.y + v.y)
    }

    fn rect_to_screen(&self, editor: &Editor, rect: &Rect) -> egui::Rect {
        egui::Rect::from_two_pos(
            self.to_screen(editor, Point::new(rect.x, rect.y)),
            self.to_screen(editor, Point::new(rect.right(), rect.bottom())),
        )
    }

    fn to_canvas(&self, editor: &Editor, pos: egui::Pos2) -> Point {
        editor.view().to_canvas(self.to_view(pos))
    }
}

/// Display the canvas and collect pointer input.
pub fn show(ui: &mut egui::Ui, editor: &Editor, texture: Option<&egui::TextureHandle>) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size() - egui::vec2(0.0, 24.0);
    let (width, height) = editor.canvas().size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        let (area, response) = ui.allocate_exact_size(available_size, egui::Sense::click_and_drag());

        // Centered at zoom 1; zoom and pan move the scene from there.
        let margin = ((area.size() - egui::vec2(width as f32, height as f32)) / 2.0).max(egui::Vec2::ZERO);
        let viewport = Viewport {
            origin: area.min + margin,
        };

        let painter = ui.painter_at(area);
        let image_rect = viewport.rect_to_screen(editor, &Rect::new(0.0, 0.0, width as f32, height as f32));
        match texture {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                painter.rect_filled(image_rect, 0.0, egui::Color32::from_gray(60));
            }
        }

        draw_drawing(&painter, editor, &viewport);
        draw_selection(&painter, editor, &viewport);
        draw_crop(&painter, editor, &viewport, image_rect);

        collect_input(ui, &response, editor, &viewport, &mut actions);
    });

    // Status bar
    ui.horizontal(|ui| {
        ui.label(format!("Tool: {}", editor.tool().label()));
        ui.separator();
        ui.label(format!("{}x{}", width, height));
        ui.separator();
        ui.label(format!("Zoom: {:.0}%", editor.view().zoom() * 100.0));
        ui.separator();
        ui.label(format!("{} object(s)", editor.canvas().objects().len()));
        if editor.is_busy() {
            ui.separator();
            ui.spinner();
            ui.label("Working...");
        }
    });

    actions
}

fn collect_input(
    ui: &egui::Ui,
    response: &egui::Response,
    editor: &Editor,
    viewport: &Viewport,
    actions: &mut Vec<CanvasAction>,
) {
    let primary = egui::PointerButton::Primary;

    if response.drag_started_by(primary) {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or(response.interact_pointer_pos());
        if let Some(pos) = origin {
            actions.push(CanvasAction::PointerDown(viewport.to_canvas(editor, pos)));
        }
    }
    if response.dragged_by(primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(CanvasAction::PointerMove(viewport.to_canvas(editor, pos)));
        }
    }
    if response.drag_stopped_by(primary) {
        actions.push(CanvasAction::PointerUp);
    }

    // A click without a drag still selects or deselects.
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(CanvasAction::PointerDown(viewport.to_canvas(editor, pos)));
            actions.push(CanvasAction::PointerUp);
        }
    }
    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(CanvasAction::Activate(viewport.to_canvas(editor, pos)));
        }
    }

    if response.dragged_by(egui::PointerButton::Middle) {
        let delta = response.drag_delta();
        actions.push(CanvasAction::Pan(delta.x, delta.y));
    }

    if let Some(hover) = response.hover_pos() {
        let factor = ui.input(|i| i.zoom_delta());
        if factor != 1.0 {
            actions.push(CanvasAction::Zoom {
                anchor: viewport.to_view(hover),
                factor,
            });
        }
    }
}

fn draw_handles(painter: &egui::Painter, corners: impl Iterator<Item = egui::Pos2>) {
    for corner in corners {
        let handle = egui::Rect::from_center_size(corner, egui::vec2(HANDLE_SIZE, HANDLE_SIZE));
        painter.rect_filled(handle, 1.0, egui::Color32::WHITE);
        painter.rect_stroke(handle, 1.0, egui::Stroke::new(1.0, SELECTION_COLOR));
    }
}

fn draw_selection(painter: &egui::Painter, editor: &Editor, viewport: &Viewport) {
    let canvas = editor.canvas();
    for id in canvas.selection() {
        let Some(object) = canvas.object(*id) else {
            continue;
        };
        let bounds = object.bounds();
        let rect = viewport.rect_to_screen(editor, &bounds);
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, SELECTION_COLOR));
        draw_handles(
            painter,
            Handle::ALL
                .iter()
                .map(|h| viewport.to_screen(editor, bounds.corner(*h))),
        );
    }
}

fn draw_crop(painter: &egui::Painter, editor: &Editor, viewport: &Viewport, image_rect: egui::Rect) {
    let Some(crop) = editor.canvas().crop_rect() else {
        return;
    };
    let area = crop.scaled();
    let rect = viewport.rect_to_screen(editor, &area);

    // Dim everything outside the crop box.
    let shade = egui::Color32::from_black_alpha(140);
    let outer = image_rect;
    for band in [
        egui::Rect::from_min_max(outer.min, egui::pos2(outer.max.x, rect.min.y)),
        egui::Rect::from_min_max(egui::pos2(outer.min.x, rect.max.y), outer.max),
        egui::Rect::from_min_max(
            egui::pos2(outer.min.x, rect.min.y),
            egui::pos2(rect.min.x, rect.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(rect.max.x, rect.min.y),
            egui::pos2(outer.max.x, rect.max.y),
        ),
    ] {
        if band.is_positive() {
            painter.rect_filled(band, 0.0, shade);
        }
    }

    painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, egui::Color32::WHITE));
    draw_handles(
        painter,
        Handle::ALL
            .iter()
            .map(|h| viewport.to_screen(editor, area.corner(*h))),
    );
    painter.text(
        rect.left_top() - egui::vec2(0.0, 4.0),
        egui::Align2::LEFT_BOTTOM,
        format!("{:.0} x {:.0}", area.width, area.height),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
}

/// The freehand path being drawn isn't in the scene yet, so it is
/// painted directly.
fn draw_drawing(painter: &egui::Painter, editor: &Editor, viewport: &Viewport) {
    let Some(points) = editor.tools().drawing_points() else {
        return;
    };
    if points.len() < 2 {
        return;
    }
    let style = editor.style();
    let screen: Vec<egui::Pos2> = points.iter().map(|p| viewport.to_screen(editor, *p)).collect();
    let stroke = egui::Stroke::new(style.stroke_width * editor.view().zoom(), style.color.to_egui());
    painter.add(egui::Shape::line(screen, stroke));
}

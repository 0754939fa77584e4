// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! One open editor: the [`Editor`], its on-screen texture and the
//! export running in the background.

use crate::editor::canvas::SceneCanvas;
use crate::editor::Editor;
use crate::error::{EditorError, ExportError};
use crate::io::media::to_color_image;
use crate::models::export::ExportOptions;
use crate::render::compositor;
use crate::render::encode::EncodedImage;
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::export_panel::{self, ExportAction};
use crate::ui::toast::Toasts;
use crate::ui::toolbar::{self, ToolbarAction};
use crate::util::geometry::Point;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// Finished export handed back to the shell.
pub struct ExportDone {
    pub encoded: EncodedImage,
    pub action: ExportAction,
}

struct ExportJob {
    action: ExportAction,
    receiver: Receiver<Result<EncodedImage, ExportError>>,
}

pub struct EditorSession {
    pub editor: Editor,
    pub options: ExportOptions,
    texture: Option<egui::TextureHandle>,
    /// Revision the texture was rendered at.
    texture_revision: Option<u64>,
    text_buffer: String,
    export_job: Option<ExportJob>,
    /// Center of the visible canvas area in view coordinates, for menu zoom.
    view_center: Point,
}

impl EditorSession {
    pub fn new(editor: Editor, options: ExportOptions) -> Self {
        let (w, h) = editor.canvas().size();
        let mut session = Self {
            editor,
            options,
            texture: None,
            texture_revision: None,
            text_buffer: String::new(),
            export_job: None,
            view_center: Point::new(w as f32 / 2.0, h as f32 / 2.0),
        };
        session.sync_text_buffer();
        session
    }

    /// Mirrors the centering done by the canvas view.
    fn center_of(&self, available: egui::Vec2) -> Point {
        let (w, h) = self.editor.canvas().size();
        let mx = ((available.x - w as f32) / 2.0).max(0.0);
        let my = ((available.y - h as f32) / 2.0).max(0.0);
        Point::new(available.x / 2.0 - mx, available.y / 2.0 - my)
    }

    pub fn is_exporting(&self) -> bool {
        self.export_job.is_some()
    }

    pub fn zoom_in(&mut self) {
        let center = self.view_center;
        self.editor.view_mut().zoom_in(center);
    }

    pub fn zoom_out(&mut self) {
        let center = self.view_center;
        self.editor.view_mut().zoom_out(center);
    }

    pub fn reset_zoom(&mut self) {
        self.editor.view_mut().reset();
    }

    /// Re-render the scene texture when the document changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let revision = self.editor.revision();
        if self.texture_revision == Some(revision) {
            return;
        }
        match self.editor.canvas().render() {
            Ok(img) => {
                let image = to_color_image(&img);
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("scene", image, egui::TextureOptions::LINEAR));
                    }
                }
            }
            Err(e) => log::error!("Failed to render scene: {}", e),
        }
        self.texture_revision = Some(revision);
    }

    fn sync_text_buffer(&mut self) {
        self.text_buffer = self
            .editor
            .editing_text()
            .and_then(|id| self.editor.canvas().object(id))
            .and_then(|obj| obj.text())
            .map(str::to_string)
            .unwrap_or_default();
    }

    /// Start compositing and encoding on a worker thread. The editor's
    /// pipeline stays locked until the worker is done.
    pub fn start_export(&mut self, action: ExportAction, ctx: &egui::Context, toasts: &mut Toasts) {
        self.editor.finish_text_edit();
        let (rendered, guard) = match self.editor.begin_export() {
            Ok(started) => started,
            Err(EditorError::Busy) => {
                toasts.error("Another crop or export is still running");
                return;
            }
            Err(e) => {
                toasts.error(format!("Export failed: {}", e));
                return;
            }
        };

        let options = self.options;
        let (sender, receiver) = channel();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = compositor::finish(rendered, &options);
            drop(guard);
            let _ = sender.send(result);
            ctx.request_repaint();
        });
        self.export_job = Some(ExportJob { action, receiver });
    }

    fn poll_export(&mut self, toasts: &mut Toasts) -> Option<ExportDone> {
        let job = self.export_job.as_ref()?;
        let action = job.action;
        let result = match job.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Export worker exited without a result");
                self.export_job = None;
                toasts.error("Export failed unexpectedly");
                return None;
            }
        };
        self.export_job = None;
        match result {
            Ok(encoded) => Some(ExportDone { encoded, action }),
            Err(e) => {
                toasts.error(format!("Export failed: {}", e));
                None
            }
        }
    }

    fn apply_crop(&mut self, toasts: &mut Toasts) {
        match self.editor.apply_crop() {
            Ok(()) => {}
            Err(EditorError::Busy) => toasts.error("Another crop or export is still running"),
            Err(EditorError::DegenerateCrop) => toasts.error("The crop area is empty"),
            Err(EditorError::NoCrop) => {}
            Err(e) => toasts.error(format!("Crop failed: {}", e)),
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction, toasts: &mut Toasts) {
        match action {
            ToolbarAction::SelectTool(tool) => self.editor.select_tool(tool),
            ToolbarAction::SetColor(color) => self.editor.set_color(color),
            ToolbarAction::SetStrokeWidth(width) => self.editor.set_stroke_width(width),
            ToolbarAction::ApplyCrop => self.apply_crop(toasts),
            ToolbarAction::CancelCrop => self.editor.cancel_crop(),
            ToolbarAction::Delete => {
                self.editor.delete_selected();
            }
            ToolbarAction::Undo => {
                self.editor.undo();
            }
            ToolbarAction::Redo => {
                self.editor.redo();
            }
            ToolbarAction::None => {}
        }
    }

    fn handle_canvas(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::PointerDown(p) => self.editor.pointer_down(p),
            CanvasAction::PointerMove(p) => self.editor.pointer_move(p),
            CanvasAction::PointerUp => self.editor.pointer_up(),
            CanvasAction::Activate(p) => {
                let tolerance = crate::editor::HANDLE_TOLERANCE_PX / self.editor.view().zoom();
                let target = self
                    .editor
                    .canvas()
                    .object_at(p, tolerance)
                    .filter(|id| self.editor.canvas().object(*id).and_then(|o| o.text()).is_some());
                if let Some(id) = target {
                    self.editor.begin_text_edit(id);
                }
            }
            CanvasAction::Zoom { anchor, factor } => self.editor.view_mut().zoom_at(anchor, factor),
            CanvasAction::Pan(dx, dy) => self.editor.view_mut().pan_by(dx, dy),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, toasts: &mut Toasts) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)) {
            self.editor.escape();
        }
        // Text fields own the keyboard while focused.
        if ctx.wants_keyboard_input() {
            return;
        }

        let redo = ctx.input_mut(|i| {
            i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
        });
        if redo {
            self.editor.redo();
        } else if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)) {
            self.editor.undo();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.editor.delete_selected();
        }
        if self.editor.is_cropping() && ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.apply_crop(toasts);
        }
    }

    fn show_text_editor(&mut self, ctx: &egui::Context, focus: bool) {
        let Some(id) = self.editor.editing_text() else {
            return;
        };
        let mut open = true;
        egui::Window::new("Edit text")
            .id(egui::Id::new("text-edit"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 80.0))
            .open(&mut open)
            .show(ctx, |ui| {
                let response = ui.text_edit_multiline(&mut self.text_buffer);
                if focus {
                    response.request_focus();
                }
                if response.changed() && self.editor.canvas().object(id).is_some() {
                    self.editor.edit_text(&self.text_buffer);
                }
                if ui.button("Done").clicked() {
                    self.editor.finish_text_edit();
                }
            });
        if !open {
            self.editor.finish_text_edit();
        }
    }

    /// Draw the editor and route input. Returns a finished export.
    pub fn show(&mut self, ctx: &egui::Context, toasts: &mut Toasts) -> Option<ExportDone> {
        let done = self.poll_export(toasts);
        let editing_before = self.editor.editing_text();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let action = toolbar::show(ui, &self.editor);
            self.handle_toolbar(action, toasts);
        });

        let busy = self.is_exporting() || self.editor.is_busy();
        let export_action = egui::SidePanel::right("export")
            .default_width(240.0)
            .show(ctx, |ui| export_panel::show(ui, &mut self.options, busy))
            .inner;
        if export_action != ExportAction::None {
            self.start_export(export_action, ctx, toasts);
        }

        self.refresh_texture(ctx);
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.view_center = self.center_of(ui.available_size());
                canvas::show(ui, &self.editor, self.texture.as_ref())
            })
            .inner;
        for action in actions {
            self.handle_canvas(action);
        }

        self.handle_keys(ctx, toasts);
        let started = self.editor.editing_text().is_some() && self.editor.editing_text() != editing_before;
        if self.editor.editing_text() != editing_before {
            self.sync_text_buffer();
        }
        self.show_text_editor(ctx, started);

        if self.is_exporting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Style;
    use crate::models::color::Rgba;
    use image::RgbaImage;

    fn session() -> EditorSession {
        let style = Style::stroke(Rgba::rgb(255, 0, 0), 2.0);
        let editor = Editor::open(RgbaImage::new(40, 30), 40, 30, style);
        EditorSession::new(editor, ExportOptions::default())
    }

    #[test]
    fn test_export_job_waits_for_worker() {
        let mut session = session();
        let (_sender, receiver) = channel();
        session.export_job = Some(ExportJob {
            action: ExportAction::Save,
            receiver,
        });
        let mut toasts = Toasts::default();
        assert!(session.poll_export(&mut toasts).is_none());
        assert!(session.is_exporting());
        assert!(toasts.items().is_empty());
    }

    #[test]
    fn test_dead_export_worker_releases_job() {
        let mut session = session();
        let (sender, receiver) = channel();
        session.export_job = Some(ExportJob {
            action: ExportAction::Copy,
            receiver,
        });
        drop(sender);

        let mut toasts = Toasts::default();
        assert!(session.poll_export(&mut toasts).is_none());
        assert!(!session.is_exporting());
        assert_eq!(toasts.items().len(), 1);
    }
}

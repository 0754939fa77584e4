// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Full-window overlay for region capture.

use crate::capture::region::{to_image_bounds, RegionSelector};
use crate::editor::crop::PixelBounds;
use crate::util::geometry::Point;

pub enum RegionAction {
    None,
    Selected(PixelBounds),
    Cancelled,
}

/// Show the capture stretched over the whole window, dimmed except for
/// the area being selected.
pub fn show(
    ctx: &egui::Context,
    texture: &egui::TextureHandle,
    image_size: (u32, u32),
    selector: &mut RegionSelector,
) -> RegionAction {
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        selector.cancel();
        log::info!("Region selection cancelled");
        return RegionAction::Cancelled;
    }

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let area = ui.max_rect();
            let response = ui.allocate_rect(area, egui::Sense::drag());
            let local = |pos: egui::Pos2| Point::new(pos.x - area.min.x, pos.y - area.min.y);

            let mut action = RegionAction::None;
            if response.drag_started() {
                if let Some(pos) = ui.input(|i| i.pointer.press_origin()) {
                    selector.press(local(pos));
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    selector.move_to(local(pos));
                }
            }
            if response.drag_stopped() {
                let end = response
                    .interact_pointer_pos()
                    .map(local)
                    .or_else(|| selector.preview().map(|r| Point::new(r.right(), r.bottom())));
                if let Some(rect) = end.and_then(|p| selector.release(p)) {
                    match to_image_bounds(&rect, (area.width(), area.height()), image_size) {
                        Some(bounds) => action = RegionAction::Selected(bounds),
                        None => log::debug!("Selection fell outside the capture"),
                    }
                }
            }

            let painter = ui.painter_at(area);
            painter.image(
                texture.id(),
                area,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let shade = egui::Color32::from_black_alpha(120);
            match selector.preview() {
                Some(sel) => {
                    let rect = egui::Rect::from_min_size(
                        area.min + egui::vec2(sel.x, sel.y),
                        egui::vec2(sel.width, sel.height),
                    );
                    for band in [
                        egui::Rect::from_min_max(area.min, egui::pos2(area.max.x, rect.min.y)),
                        egui::Rect::from_min_max(egui::pos2(area.min.x, rect.max.y), area.max),
                        egui::Rect::from_min_max(
                            egui::pos2(area.min.x, rect.min.y),
                            egui::pos2(rect.min.x, rect.max.y),
                        ),
                        egui::Rect::from_min_max(
                            egui::pos2(rect.max.x, rect.min.y),
                            egui::pos2(area.max.x, rect.max.y),
                        ),
                    ] {
                        if band.is_positive() {
                            painter.rect_filled(band, 0.0, shade);
                        }
                    }
                    painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, egui::Color32::WHITE));
                    painter.text(
                        rect.right_bottom() + egui::vec2(0.0, 4.0),
                        egui::Align2::RIGHT_TOP,
                        format!("{:.0} x {:.0}", sel.width, sel.height),
                        egui::FontId::proportional(13.0),
                        egui::Color32::WHITE,
                    );
                }
                None => {
                    painter.rect_filled(area, 0.0, shade);
                    painter.text(
                        area.center_top() + egui::vec2(0.0, 40.0),
                        egui::Align2::CENTER_TOP,
                        "Drag to select a region, Escape to cancel",
                        egui::FontId::proportional(18.0),
                        egui::Color32::WHITE,
                    );
                }
            }

            action
        })
        .inner
}

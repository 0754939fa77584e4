// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Picker shown when a window capture finds more than one window.

use crate::capture::CapturedSource;
use crate::io::media::to_color_image;

const THUMB_WIDTH: f32 = 240.0;

/// A captured window with its preview texture.
pub struct WindowChoice {
    pub source: CapturedSource,
    texture: egui::TextureHandle,
}

impl WindowChoice {
    pub fn new(ctx: &egui::Context, source: CapturedSource) -> Self {
        let texture = ctx.load_texture(
            format!("window-{}", source.id),
            to_color_image(&source.image),
            egui::TextureOptions::LINEAR,
        );
        Self { source, texture }
    }

    fn thumb_size(&self) -> egui::Vec2 {
        let (w, h) = self.source.image.dimensions();
        let scale = THUMB_WIDTH / w.max(1) as f32;
        egui::vec2(THUMB_WIDTH, (h as f32 * scale).min(THUMB_WIDTH))
    }
}

pub enum PickerAction {
    None,
    Pick(usize),
    Cancel,
}

pub fn show(ui: &mut egui::Ui, choices: &[WindowChoice]) -> PickerAction {
    let mut action = PickerAction::None;

    ui.horizontal(|ui| {
        ui.heading("Choose a window");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Cancel").clicked() {
                action = PickerAction::Cancel;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(16.0, 16.0);
            for (index, choice) in choices.iter().enumerate() {
                ui.vertical(|ui| {
                    ui.set_width(THUMB_WIDTH);
                    let image = egui::Image::new((choice.texture.id(), choice.thumb_size()));
                    if ui.add(egui::ImageButton::new(image)).clicked() {
                        action = PickerAction::Pick(index);
                    }
                    ui.label(egui::RichText::new(&choice.source.name).small());
                });
            }
        });
    });

    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = PickerAction::Cancel;
    }
    action
}

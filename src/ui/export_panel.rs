// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export options panel.

use crate::models::color::Rgba;
use crate::models::export::{BackgroundFill, ExportFormat, ExportOptions, Quality};

const DEFAULT_PADDING: u32 = 40;
const DEFAULT_RADIUS: f32 = 12.0;
const DEFAULT_GRADIENT: (Rgba, Rgba) = (Rgba::rgb(0x66, 0x7E, 0xEA), Rgba::rgb(0x76, 0x4B, 0xA2));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    None,
    /// Save to disk and copy to the clipboard.
    Save,
    /// Copy to the clipboard only.
    Copy,
}

fn color_button(ui: &mut egui::Ui, color: &mut Rgba) -> bool {
    let mut value = color.to_egui();
    let changed = ui.color_edit_button_srgba(&mut value).changed();
    if changed {
        *color = Rgba::from_egui(value);
    }
    changed
}

fn format_section(ui: &mut egui::Ui, options: &mut ExportOptions) {
    ui.horizontal(|ui| {
        ui.label("Format:");
        let is_png = matches!(options.format, ExportFormat::Png);
        if ui.radio(is_png, "PNG").clicked() {
            options.format = ExportFormat::Png;
        }
        if ui.radio(!is_png, "JPEG").clicked() && is_png {
            options.format = ExportFormat::Jpeg {
                quality: Quality::DEFAULT,
            };
        }
    });

    if let ExportFormat::Jpeg { quality } = &mut options.format {
        let mut value = quality.get();
        if ui
            .add(egui::Slider::new(&mut value, 0.05..=1.0).text("Quality"))
            .changed()
        {
            if let Some(q) = Quality::new(value) {
                *quality = q;
            }
        }
    }
}

fn background_section(ui: &mut egui::Ui, options: &mut ExportOptions) {
    let mut enabled = options.background.is_some();
    if ui.checkbox(&mut enabled, "Background").changed() {
        options.background = enabled.then_some(BackgroundFill::Solid { color: Rgba::WHITE });
    }

    let Some(fill) = &mut options.background else {
        return;
    };
    ui.indent("background", |ui| {
        let is_solid = matches!(fill, BackgroundFill::Solid { .. });
        ui.horizontal(|ui| {
            if ui.radio(is_solid, "Solid").clicked() && !is_solid {
                *fill = BackgroundFill::Solid { color: Rgba::WHITE };
            }
            if ui.radio(!is_solid, "Gradient").clicked() && is_solid {
                *fill = BackgroundFill::Gradient {
                    from: DEFAULT_GRADIENT.0,
                    to: DEFAULT_GRADIENT.1,
                };
            }
        });
        ui.horizontal(|ui| match fill {
            BackgroundFill::Solid { color } => {
                color_button(ui, color);
            }
            BackgroundFill::Gradient { from, to } => {
                color_button(ui, from);
                ui.label("→");
                color_button(ui, to);
            }
        });
    });
}

fn framing_section(ui: &mut egui::Ui, options: &mut ExportOptions) {
    let mut padded = options.padding.is_some();
    if ui.checkbox(&mut padded, "Padding").changed() {
        options.padding = padded.then_some(DEFAULT_PADDING);
    }
    if let Some(padding) = &mut options.padding {
        ui.add(egui::Slider::new(padding, 0..=200).suffix(" px"));
    }

    let mut rounded = options.corner_radius.is_some();
    if ui.checkbox(&mut rounded, "Rounded corners").changed() {
        options.corner_radius = rounded.then_some(DEFAULT_RADIUS);
    }
    if let Some(radius) = &mut options.corner_radius {
        ui.add(egui::Slider::new(radius, 0.0..=100.0).suffix(" px"));
    }

    ui.checkbox(&mut options.drop_shadow, "Drop shadow");
}

/// Display the export panel.
pub fn show(ui: &mut egui::Ui, options: &mut ExportOptions, busy: bool) -> ExportAction {
    let mut action = ExportAction::None;

    ui.heading("Export");
    ui.separator();

    format_section(ui, options);
    ui.add_space(8.0);
    background_section(ui, options);
    ui.add_space(8.0);
    framing_section(ui, options);

    ui.add_space(12.0);
    ui.separator();
    ui.horizontal(|ui| {
        if ui.add_enabled(!busy, egui::Button::new("💾 Save")).clicked() {
            action = ExportAction::Save;
        }
        if ui.add_enabled(!busy, egui::Button::new("📋 Copy")).clicked() {
            action = ExportAction::Copy;
        }
        if busy {
            ui.spinner();
        }
    });

    if options.is_plain() {
        ui.label(
            egui::RichText::new("Exported at canvas size without framing")
                .italics()
                .weak(),
        );
    }

    action
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor toolbar: tool selection, draw style and crop controls.

use crate::editor::tools::Tool;
use crate::editor::Editor;
use crate::models::color::Rgba;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    SelectTool(Tool),
    SetColor(Rgba),
    SetStrokeWidth(f32),
    ApplyCrop,
    CancelCrop,
    Delete,
    Undo,
    Redo,
}

fn icon(tool: Tool) -> &'static str {
    match tool {
        Tool::Select => "⬆",
        Tool::Freehand => "✏",
        Tool::Rectangle => "⬜",
        Tool::Ellipse => "⭕",
        Tool::Arrow => "➡",
        Tool::Text => "🅰",
        Tool::Crop => "✂",
    }
}

fn hint(tool: Tool, cropping: bool) -> &'static str {
    if cropping {
        return "Drag the crop box or its corners, Enter to apply, Escape to cancel";
    }
    match tool {
        Tool::Select => "Click to select, drag to move, drag a corner to resize",
        Tool::Freehand => "Drag to draw",
        Tool::Rectangle | Tool::Ellipse | Tool::Arrow => "Added, drag to place it",
        Tool::Text => "Double-click text to edit it",
        Tool::Crop => "Drag the crop box or its corners",
    }
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, editor: &Editor) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let current = editor.tool();
    let cropping = editor.is_cropping();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        for tool in Tool::ALL {
            let label = format!("{} {}", icon(tool), tool.label());
            if ui.selectable_label(current == tool, label).clicked() {
                action = ToolbarAction::SelectTool(tool);
            }
        }

        ui.separator();

        let mut color = editor.style().color.to_egui();
        if ui.color_edit_button_srgba(&mut color).changed() {
            action = ToolbarAction::SetColor(Rgba::from_egui(color));
        }
        let mut width = editor.style().stroke_width;
        if ui
            .add(egui::Slider::new(&mut width, 1.0..=20.0).text("Width"))
            .changed()
        {
            action = ToolbarAction::SetStrokeWidth(width);
        }

        ui.separator();

        if cropping {
            if ui.button("✔ Apply crop").clicked() {
                action = ToolbarAction::ApplyCrop;
            }
            if ui.button("✖ Cancel").clicked() {
                action = ToolbarAction::CancelCrop;
            }
        } else {
            let has_selection = editor.has_selection();
            if ui.add_enabled(has_selection, egui::Button::new("🗑 Delete")).clicked() {
                action = ToolbarAction::Delete;
            }
        }
        if ui.add_enabled(editor.can_undo(), egui::Button::new("⟲")).on_hover_text("Undo").clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.add_enabled(editor.can_redo(), egui::Button::new("⟳")).on_hover_text("Redo").clicked() {
            action = ToolbarAction::Redo;
        }

        ui.separator();
        ui.label(egui::RichText::new(hint(current, cropping)).italics().weak());
    });

    action
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Home screen: capture buttons and recent captures.

use crate::capture::CaptureKind;
use crate::io::media::to_color_image;
use crate::models::capture_history::{CaptureHistory, CaptureHistoryItem};
use crate::render::encode::decode_data_url;
use std::collections::HashMap;

const THUMB_WIDTH: f32 = 160.0;

pub enum HomeAction {
    None,
    Capture(CaptureKind),
    OpenImage,
    ToggleTheme,
    Reopen(String),
    ClearHistory,
}

/// Decoded thumbnails of capture history items, keyed by item id.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    fn get(&mut self, ctx: &egui::Context, item: &CaptureHistoryItem) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(item.id.clone())
            .or_insert_with(|| match decode_data_url(&item.thumbnail) {
                Ok(img) => Some(ctx.load_texture(
                    format!("thumb-{}", item.id),
                    to_color_image(&img),
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    log::warn!("Bad thumbnail for {}: {:#}", item.id, e);
                    None
                }
            })
            .as_ref()
    }

    /// Forget textures for items no longer in `history`.
    pub fn retain(&mut self, history: &CaptureHistory) {
        self.textures.retain(|id, _| history.get(id).is_some());
    }
}

pub struct HomeState<'a> {
    pub history: &'a CaptureHistory,
    pub capture_available: bool,
    pub busy: bool,
    pub dark: bool,
    pub shortcut_hint: &'a dyn Fn(CaptureKind) -> Option<String>,
}

/// Display the home screen.
pub fn show(ui: &mut egui::Ui, state: HomeState<'_>, thumbnails: &mut ThumbnailCache) -> HomeAction {
    let mut action = HomeAction::None;

    ui.vertical_centered(|ui| {
        ui.add_space(30.0);
        ui.heading(
            egui::RichText::new("Snapframe")
                .size(32.0)
                .color(egui::Color32::from_gray(200)),
        );
        ui.label(
            egui::RichText::new("Capture, annotate and frame screenshots")
                .size(14.0)
                .color(egui::Color32::from_gray(150)),
        );
        ui.add_space(20.0);

        ui.horizontal(|ui| {
            // Center the row of buttons.
            ui.add_space((ui.available_width() - 520.0).max(0.0) / 2.0);
            for (kind, icon) in [
                (CaptureKind::Fullscreen, "🖥"),
                (CaptureKind::Region, "⛶"),
                (CaptureKind::Window, "🗔"),
            ] {
                let button = egui::Button::new(format!("{} {}", icon, kind.label()))
                    .min_size(egui::vec2(120.0, 36.0));
                let mut response = ui.add_enabled(state.capture_available && !state.busy, button);
                if let Some(hint) = (state.shortcut_hint)(kind) {
                    response = response.on_hover_text(hint);
                }
                if response.clicked() {
                    action = HomeAction::Capture(kind);
                }
            }
            let open = egui::Button::new("📂 Open image...").min_size(egui::vec2(120.0, 36.0));
            if ui.add_enabled(!state.busy, open).clicked() {
                action = HomeAction::OpenImage;
            }
        });

        if !state.capture_available {
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new("Screen capture is not available in this build")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        }

        ui.add_space(8.0);
        let theme_label = if state.dark { "☀ Light theme" } else { "🌙 Dark theme" };
        if ui.small_button(theme_label).clicked() {
            action = HomeAction::ToggleTheme;
        }
    });

    ui.add_space(24.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.heading("Recent captures");
        if !state.history.is_empty() && ui.small_button("Clear").clicked() {
            action = HomeAction::ClearHistory;
        }
    });

    if state.history.is_empty() {
        ui.label(
            egui::RichText::new("Nothing exported yet")
                .italics()
                .weak(),
        );
        return action;
    }

    let ctx = ui.ctx().clone();
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
            for item in state.history.items() {
                ui.vertical(|ui| {
                    ui.set_width(THUMB_WIDTH);
                    let clicked = match thumbnails.get(&ctx, item) {
                        Some(texture) => {
                            let [w, h] = texture.size();
                            let height = h as f32 * THUMB_WIDTH / w.max(1) as f32;
                            let image = egui::Image::new((texture.id(), egui::vec2(THUMB_WIDTH, height)));
                            ui.add(egui::ImageButton::new(image)).on_hover_text("Open in editor").clicked()
                        }
                        None => ui.button("(unavailable)").clicked(),
                    };
                    if clicked {
                        action = HomeAction::Reopen(item.id.clone());
                    }
                    let local = item.timestamp.with_timezone(&chrono::Local);
                    ui.label(egui::RichText::new(local.format("%Y-%m-%d %H:%M").to_string()).small());
                });
            }
        });
    });

    action
}

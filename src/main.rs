// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Snapframe - screenshot capture and annotation
//!
//! Captures the screen, a window or a region, lets the user mark it up
//! with shapes, arrows, freehand strokes and text, and exports the result
//! with optional framing to a file or the clipboard.

mod app;
mod capture;
mod config;
mod editor;
mod error;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::SnapframeApp;
use config::Settings;

fn main() -> Result<()> {
    // Initialize logging, `RUST_LOG` overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Snapframe"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "snapframe",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(settings.theme.visuals());
            Ok(Box::new(SnapframeApp::new(settings)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

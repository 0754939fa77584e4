// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The shell owns the capture flows, the open editor session, the
//! capture history and the notifications. Captures and file loads run on
//! a background thread and report back over a channel, one at a time.

use crate::capture::region::RegionSelector;
use crate::capture::{self, CaptureKind, CaptureSource, CapturedSource};
use crate::config::{Settings, ShortcutBindings};
use crate::editor::Editor;
use crate::io::media::{self, IMAGE_EXTENSIONS};
use crate::io::output;
use crate::io::storage::{
    clear_capture_history, load_capture_history, save_capture_history, FileStore,
};
use crate::models::capture_history::{CaptureHistory, CaptureHistoryItem};
use crate::models::export::ExportOptions;
use crate::render::encode::{decode_data_url, thumbnail_data_url};
use crate::ui::editor_view::{EditorSession, ExportDone};
use crate::ui::export_panel::ExportAction;
use crate::ui::home::{self, HomeAction, HomeState, ThumbnailCache};
use crate::ui::region_overlay::{self, RegionAction};
use crate::ui::toast::Toasts;
use crate::ui::window_picker::{self, PickerAction, WindowChoice};
use image::RgbaImage;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Time for our own window to disappear before the screen is grabbed.
const HIDE_DELAY_MS: u64 = 250;
/// Width of the thumbnails kept in the capture history.
const THUMBNAIL_WIDTH: u32 = 320;

/// What the main window is showing.
enum Mode {
    Home,
    SelectingRegion(RegionCapture),
    PickingWindow(Vec<WindowChoice>),
    Editing(Box<EditorSession>),
}

struct RegionCapture {
    image: RgbaImage,
    texture: egui::TextureHandle,
    selector: RegionSelector,
}

/// Result of background capture or loading.
enum Loaded {
    Screen(CapturedSource),
    Region(CapturedSource),
    Windows(Vec<CapturedSource>),
    File(RgbaImage),
}

struct Job {
    receiver: Receiver<anyhow::Result<Loaded>>,
    /// Whether the window was hidden for the capture.
    hid_window: bool,
}

/// Menu bar commands, applied after the menu is drawn.
enum MenuCommand {
    Home,
    Open,
    Capture(CaptureKind),
    Quit,
    Undo,
    Redo,
    Delete,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ToggleTheme,
}

/// Main application state.
pub struct SnapframeApp {
    settings: Settings,
    source: Arc<dyn CaptureSource>,
    mode: Mode,

    /// Capture or file load in flight
    job: Option<Job>,
    loading_message: Option<String>,

    history: CaptureHistory,
    store: Option<FileStore>,
    thumbnails: ThumbnailCache,

    toasts: Toasts,
    shortcuts: ShortcutBindings,
}

impl SnapframeApp {
    pub fn new(settings: Settings) -> Self {
        let store = FileStore::open_default(settings.history_quota());
        let history = match &store {
            Some(store) => load_capture_history(store),
            None => {
                log::warn!("No data directory, capture history will not be kept");
                CaptureHistory::new()
            }
        };
        log::info!("Loaded {} recent capture(s)", history.len());

        let shortcuts = ShortcutBindings::register(&settings.shortcuts);
        Self {
            settings,
            source: capture::default_source(),
            mode: Mode::Home,
            job: None,
            loading_message: None,
            history,
            store,
            thumbnails: ThumbnailCache::default(),
            toasts: Toasts::new(),
            shortcuts,
        }
    }

    fn start_job(
        &mut self,
        ctx: &egui::Context,
        message: String,
        hid_window: bool,
        work: impl FnOnce() -> anyhow::Result<Loaded> + Send + 'static,
    ) {
        let (sender, receiver) = channel();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = sender.send(work());
            ctx.request_repaint();
        });
        self.job = Some(Job {
            receiver,
            hid_window,
        });
        self.loading_message = Some(message);
    }

    /// Hide the window, wait, and capture in the background.
    fn request_capture(&mut self, kind: CaptureKind, ctx: &egui::Context) {
        if self.job.is_some() {
            self.toasts.error("A capture is already in progress");
            return;
        }
        if !capture::is_available() {
            self.toasts.error("Screen capture is not available in this build");
            return;
        }

        log::info!("Starting {} capture", kind.label().to_lowercase());
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        let delay = Duration::from_millis(HIDE_DELAY_MS + self.settings.capture_delay_ms);
        let source = Arc::clone(&self.source);
        let message = format!("Capturing {}...", kind.label().to_lowercase());

        self.start_job(ctx, message, true, move || {
            std::thread::sleep(delay);
            let loaded = match kind {
                CaptureKind::Fullscreen => Loaded::Screen(source.capture_screen()?),
                CaptureKind::Region => Loaded::Region(source.capture_screen()?),
                CaptureKind::Window => Loaded::Windows(source.capture_windows()?),
            };
            Ok(loaded)
        });
    }

    /// Load an image file and open it in the editor (asynchronously).
    fn open_image_file(&mut self, ctx: &egui::Context) {
        if self.job.is_some() {
            self.toasts.error("Still loading, try again in a moment");
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        self.start_job(ctx, "Loading image...".to_string(), false, move || {
            Ok(Loaded::File(media::load_image(&path)?))
        });
    }

    fn poll_job(&mut self, ctx: &egui::Context) {
        let Some(job) = &self.job else {
            return;
        };
        let result = match job.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(anyhow::anyhow!("capture worker stopped")),
        };
        let hid_window = job.hid_window;
        self.job = None;
        self.loading_message = None;

        if hid_window {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        }

        match result {
            Ok(Loaded::Screen(source)) => {
                log::info!("Captured {} ({}x{})", source.name, source.image.width(), source.image.height());
                self.open_editor(source.image);
            }
            Ok(Loaded::Region(source)) => self.enter_region_mode(ctx, source),
            Ok(Loaded::Windows(mut windows)) => match windows.len() {
                0 => self.toasts.error("No windows available to capture"),
                1 => {
                    let source = windows.remove(0);
                    log::info!("Captured window `{}`", source.name);
                    self.open_editor(source.image);
                }
                n => {
                    log::info!("Found {} windows, asking which one", n);
                    let choices = windows
                        .into_iter()
                        .map(|source| WindowChoice::new(ctx, source))
                        .collect();
                    self.mode = Mode::PickingWindow(choices);
                }
            },
            Ok(Loaded::File(img)) => self.open_editor(img),
            Err(e) => self.toasts.error(format!("Capture failed: {:#}", e)),
        }
    }

    fn enter_region_mode(&mut self, ctx: &egui::Context, source: CapturedSource) {
        let texture = ctx.load_texture(
            "region-capture",
            media::to_color_image(&source.image),
            egui::TextureOptions::LINEAR,
        );
        self.mode = Mode::SelectingRegion(RegionCapture {
            image: source.image,
            texture,
            selector: RegionSelector::new(),
        });
        ctx.send_viewport_cmd(egui::ViewportCommand::Decorations(false));
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
    }

    fn exit_region_mode(&mut self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        ctx.send_viewport_cmd(egui::ViewportCommand::Decorations(true));
        self.mode = Mode::Home;
    }

    fn open_editor(&mut self, image: RgbaImage) {
        let editor = Editor::open(
            image,
            self.settings.canvas_width,
            self.settings.canvas_height,
            self.settings.draw_style(),
        );
        let options = ExportOptions {
            format: self.settings.export_format(),
            ..Default::default()
        };
        self.mode = Mode::Editing(Box::new(EditorSession::new(editor, options)));
    }

    fn reopen(&mut self, id: &str) {
        let Some(item) = self.history.get(id) else {
            return;
        };
        match decode_data_url(&item.thumbnail) {
            Ok(img) => self.open_editor(img),
            Err(e) => self.toasts.error(format!("Could not open capture: {:#}", e)),
        }
    }

    fn persist_history(&mut self) {
        if let Some(store) = &mut self.store {
            save_capture_history(store, &self.history);
        }
        self.thumbnails.retain(&self.history);
    }

    /// Save and/or copy a finished export and remember it.
    fn finish_export(&mut self, done: ExportDone) {
        let ExportDone { encoded, action } = done;
        let copied = output::copy_to_clipboard(&encoded);
        match action {
            ExportAction::Save => {
                let suggested = self
                    .settings
                    .auto_save
                    .then(|| output::suggested_filename(encoded.format));
                match output::save_image(&encoded, suggested.as_deref()) {
                    Some(path) => self.toasts.info(format!("Saved {}", path.display())),
                    None => self.toasts.info("Save cancelled"),
                }
            }
            ExportAction::Copy if copied => self.toasts.info("Copied to clipboard"),
            ExportAction::Copy => self.toasts.error("Could not copy to the clipboard"),
            ExportAction::None => return,
        }

        let thumbnail = encoded
            .decode()
            .and_then(|img| thumbnail_data_url(&img, THUMBNAIL_WIDTH));
        match thumbnail {
            Ok(url) => {
                self.history.push(CaptureHistoryItem::new(url));
                self.persist_history();
            }
            Err(e) => log::warn!("Could not create history thumbnail: {}", e),
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.settings.theme = self.settings.theme.toggled();
        ctx.set_visuals(self.settings.theme.visuals());
        self.settings.save();
    }

    fn session_mut(&mut self) -> Option<&mut EditorSession> {
        match &mut self.mode {
            Mode::Editing(session) => Some(session),
            _ => None,
        }
    }

    fn menu_bar(&self, ctx: &egui::Context) -> Option<MenuCommand> {
        let session = match &self.mode {
            Mode::Editing(session) => Some(session),
            _ => None,
        };
        let mut command = None;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add_enabled(session.is_some(), egui::Button::new("Close Editor")).clicked() {
                        command = Some(MenuCommand::Home);
                        ui.close_menu();
                    }
                    if ui.button("Open Image...").clicked() {
                        command = Some(MenuCommand::Open);
                        ui.close_menu();
                    }
                    ui.menu_button("Capture", |ui| {
                        for kind in [CaptureKind::Fullscreen, CaptureKind::Region, CaptureKind::Window] {
                            let mut button = egui::Button::new(kind.label());
                            if let Some(shortcut) = self.shortcuts.describe(ctx, kind) {
                                button = button.shortcut_text(shortcut);
                            }
                            if ui.add_enabled(capture::is_available(), button).clicked() {
                                command = Some(MenuCommand::Capture(kind));
                                ui.close_menu();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        command = Some(MenuCommand::Quit);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let can_undo = session.is_some_and(|s| s.editor.can_undo());
                    if ui.add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                        command = Some(MenuCommand::Undo);
                        ui.close_menu();
                    }
                    let can_redo = session.is_some_and(|s| s.editor.can_redo());
                    if ui.add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Shift+Z)")).clicked() {
                        command = Some(MenuCommand::Redo);
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_selection = session.is_some_and(|s| s.editor.has_selection());
                    if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                        command = Some(MenuCommand::Delete);
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    let editing = session.is_some();
                    if ui.add_enabled(editing, egui::Button::new("Zoom In")).clicked() {
                        command = Some(MenuCommand::ZoomIn);
                        ui.close_menu();
                    }
                    if ui.add_enabled(editing, egui::Button::new("Zoom Out")).clicked() {
                        command = Some(MenuCommand::ZoomOut);
                        ui.close_menu();
                    }
                    if ui.add_enabled(editing, egui::Button::new("Reset Zoom")).clicked() {
                        command = Some(MenuCommand::ResetZoom);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Toggle Theme").clicked() {
                        command = Some(MenuCommand::ToggleTheme);
                        ui.close_menu();
                    }
                });
            });
        });

        command
    }

    fn run_command(&mut self, command: MenuCommand, ctx: &egui::Context) {
        match command {
            MenuCommand::Home => self.mode = Mode::Home,
            MenuCommand::Open => self.open_image_file(ctx),
            MenuCommand::Capture(kind) => self.request_capture(kind, ctx),
            MenuCommand::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            MenuCommand::ToggleTheme => self.toggle_theme(ctx),
            MenuCommand::Undo => {
                if let Some(session) = self.session_mut() {
                    session.editor.undo();
                }
            }
            MenuCommand::Redo => {
                if let Some(session) = self.session_mut() {
                    session.editor.redo();
                }
            }
            MenuCommand::Delete => {
                if let Some(session) = self.session_mut() {
                    session.editor.delete_selected();
                }
            }
            MenuCommand::ZoomIn => {
                if let Some(session) = self.session_mut() {
                    session.zoom_in();
                }
            }
            MenuCommand::ZoomOut => {
                if let Some(session) = self.session_mut() {
                    session.zoom_out();
                }
            }
            MenuCommand::ResetZoom => {
                if let Some(session) = self.session_mut() {
                    session.reset_zoom();
                }
            }
        }
    }

    fn show_loading(&self, ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new(message)
                            .size(16.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                });
            });
        });
    }

    fn show_home(&mut self, ctx: &egui::Context) {
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let shortcuts = &self.shortcuts;
                let hint = |kind: CaptureKind| shortcuts.describe(ctx, kind);
                let state = HomeState {
                    history: &self.history,
                    capture_available: capture::is_available(),
                    busy: self.job.is_some(),
                    dark: ctx.style().visuals.dark_mode,
                    shortcut_hint: &hint,
                };
                home::show(ui, state, &mut self.thumbnails)
            })
            .inner;

        match action {
            HomeAction::Capture(kind) => self.request_capture(kind, ctx),
            HomeAction::OpenImage => self.open_image_file(ctx),
            HomeAction::ToggleTheme => self.toggle_theme(ctx),
            HomeAction::Reopen(id) => self.reopen(&id),
            HomeAction::ClearHistory => {
                self.history.clear();
                log::info!("Cleared capture history");
                if let Some(store) = &mut self.store {
                    if let Err(e) = clear_capture_history(store) {
                        log::warn!("Failed to remove stored capture history: {}", e);
                    }
                }
                self.thumbnails.retain(&self.history);
            }
            HomeAction::None => {}
        }
    }
}

impl eframe::App for SnapframeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job(ctx);

        // Region overlay takes over the whole window.
        if let Mode::SelectingRegion(region) = &mut self.mode {
            let size = region.image.dimensions();
            match region_overlay::show(ctx, &region.texture, size, &mut region.selector) {
                RegionAction::Selected(bounds) => {
                    let cropped = image::imageops::crop_imm(
                        &region.image,
                        bounds.x,
                        bounds.y,
                        bounds.width,
                        bounds.height,
                    )
                    .to_image();
                    log::info!("Captured region {}x{}", bounds.width, bounds.height);
                    self.exit_region_mode(ctx);
                    self.open_editor(cropped);
                }
                RegionAction::Cancelled => self.exit_region_mode(ctx),
                RegionAction::None => {}
            }
            self.toasts.show(ctx);
            return;
        }

        if self.job.is_none() {
            if let Some(kind) = self.shortcuts.poll(ctx) {
                self.request_capture(kind, ctx);
            }
        }

        if let Some(command) = self.menu_bar(ctx) {
            self.run_command(command, ctx);
        }

        if let Some(message) = self.loading_message.clone() {
            self.show_loading(ctx, &message);
            ctx.request_repaint_after(Duration::from_millis(100));
            self.toasts.show(ctx);
            return;
        }

        let mut finished = None;
        let mut picker = PickerAction::None;
        match &mut self.mode {
            Mode::Home => {}
            Mode::PickingWindow(choices) => {
                picker = egui::CentralPanel::default()
                    .show(ctx, |ui| window_picker::show(ui, choices))
                    .inner;
            }
            Mode::Editing(session) => finished = session.show(ctx, &mut self.toasts),
            Mode::SelectingRegion(_) => {}
        }
        if matches!(self.mode, Mode::Home) {
            self.show_home(ctx);
        }

        if let PickerAction::Cancel = picker {
            self.mode = Mode::Home;
        }
        if let PickerAction::Pick(index) = picker {
            if let Mode::PickingWindow(choices) = std::mem::replace(&mut self.mode, Mode::Home) {
                if let Some(choice) = choices.into_iter().nth(index) {
                    log::info!("Picked window `{}`", choice.source.name);
                    self.open_editor(choice.source.image);
                }
            }
        }
        if let Some(done) = finished {
            self.finish_export(done);
        }

        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shortcuts.release();
        if let Some(store) = &mut self.store {
            save_capture_history(store, &self.history);
        }
        log::info!("Shutting down");
    }
}

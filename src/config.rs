// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User settings.
//!
//! Read from `settings.yaml` in the platform config directory, or from the
//! file named by `SNAPFRAME_CONFIG`. Every field has a default, so a
//! partial file only overrides what it names.

use crate::capture::CaptureKind;
use crate::io::serialization::{read_yaml, write_yaml};
use crate::io::storage::DEFAULT_QUOTA_BYTES;
use crate::models::annotation::Style;
use crate::models::capture_history::MAX_ITEMS;
use crate::models::color::Rgba;
use crate::models::export::{ExportFormat, Quality};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "SNAPFRAME_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn visuals(&self) -> egui::Visuals {
        match self {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    #[default]
    Png,
    Jpeg,
}

/// Key combos for the three capture triggers, e.g. `Ctrl+Shift+3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutSettings {
    pub fullscreen: String,
    pub region: String,
    pub window: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            fullscreen: "Ctrl+Shift+3".to_string(),
            region: "Ctrl+Shift+4".to_string(),
            window: "Ctrl+Shift+5".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    /// Save exports straight to the Pictures folder instead of prompting.
    pub auto_save: bool,
    pub default_export_format: FormatSetting,
    pub jpeg_quality: f32,
    pub capture_delay_ms: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub draw_color: Rgba,
    pub stroke_width: f32,
    pub shortcuts: ShortcutSettings,
    pub history_quota_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            auto_save: false,
            default_export_format: FormatSetting::Png,
            jpeg_quality: Quality::DEFAULT.get(),
            capture_delay_ms: 0,
            canvas_width: 800,
            canvas_height: 600,
            draw_color: Rgba::rgb(0xFF, 0x3B, 0x30),
            stroke_width: 3.0,
            shortcuts: ShortcutSettings::default(),
            history_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl Settings {
    /// Settings file location: `$SNAPFRAME_CONFIG`, else the config dir.
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        Some(dirs::config_dir()?.join("snapframe").join("settings.yaml"))
    }

    /// Load the user's settings, falling back to defaults.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file is created with defaults; an
    /// unreadable one is left alone and defaults are used.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            match settings.save_to(path) {
                Ok(()) => log::info!("Wrote default settings to {}", path.display()),
                Err(e) => log::warn!("Could not write default settings: {:#}", e),
            }
            return settings;
        }
        match read_yaml::<Settings>(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        write_yaml(self, path)
    }

    /// Persist to the default location, if there is one.
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            log::warn!("Failed to save settings: {:#}", e);
        }
    }

    /// Clamp values that would break the editor.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if Quality::new(self.jpeg_quality).is_none() {
            log::warn!("jpeg_quality {} out of range, using default", self.jpeg_quality);
            self.jpeg_quality = defaults.jpeg_quality;
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            self.canvas_width = defaults.canvas_width;
            self.canvas_height = defaults.canvas_height;
        }
        if !(self.stroke_width > 0.0) {
            self.stroke_width = defaults.stroke_width;
        }
        self
    }

    pub fn export_format(&self) -> ExportFormat {
        match self.default_export_format {
            FormatSetting::Png => ExportFormat::Png,
            FormatSetting::Jpeg => ExportFormat::Jpeg {
                quality: Quality::new(self.jpeg_quality).unwrap_or_default(),
            },
        }
    }

    pub fn draw_style(&self) -> Style {
        Style::stroke(self.draw_color, self.stroke_width)
    }

    /// Quota for stored history; never below what one thumbnail needs.
    pub fn history_quota(&self) -> usize {
        self.history_quota_bytes.max(1024 * MAX_ITEMS)
    }
}

/// Parse `Ctrl+Shift+3` style combos. `Ctrl` and `Cmd` both mean the
/// platform command key.
pub fn parse_shortcut(text: &str) -> Option<egui::KeyboardShortcut> {
    let mut modifiers = egui::Modifiers::NONE;
    let mut key = None;
    for part in text.split('+').map(str::trim) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "cmd" | "command" => modifiers = modifiers | egui::Modifiers::COMMAND,
            "shift" => modifiers = modifiers | egui::Modifiers::SHIFT,
            "alt" | "option" => modifiers = modifiers | egui::Modifiers::ALT,
            "" => return None,
            _ => {
                if key.is_some() {
                    return None;
                }
                key = Some(egui::Key::from_name(part)?);
            }
        }
    }
    Some(egui::KeyboardShortcut::new(modifiers, key?))
}

/// Capture shortcuts active while the application runs.
#[derive(Debug, Default)]
pub struct ShortcutBindings {
    bindings: Vec<(CaptureKind, egui::KeyboardShortcut)>,
}

impl ShortcutBindings {
    /// Parse the configured combos; invalid ones are skipped with a warning.
    pub fn register(settings: &ShortcutSettings) -> Self {
        let mut bindings = Vec::new();
        for (kind, text) in [
            (CaptureKind::Fullscreen, &settings.fullscreen),
            (CaptureKind::Region, &settings.region),
            (CaptureKind::Window, &settings.window),
        ] {
            match parse_shortcut(text) {
                Some(shortcut) => bindings.push((kind, shortcut)),
                None => log::warn!("Invalid {} shortcut `{}`", kind.label(), text),
            }
        }
        log::info!("Registered {} capture shortcut(s)", bindings.len());
        Self { bindings }
    }

    /// Consume the first triggered shortcut this frame.
    pub fn poll(&self, ctx: &egui::Context) -> Option<CaptureKind> {
        self.bindings
            .iter()
            .find(|(_, shortcut)| ctx.input_mut(|i| i.consume_shortcut(shortcut)))
            .map(|(kind, _)| *kind)
    }

    /// Human-readable combo for `kind`, for menus and tooltips.
    pub fn describe(&self, ctx: &egui::Context, kind: CaptureKind) -> Option<String> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, shortcut)| ctx.format_shortcut(shortcut))
    }

    pub fn release(&mut self) {
        if !self.bindings.is_empty() {
            log::info!("Released {} capture shortcut(s)", self.bindings.len());
        }
        self.bindings.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.bindings.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: Settings =
            serde_yaml::from_str("theme: light\ndraw_color: '#00FF00'\nshortcuts:\n  region: Alt+R\n")
                .unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.draw_color, Rgba::rgb(0, 255, 0));
        assert_eq!(settings.shortcuts.region, "Alt+R");
        assert_eq!(settings.shortcuts.window, "Ctrl+Shift+5");
        assert_eq!((settings.canvas_width, settings.canvas_height), (800, 600));
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapframe/settings.yaml");
        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_bad_values_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "jpeg_quality: 4.0\ncanvas_width: 0\nstroke_width: -1\n").unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.jpeg_quality, 0.9);
        assert_eq!(settings.canvas_width, 800);
        assert_eq!(settings.stroke_width, 3.0);

        std::fs::write(&path, "theme: [").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_export_format_from_settings() {
        let settings = Settings {
            default_export_format: FormatSetting::Jpeg,
            jpeg_quality: 0.5,
            ..Default::default()
        };
        assert_eq!(
            settings.export_format(),
            ExportFormat::Jpeg {
                quality: Quality::new(0.5).unwrap()
            }
        );
    }

    #[test]
    fn test_parse_shortcut() {
        let shortcut = parse_shortcut("Ctrl+Shift+3").unwrap();
        assert_eq!(shortcut.logical_key, egui::Key::Num3);
        assert!(shortcut.modifiers.command && shortcut.modifiers.shift);

        assert!(parse_shortcut("Ctrl+").is_none());
        assert!(parse_shortcut("Ctrl+A+B").is_none());
        assert!(parse_shortcut("Shift+Nope").is_none());
    }

    #[test]
    fn test_bindings_register_and_release() {
        let mut shortcuts = ShortcutSettings::default();
        shortcuts.window = "Hyper+9".to_string();
        let mut bindings = ShortcutBindings::register(&shortcuts);
        assert_eq!(bindings.len(), 2);
        bindings.release();
        assert!(bindings.is_empty());
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transient notifications.

use std::time::{Duration, Instant};

const LIFETIME: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, message: String, level: ToastLevel, now: Instant) {
        self.items.push(Toast {
            message,
            level,
            created: now,
        });
        if self.items.len() > MAX_VISIBLE {
            self.items.remove(0);
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.push(message, ToastLevel::Info, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.push(message, ToastLevel::Error, Instant::now());
    }

    fn prune(&mut self, now: Instant) {
        self.items
            .retain(|toast| now.saturating_duration_since(toast.created) < LIFETIME);
    }

    #[cfg(test)]
    pub(crate) fn items(&self) -> &[Toast] {
        &self.items
    }

    /// Draw live toasts in the bottom-right corner.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.prune(Instant::now());
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let color = match toast.level {
                        ToastLevel::Info => egui::Color32::from_gray(220),
                        ToastLevel::Error => egui::Color32::from_rgb(255, 110, 100),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new(&toast.message).color(color));
                    });
                }
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::new();
        let start = Instant::now();
        toasts.push("saved".into(), ToastLevel::Info, start);
        toasts.push("failed".into(), ToastLevel::Error, start + Duration::from_secs(3));

        toasts.prune(start + Duration::from_secs(2));
        assert_eq!(toasts.items().len(), 2);
        toasts.prune(start + Duration::from_secs(5));
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].level, ToastLevel::Error);
    }

    #[test]
    fn test_oldest_dropped_beyond_limit() {
        let mut toasts = Toasts::new();
        let now = Instant::now();
        for n in 0..6 {
            toasts.push(format!("toast {n}"), ToastLevel::Info, now);
        }
        assert_eq!(toasts.items().len(), MAX_VISIBLE);
        assert_eq!(toasts.items()[0].message, "toast 2");
    }
}

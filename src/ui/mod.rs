// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for Snapframe.

pub mod canvas;
pub mod editor_view;
pub mod export_panel;
pub mod home;
pub mod region_overlay;
pub mod toast;
pub mod toolbar;
pub mod window_picker;

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for the editor and the capture history.

pub mod annotation;
pub mod capture_history;
pub mod color;
pub mod export;
pub mod scene;

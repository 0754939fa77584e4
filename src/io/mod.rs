// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: image files, settings files, local storage and export output.

pub mod media;
pub mod output;
pub mod serialization;
pub mod storage;

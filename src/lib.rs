// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Convo Folders: nested folders overlaid on a hosted chat app's conversation list.
//!
//! `model` holds the tree, `query` answers structural questions about it, `ops` mutates it
//! all-or-nothing, `transfer` exports, validates and imports snapshots, `sync` keeps cached
//! titles in step with the host sidebar, and `store` owns the live tree and persists it.

pub mod config;
pub mod error;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
pub mod sync;
pub mod time;
pub mod transfer;

pub use config::Config;
pub use error::{FolderError, FolderResult};

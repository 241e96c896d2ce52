// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence and the live tree owner.
//!
//! `blob` reads and writes whole records by key; `tree_store` owns the folder tree and
//! funnels every mutation through apply, persist and render.

pub mod blob;
pub mod tree_store;

pub use blob::{validate_key, BlobStore, FileBlobStore, MemoryBlobStore, WriteDurability};
pub use tree_store::{
    recovery_key, LogNotifier, NoRender, Notice, NoticeLevel, Notifier, RenderSink, TreeStore,
};

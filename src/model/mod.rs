// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! `FolderData` owns folders and the per-folder conversation lists; everything else refers to
//! folders and conversations by id.

pub mod conversation;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod folder;
pub mod folder_data;
pub mod ids;

pub use conversation::ConversationReference;
pub use folder::Folder;
pub use folder_data::{FolderData, InvariantViolation};
pub use ids::{ConversationId, FolderId, Id, IdError, ROOT_CONVERSATIONS_ID};

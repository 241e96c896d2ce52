// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the folder tree.
//!
//! Queries are pure functions of `FolderData`; renderers and the mutation layer both use them.

pub mod collate;
pub mod tree;

pub use collate::{compare_names, compare_names_base};
pub use tree::{
    ancestors, can_be_dragged, can_reparent, check_reparent, children, compare_siblings, depth,
    descendants, has_children, is_descendant, walk, ReparentRejection, TreeRow,
};

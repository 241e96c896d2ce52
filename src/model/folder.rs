// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::FolderId;

/// A user-defined, named node in the folder forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    id: FolderId,
    name: String,
    parent_id: Option<FolderId>,
    #[serde(default = "default_expanded")]
    is_expanded: bool,
    #[serde(default)]
    pinned: bool,
    created_at: i64,
    updated_at: i64,
}

fn default_expanded() -> bool {
    true
}

impl Folder {
    /// A freshly created folder: expanded, unpinned, both timestamps at `now`.
    ///
    /// The name is stored trimmed; callers reject empty names before getting here.
    pub fn new(id: FolderId, name: &str, parent_id: Option<FolderId>, now: i64) -> Self {
        Self {
            id,
            name: name.trim().to_owned(),
            parent_id,
            is_expanded: true,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &FolderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<&FolderId> {
        self.parent_id.as_ref()
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub(crate) fn set_id(&mut self, id: FolderId) {
        self.id = id;
    }

    pub(crate) fn set_name(&mut self, name: &str, now: i64) {
        self.name = name.trim().to_owned();
        self.updated_at = now;
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: Option<FolderId>, now: i64) {
        self.parent_id = parent_id;
        self.updated_at = now;
    }

    pub(crate) fn toggle_expanded(&mut self, now: i64) {
        self.is_expanded = !self.is_expanded;
        self.updated_at = now;
    }

    pub(crate) fn toggle_pinned(&mut self, now: i64) {
        self.pinned = !self.pinned;
        self.updated_at = now;
    }

    /// Rewrites the parent pointer without touching `updated_at` (import remapping).
    pub(crate) fn remap_parent_id(&mut self, parent_id: Option<FolderId>) {
        self.parent_id = parent_id;
    }
}

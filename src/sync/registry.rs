// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::model::{FolderData, FolderId};
use crate::query::can_be_dragged;

/// Keys that currently hold a subscription. Attach and detach are idempotent, so a second
/// attach for the same key never produces a second listener.
#[derive(Debug, Clone)]
pub struct SubscriptionRegistry<K> {
    attached: BTreeSet<K>,
}

impl<K> Default for SubscriptionRegistry<K> {
    fn default() -> Self {
        Self {
            attached: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> SubscriptionRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the key was not attached before.
    pub fn attach(&mut self, key: K) -> bool {
        self.attached.insert(key)
    }

    /// `true` when the key was attached before.
    pub fn detach(&mut self, key: &K) -> bool {
        self.attached.remove(key)
    }

    pub fn is_attached(&self, key: &K) -> bool {
        self.attached.contains(key)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.attached.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryChanges<K> {
    pub attached: Vec<K>,
    pub detached: Vec<K>,
}

impl<K> Default for RegistryChanges<K> {
    fn default() -> Self {
        Self {
            attached: Vec::new(),
            detached: Vec::new(),
        }
    }
}

impl<K> RegistryChanges<K> {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Brings folder drag subscriptions in line with the leaf-only drag rule: folders that gained
/// a subfolder lose their drag handle, folders that became leaves get one, deleted folders
/// are dropped.
pub fn sync_folder_drag(
    registry: &mut SubscriptionRegistry<FolderId>,
    data: &FolderData,
) -> RegistryChanges<FolderId> {
    let mut changes = RegistryChanges::default();

    let stale: Vec<FolderId> = registry
        .keys()
        .filter(|id| !data.contains_folder(id) || !can_be_dragged(data, id))
        .cloned()
        .collect();
    for id in stale {
        registry.detach(&id);
        changes.detached.push(id);
    }

    for folder in data.folders() {
        if can_be_dragged(data, folder.id()) && registry.attach(folder.id().clone()) {
            changes.attached.push(folder.id().clone());
        }
    }

    changes
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::conversation::ConversationReference;
use super::folder::Folder;
use super::ids::{ConversationId, FolderId};

/// The whole persisted organization: folders plus per-folder content lists.
///
/// This is also the exact shape of the persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderData {
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(default)]
    folder_contents: BTreeMap<FolderId, Vec<ConversationReference>>,
}

impl FolderData {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        folders: Vec<Folder>,
        folder_contents: BTreeMap<FolderId, Vec<ConversationReference>>,
    ) -> Self {
        Self {
            folders,
            folder_contents,
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder_contents(&self) -> &BTreeMap<FolderId, Vec<ConversationReference>> {
        &self.folder_contents
    }

    pub fn folder(&self, folder_id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id() == folder_id)
    }

    pub(crate) fn folder_mut(&mut self, folder_id: &FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id() == folder_id)
    }

    pub fn contains_folder(&self, folder_id: &FolderId) -> bool {
        self.folder(folder_id).is_some()
    }

    /// Whether `folder_id` may key a content list: an existing folder or the root pseudo-folder.
    pub fn is_content_key(&self, folder_id: &FolderId) -> bool {
        folder_id.is_root() || self.contains_folder(folder_id)
    }

    /// Content list for a folder; empty for unknown ids.
    pub fn contents(&self, folder_id: &FolderId) -> &[ConversationReference] {
        self.folder_contents
            .get(folder_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn contents_mut(&mut self, folder_id: &FolderId) -> &mut Vec<ConversationReference> {
        self.folder_contents.entry(folder_id.clone()).or_default()
    }

    pub(crate) fn folder_contents_mut(
        &mut self,
    ) -> &mut BTreeMap<FolderId, Vec<ConversationReference>> {
        &mut self.folder_contents
    }

    pub(crate) fn push_folder(&mut self, folder: Folder) {
        self.folders.push(folder);
    }

    /// Drops every folder and content list whose id is in `ids`.
    pub(crate) fn remove_folders(&mut self, ids: &BTreeSet<FolderId>) {
        self.folders.retain(|f| !ids.contains(f.id()));
        self.folder_contents.retain(|key, _| !ids.contains(key));
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.folder_contents.values().map(Vec::len).sum()
    }

    /// Distinct conversation ids referenced anywhere.
    pub fn conversation_ids(&self) -> BTreeSet<ConversationId> {
        self.folder_contents
            .values()
            .flatten()
            .map(|c| c.conversation_id().clone())
            .collect()
    }

    /// Checks the structural invariants every mutation must preserve.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut ids = BTreeSet::new();
        for folder in &self.folders {
            if !ids.insert(folder.id().clone()) {
                return Err(InvariantViolation::DuplicateFolderId {
                    folder_id: folder.id().clone(),
                });
            }
        }

        for folder in &self.folders {
            let Some(parent_id) = folder.parent_id() else {
                continue;
            };
            if !ids.contains(parent_id) {
                return Err(InvariantViolation::DanglingParent {
                    folder_id: folder.id().clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }

        for folder in &self.folders {
            let mut steps = 0usize;
            let mut current = folder.parent_id();
            while let Some(parent_id) = current {
                if parent_id == folder.id() || steps > self.folders.len() {
                    return Err(InvariantViolation::Cycle {
                        folder_id: folder.id().clone(),
                    });
                }
                steps += 1;
                current = self.folder(parent_id).and_then(Folder::parent_id);
            }
        }

        for (key, entries) in &self.folder_contents {
            if !key.is_root() && !ids.contains(key) {
                return Err(InvariantViolation::OrphanContents {
                    folder_id: key.clone(),
                });
            }
            let mut seen = BTreeSet::new();
            for entry in entries {
                if !seen.insert(entry.conversation_id()) {
                    return Err(InvariantViolation::DuplicateConversation {
                        folder_id: key.clone(),
                        conversation_id: entry.conversation_id().clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Brings a loaded record back in line with [`FolderData::check_invariants`] while keeping
    /// as much of it as possible. Earlier folders and entries win over later duplicates,
    /// dangling or cyclic parents move the folder to the root level, and content lists keyed
    /// by unknown folders are dropped. Returns what was repaired, in that order.
    pub fn repair(&mut self) -> Vec<InvariantViolation> {
        let mut repairs = Vec::new();

        let mut ids = BTreeSet::new();
        self.folders.retain(|folder| {
            let fresh = ids.insert(folder.id().clone());
            if !fresh {
                repairs.push(InvariantViolation::DuplicateFolderId {
                    folder_id: folder.id().clone(),
                });
            }
            fresh
        });

        for folder in &mut self.folders {
            let Some(parent_id) = folder.parent_id().cloned() else {
                continue;
            };
            if !ids.contains(&parent_id) {
                repairs.push(InvariantViolation::DanglingParent {
                    folder_id: folder.id().clone(),
                    parent_id,
                });
                folder.remap_parent_id(None);
            }
        }

        // Each cycle is cut at the first member that walks back to itself.
        for idx in 0..self.folders.len() {
            let folder_id = self.folders[idx].id().clone();
            let mut steps = 0usize;
            let mut current = self.folders[idx].parent_id().cloned();
            while let Some(parent_id) = current {
                if parent_id == folder_id {
                    repairs.push(InvariantViolation::Cycle {
                        folder_id: folder_id.clone(),
                    });
                    self.folders[idx].remap_parent_id(None);
                    break;
                }
                steps += 1;
                if steps > self.folders.len() {
                    break;
                }
                current = self.folder(&parent_id).and_then(Folder::parent_id).cloned();
            }
        }

        self.folder_contents.retain(|key, _| {
            let known = key.is_root() || ids.contains(key);
            if !known {
                repairs.push(InvariantViolation::OrphanContents {
                    folder_id: key.clone(),
                });
            }
            known
        });

        for (key, entries) in &mut self.folder_contents {
            let mut seen = BTreeSet::new();
            entries.retain(|entry| {
                let fresh = seen.insert(entry.conversation_id().clone());
                if !fresh {
                    repairs.push(InvariantViolation::DuplicateConversation {
                        folder_id: key.clone(),
                        conversation_id: entry.conversation_id().clone(),
                    });
                }
                fresh
            });
        }

        repairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    DuplicateFolderId {
        folder_id: FolderId,
    },
    DanglingParent {
        folder_id: FolderId,
        parent_id: FolderId,
    },
    Cycle {
        folder_id: FolderId,
    },
    OrphanContents {
        folder_id: FolderId,
    },
    DuplicateConversation {
        folder_id: FolderId,
        conversation_id: ConversationId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFolderId { folder_id } => write!(f, "duplicate folder id {folder_id}"),
            Self::DanglingParent {
                folder_id,
                parent_id,
            } => write!(f, "folder {folder_id} points at missing parent {parent_id}"),
            Self::Cycle { folder_id } => write!(f, "folder {folder_id} is its own ancestor"),
            Self::OrphanContents { folder_id } => {
                write!(f, "content list keyed by unknown folder {folder_id}")
            }
            Self::DuplicateConversation {
                folder_id,
                conversation_id,
            } => write!(
                f,
                "folder {folder_id} lists conversation {conversation_id} more than once"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

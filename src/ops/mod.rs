// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for the folder tree.
//!
//! A batch of ops is applied to a cloned candidate and only swapped in when every op
//! succeeded, so callers never observe a half-applied tree. Ops that are legal no-ops
//! (an empty rename, a refused drag) are reported in [`ApplyResult::skipped`] instead of
//! failing the batch.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::error::FolderError;
use crate::model::{ConversationId, ConversationReference, Folder, FolderData, FolderId};
use crate::query::{check_reparent, descendants, ReparentRejection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Folder(FolderOp),
    Content(ContentOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOp {
    Create {
        folder_id: FolderId,
        name: String,
        parent_id: Option<FolderId>,
    },
    Rename {
        folder_id: FolderId,
        name: String,
    },
    /// Removes the folder, its whole subtree, and every content list under it.
    Delete {
        folder_id: FolderId,
    },
    TogglePin {
        folder_id: FolderId,
    },
    ToggleExpand {
        folder_id: FolderId,
    },
    /// `new_parent_id: None` moves the folder to the root level.
    Move {
        folder_id: FolderId,
        new_parent_id: Option<FolderId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOp {
    /// Files a conversation; with a differing `source_folder_id` this is a move.
    Add {
        folder_id: FolderId,
        conversation: ConversationReference,
        source_folder_id: Option<FolderId>,
    },
    Remove {
        folder_id: FolderId,
        conversation_id: ConversationId,
    },
    /// Drops every entry matching by id or by url substring.
    RemoveEverywhere {
        conversation_id: ConversationId,
    },
    /// Manual title override of a single entry.
    RenameEntry {
        folder_id: FolderId,
        conversation_id: ConversationId,
        title: String,
    },
    /// Host-side title change, applied to every matching entry.
    UpdateTitleEverywhere {
        conversation_id: ConversationId,
        title: String,
    },
    /// Menu-driven move; the target copy gets a fresh `added_at`.
    Move {
        source_folder_id: FolderId,
        target_folder_id: FolderId,
        conversation: ConversationReference,
    },
}

/// Why an op left the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyName,
    UnknownFolder,
    Reparent(ReparentRejection),
    AlreadyFiled,
    NotFiled,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOp {
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    /// Ops that changed something.
    pub applied: usize,
    pub skipped: Vec<SkippedOp>,
    pub delta: Delta,
}

impl ApplyResult {
    pub fn changed(&self) -> bool {
        !self.delta.is_empty()
    }

    /// The reparent rejection of the first refused move, if any.
    pub fn reparent_rejection(&self) -> Option<ReparentRejection> {
        self.skipped.iter().find_map(|s| match s.reason {
            SkipReason::Reparent(rejection) => Some(rejection),
            _ => None,
        })
    }
}

/// Coarse description of what a batch touched, for re-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added_folders: Vec<FolderId>,
    pub removed_folders: Vec<FolderId>,
    pub updated_folders: Vec<FolderId>,
    pub touched_contents: Vec<FolderId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added_folders.is_empty()
            && self.removed_folders.is_empty()
            && self.updated_folders.is_empty()
            && self.touched_contents.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<FolderId>,
    removed: BTreeSet<FolderId>,
    updated: BTreeSet<FolderId>,
    contents: BTreeSet<FolderId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, folder_id: FolderId) {
        self.removed.remove(&folder_id);
        self.updated.remove(&folder_id);
        self.added.insert(folder_id);
    }

    fn record_removed(&mut self, folder_id: FolderId) {
        let was_added = self.added.remove(&folder_id);
        self.updated.remove(&folder_id);
        self.contents.remove(&folder_id);
        if !was_added {
            self.removed.insert(folder_id);
        }
    }

    fn record_updated(&mut self, folder_id: FolderId) {
        if self.added.contains(&folder_id) || self.removed.contains(&folder_id) {
            return;
        }
        self.updated.insert(folder_id);
    }

    fn record_contents(&mut self, folder_id: FolderId) {
        self.contents.insert(folder_id);
    }

    fn finish(self) -> Delta {
        Delta {
            added_folders: self.added.into_iter().collect(),
            removed_folders: self.removed.into_iter().collect(),
            updated_folders: self.updated.into_iter().collect(),
            touched_contents: self.contents.into_iter().collect(),
        }
    }
}

/// Failures that abort the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("folder name must not be empty")]
    EmptyName,
    #[error("folder {folder_id} already exists")]
    AlreadyExists { folder_id: FolderId },
    #[error("parent folder {parent_id} not found")]
    UnknownParent { parent_id: FolderId },
    #[error("folder id {folder_id} is reserved")]
    ReservedId { folder_id: FolderId },
}

impl From<ApplyError> for FolderError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::EmptyName => FolderError::validation("folder name", err.to_string()),
            ApplyError::AlreadyExists { .. } | ApplyError::ReservedId { .. } => {
                FolderError::validation("folder id", err.to_string())
            }
            ApplyError::UnknownParent { parent_id } => FolderError::NotFound {
                what: format!("parent folder {parent_id}"),
            },
        }
    }
}

/// Applies `ops` in order; on error `data` is left exactly as it was.
pub fn apply_ops(data: &mut FolderData, ops: &[Op], now: i64) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            skipped: Vec::new(),
            delta: Delta::default(),
        });
    }

    let mut candidate = data.clone();
    let result = apply_ops_in_place(&mut candidate, ops, now)?;
    if result.changed() {
        *data = candidate;
    }
    Ok(result)
}

/// Applies `ops` directly to `candidate`. On error the candidate may be half-applied; callers
/// pass a copy they are ready to throw away.
pub fn apply_ops_in_place(
    candidate: &mut FolderData,
    ops: &[Op],
    now: i64,
) -> Result<ApplyResult, ApplyError> {
    let mut delta = DeltaBuilder::default();
    let mut skipped = Vec::new();
    let mut applied = 0usize;

    for (index, op) in ops.iter().enumerate() {
        let outcome = match op {
            Op::Folder(folder_op) => apply_folder_op(candidate, folder_op, now, &mut delta)?,
            Op::Content(content_op) => apply_content_op(candidate, content_op, now, &mut delta),
        };
        match outcome {
            Outcome::Changed => applied += 1,
            Outcome::Skipped(reason) => skipped.push(SkippedOp { index, reason }),
        }
    }

    Ok(ApplyResult {
        applied,
        skipped,
        delta: delta.finish(),
    })
}

enum Outcome {
    Changed,
    Skipped(SkipReason),
}

// Extracted op-application implementation for folder/content mutations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Folder, FolderData, FolderId};

use super::collate::compare_names;

/// Sibling order: pinned first, then collated name, then id.
pub fn compare_siblings(a: &Folder, b: &Folder) -> Ordering {
    b.pinned()
        .cmp(&a.pinned())
        .then_with(|| compare_names(a.name(), b.name()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Direct children of `parent_id` (`None` = root level), in sibling order.
pub fn children<'a>(data: &'a FolderData, parent_id: Option<&FolderId>) -> Vec<&'a Folder> {
    let mut out: Vec<&Folder> = data
        .folders()
        .iter()
        .filter(|f| f.parent_id() == parent_id)
        .collect();
    out.sort_by(|a, b| compare_siblings(a, b));
    out
}

pub fn has_children(data: &FolderData, folder_id: &FolderId) -> bool {
    data.folders()
        .iter()
        .any(|f| f.parent_id() == Some(folder_id))
}

fn child_index(data: &FolderData) -> BTreeMap<&FolderId, Vec<&Folder>> {
    let mut index: BTreeMap<&FolderId, Vec<&Folder>> = BTreeMap::new();
    for folder in data.folders() {
        if let Some(parent_id) = folder.parent_id() {
            index.entry(parent_id).or_default().push(folder);
        }
    }
    for siblings in index.values_mut() {
        siblings.sort_by(|a, b| compare_siblings(a, b));
    }
    index
}

/// `folder_id` followed by every transitive descendant, pre-order.
///
/// Unknown ids yield just the id itself so that cascading deletes stay total.
pub fn descendants(data: &FolderData, folder_id: &FolderId) -> Vec<FolderId> {
    let index = child_index(data);
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![folder_id];

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current.clone());
        if let Some(kids) = index.get(current) {
            for kid in kids.iter().rev() {
                stack.push(kid.id());
            }
        }
    }

    out
}

/// Whether `ancestor` appears on the parent chain of `candidate` (a folder is its own
/// descendant here, matching drop-target checks).
pub fn is_descendant(data: &FolderData, candidate: &FolderId, ancestor: &FolderId) -> bool {
    let mut current = Some(candidate);
    let mut steps = 0usize;
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if steps > data.folder_count() {
            return false;
        }
        steps += 1;
        current = data.folder(id).and_then(Folder::parent_id);
    }
    false
}

/// Ancestors of `folder_id` from the root level down to its parent.
pub fn ancestors(data: &FolderData, folder_id: &FolderId) -> Vec<FolderId> {
    let mut out = Vec::new();
    let mut current = data.folder(folder_id).and_then(Folder::parent_id);
    while let Some(id) = current {
        if out.contains(id) || out.len() > data.folder_count() {
            break;
        }
        out.push(id.clone());
        current = data.folder(id).and_then(Folder::parent_id);
    }
    out.reverse();
    out
}

pub fn depth(data: &FolderData, folder_id: &FolderId) -> usize {
    ancestors(data, folder_id).len()
}

/// Leaf-only drag policy: a folder with subfolders cannot be picked up.
///
/// This is a product rule that keeps nesting shallow, not something the data model needs.
pub fn can_be_dragged(data: &FolderData, folder_id: &FolderId) -> bool {
    !has_children(data, folder_id)
}

/// Why a reparent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentRejection {
    UnknownFolder,
    UnknownParent,
    OntoSelf,
    OntoDescendant,
    HasSubfolders,
}

impl ReparentRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownFolder => "unknown folder",
            Self::UnknownParent => "unknown target parent",
            Self::OntoSelf => "folder cannot become its own parent",
            Self::OntoDescendant => "target is a descendant of the folder",
            Self::HasSubfolders => "only folders without subfolders can be moved",
        }
    }

    pub fn is_cycle(self) -> bool {
        matches!(self, Self::OntoSelf | Self::OntoDescendant)
    }
}

/// Checks a reparent without side effects; `Ok(())` means the move may proceed.
pub fn check_reparent(
    data: &FolderData,
    folder_id: &FolderId,
    new_parent_id: Option<&FolderId>,
) -> Result<(), ReparentRejection> {
    if !data.contains_folder(folder_id) {
        return Err(ReparentRejection::UnknownFolder);
    }
    if let Some(new_parent_id) = new_parent_id {
        if new_parent_id == folder_id {
            return Err(ReparentRejection::OntoSelf);
        }
        if !data.contains_folder(new_parent_id) {
            return Err(ReparentRejection::UnknownParent);
        }
        if is_descendant(data, new_parent_id, folder_id) {
            return Err(ReparentRejection::OntoDescendant);
        }
    }
    if has_children(data, folder_id) {
        return Err(ReparentRejection::HasSubfolders);
    }
    Ok(())
}

pub fn can_reparent(
    data: &FolderData,
    folder_id: &FolderId,
    new_parent_id: Option<&FolderId>,
) -> bool {
    check_reparent(data, folder_id, new_parent_id).is_ok()
}

/// One row of a depth-first walk in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub folder: &'a Folder,
}

/// Every folder in display order (root siblings sorted, each followed by its subtree).
///
/// Collapsed folders still contribute their subtree; renderers skip rows as needed.
pub fn walk(data: &FolderData) -> Vec<TreeRow<'_>> {
    let index = child_index(data);
    let mut out = Vec::with_capacity(data.folder_count());
    let mut stack: Vec<(usize, &Folder)> = children(data, None)
        .into_iter()
        .rev()
        .map(|f| (0, f))
        .collect();

    while let Some((depth, folder)) = stack.pop() {
        out.push(TreeRow { depth, folder });
        if let Some(kids) = index.get(folder.id()) {
            for kid in kids.iter().rev() {
                stack.push((depth + 1, *kid));
            }
        }
    }

    out
}

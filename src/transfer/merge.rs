// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Computes the post-import tree. Nothing here touches the live store: the caller commits
//! [`ImportOutcome::data`] once the whole computation succeeded.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SchemaError;
use crate::model::{ConversationReference, Folder, FolderData, FolderId};

use super::payload::ExportPayload;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportStrategy {
    #[default]
    Merge,
    Overwrite,
}

impl ImportStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Overwrite => "overwrite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub strategy: ImportStrategy,
    pub create_backup: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strategy: ImportStrategy::Merge,
            create_backup: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub folders_imported: usize,
    pub conversations_imported: usize,
    /// Always zero: folders are never matched by name, so none is ever skipped.
    pub duplicate_folders_skipped: usize,
    pub duplicate_conversations_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub data: FolderData,
    pub stats: ImportStats,
    /// Snapshot of the tree before the import, when requested.
    pub backup: Option<FolderData>,
}

pub fn import_payload(
    payload: &ExportPayload,
    current: &FolderData,
    options: ImportOptions,
) -> Result<ImportOutcome, SchemaError> {
    let (data, stats) = match options.strategy {
        ImportStrategy::Overwrite => overwrite(payload),
        ImportStrategy::Merge => merge(payload, current)?,
    };

    data.check_invariants()
        .map_err(|violation| SchemaError::new("$", violation.to_string()))?;

    tracing::info!(
        strategy = options.strategy.as_str(),
        folders = stats.folders_imported,
        conversations = stats.conversations_imported,
        duplicates_skipped = stats.duplicate_conversations_skipped,
        "computed import"
    );

    Ok(ImportOutcome {
        data,
        stats,
        backup: options.create_backup.then(|| current.clone()),
    })
}

fn overwrite(payload: &ExportPayload) -> (FolderData, ImportStats) {
    let mut stats = ImportStats {
        folders_imported: payload.folders.len(),
        ..ImportStats::default()
    };
    let mut contents = BTreeMap::new();
    for (folder_id, entries) in &payload.folder_contents {
        let mut list: Vec<ConversationReference> = Vec::with_capacity(entries.len());
        push_unique(&mut list, entries, &mut stats);
        contents.insert(folder_id.clone(), list);
    }
    (
        FolderData::from_parts(payload.folders.clone(), contents),
        stats,
    )
}

fn merge(payload: &ExportPayload, current: &FolderData) -> Result<(FolderData, ImportStats), SchemaError> {
    let mut data = current.clone();
    let mut stats = ImportStats::default();
    let mut taken: BTreeSet<FolderId> = current.folders().iter().map(|f| f.id().clone()).collect();
    let mut id_map: BTreeMap<&FolderId, FolderId> = BTreeMap::new();

    for folder in top_down(&payload.folders)? {
        let new_id = if taken.contains(folder.id()) {
            fresh_id(&taken)
        } else {
            folder.id().clone()
        };
        let new_parent = match folder.parent_id() {
            Some(parent_id) => Some(id_map.get(parent_id).cloned().ok_or_else(|| {
                SchemaError::new(
                    "folders",
                    format!("parent {:?} was not imported before its child", parent_id.as_str()),
                )
            })?),
            None => None,
        };
        if new_id != *folder.id() {
            tracing::debug!(
                from = %folder.id(),
                to = %new_id,
                "remapped colliding folder id"
            );
        }

        let mut imported = folder.clone();
        imported.set_id(new_id.clone());
        imported.remap_parent_id(new_parent);
        data.push_folder(imported);
        data.contents_mut(&new_id);
        taken.insert(new_id.clone());
        id_map.insert(folder.id(), new_id);
        stats.folders_imported += 1;
    }

    for (folder_id, entries) in &payload.folder_contents {
        let target = if folder_id.is_root() {
            FolderId::root()
        } else {
            id_map.get(folder_id).cloned().ok_or_else(|| {
                SchemaError::new(
                    format!("folderContents[{:?}]", folder_id.as_str()),
                    "no imported folder for this list",
                )
            })?
        };
        push_unique(data.contents_mut(&target), entries, &mut stats);
    }

    Ok((data, stats))
}

/// Existing entries win; later duplicates are counted and dropped.
fn push_unique(
    list: &mut Vec<ConversationReference>,
    entries: &[ConversationReference],
    stats: &mut ImportStats,
) {
    for entry in entries {
        if list
            .iter()
            .any(|c| c.conversation_id() == entry.conversation_id())
        {
            stats.duplicate_conversations_skipped += 1;
            continue;
        }
        list.push(entry.clone());
        stats.conversations_imported += 1;
    }
}

fn fresh_id(taken: &BTreeSet<FolderId>) -> FolderId {
    loop {
        let candidate = FolderId::generate();
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}

/// Parents before children; siblings keep their payload order.
fn top_down(folders: &[Folder]) -> Result<Vec<&Folder>, SchemaError> {
    let mut ordered: Vec<&Folder> = Vec::with_capacity(folders.len());
    let mut placed: BTreeSet<&FolderId> = BTreeSet::new();

    while ordered.len() < folders.len() {
        let before = ordered.len();
        for folder in folders {
            if placed.contains(folder.id()) {
                continue;
            }
            let ready = folder.parent_id().map_or(true, |p| placed.contains(p));
            if ready {
                placed.insert(folder.id());
                ordered.push(folder);
            }
        }
        if ordered.len() == before {
            return Err(SchemaError::new(
                "folders",
                "parent graph has a cycle or a dangling parent",
            ));
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::{import_payload, top_down, ImportOptions, ImportStrategy};
    use crate::model::fixtures::{chain, cid, conversation, fid, research_tree};
    use crate::model::{FolderData, FolderId};
    use crate::query::{children, descendants};
    use crate::transfer::export_payload;

    fn merge() -> ImportOptions {
        ImportOptions {
            strategy: ImportStrategy::Merge,
            create_backup: false,
        }
    }

    fn overwrite() -> ImportOptions {
        ImportOptions {
            strategy: ImportStrategy::Overwrite,
            create_backup: false,
        }
    }

    #[test]
    fn merge_into_empty_imports_every_folder() {
        let payload = export_payload(&research_tree(), "t");
        let outcome = import_payload(&payload, &FolderData::new(), merge()).expect("import");

        assert_eq!(outcome.stats.folders_imported, 3);
        assert_eq!(outcome.stats.duplicate_folders_skipped, 0);
        assert_eq!(outcome.stats.conversations_imported, 5);
        assert_eq!(outcome.data.folders(), research_tree().folders());
    }

    #[test]
    fn merging_twice_creates_a_second_copy() {
        let payload = export_payload(&research_tree(), "t");
        let once = import_payload(&payload, &FolderData::new(), merge()).expect("first");
        let twice = import_payload(&payload, &once.data, merge()).expect("second");

        assert_eq!(twice.data.folder_count(), 6);
        assert_eq!(twice.stats.duplicate_folders_skipped, 0);
        let research_copies = twice
            .data
            .folders()
            .iter()
            .filter(|f| f.name() == "Research")
            .count();
        assert_eq!(research_copies, 2);
        // Root list is merged, so its single entry is a duplicate the second time.
        assert_eq!(twice.stats.duplicate_conversations_skipped, 1);
        assert_eq!(twice.data.contents(&FolderId::root()).len(), 1);
        twice.data.check_invariants().expect("invariants");
    }

    #[test]
    fn remapped_subtree_keeps_its_shape() {
        let payload = export_payload(&research_tree(), "t");
        let outcome = import_payload(&payload, &research_tree(), merge()).expect("import");
        let data = &outcome.data;

        let new_research = data
            .folders()
            .iter()
            .find(|f| f.name() == "Research" && f.id() != &fid("research"))
            .expect("remapped research");
        let kids = children(data, Some(new_research.id()));
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].name(), "Papers");
        assert_ne!(kids[0].id(), &fid("papers"));

        let copied = data.contents(kids[0].id());
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].conversation_id(), &cid("conv-123"));
        assert_eq!(descendants(data, new_research.id()).len(), 2);
    }

    #[test]
    fn merge_keeps_existing_entry_on_conversation_collision() {
        let mut current = FolderData::new();
        current
            .contents_mut(&FolderId::root())
            .push(conversation("conv-0", "Mine"));

        let payload = export_payload(&research_tree(), "t");
        let outcome = import_payload(&payload, &current, merge()).expect("import");
        let root = outcome.data.contents(&FolderId::root());
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].title(), "Mine");
        assert_eq!(outcome.stats.duplicate_conversations_skipped, 1);
    }

    #[test]
    fn overwrite_reproduces_the_payload() {
        let source = research_tree();
        let payload = export_payload(&source, "t");
        let outcome = import_payload(&payload, &chain(4), overwrite()).expect("import");

        assert_eq!(outcome.data, source);
        assert_eq!(outcome.stats.folders_imported, 3);
    }

    #[test]
    fn overwrite_replaces_the_root_list_too() {
        let mut current = chain(1);
        current
            .contents_mut(&FolderId::root())
            .push(conversation("conv-local", "Only here"));
        let payload = export_payload(&research_tree(), "t");

        let outcome = import_payload(&payload, &current, overwrite()).expect("import");
        let root: Vec<&str> = outcome
            .data
            .contents(&FolderId::root())
            .iter()
            .map(|c| c.conversation_id().as_str())
            .collect();
        assert_eq!(root, vec!["conv-0"]);
        assert_eq!(outcome.data, research_tree());
    }

    #[test]
    fn overwrite_drops_duplicate_entries_within_a_list() {
        let mut payload = export_payload(&research_tree(), "t");
        payload
            .folder_contents
            .get_mut(&fid("archive"))
            .expect("archive list")
            .push(conversation("conv-9", "Old notes again"));

        let outcome = import_payload(&payload, &FolderData::new(), overwrite()).expect("import");
        assert_eq!(outcome.data.contents(&fid("archive")).len(), 2);
        assert_eq!(outcome.stats.duplicate_conversations_skipped, 1);
    }

    #[test]
    fn backup_is_the_pre_import_snapshot() {
        let current = chain(2);
        let payload = export_payload(&research_tree(), "t");
        let outcome = import_payload(
            &payload,
            &current,
            ImportOptions {
                strategy: ImportStrategy::Overwrite,
                create_backup: true,
            },
        )
        .expect("import");
        assert_eq!(outcome.backup, Some(current));
    }

    #[test]
    fn top_down_orders_parents_first() {
        let data = chain(4);
        let mut reversed = data.folders().to_vec();
        reversed.reverse();
        let ids: Vec<&str> = top_down(&reversed)
            .expect("ordered")
            .iter()
            .map(|f| f.id().as_str())
            .collect();
        assert_eq!(ids, vec!["depth-0", "depth-1", "depth-2", "depth-3"]);
    }
}

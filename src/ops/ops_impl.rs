// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Folder/content mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_folder_op(
    data: &mut FolderData,
    op: &FolderOp,
    now: i64,
    delta: &mut DeltaBuilder,
) -> Result<Outcome, ApplyError> {
    match op {
        FolderOp::Create {
            folder_id,
            name,
            parent_id,
        } => {
            if name.trim().is_empty() {
                return Err(ApplyError::EmptyName);
            }
            if folder_id.is_root() {
                return Err(ApplyError::ReservedId {
                    folder_id: folder_id.clone(),
                });
            }
            if data.contains_folder(folder_id) {
                return Err(ApplyError::AlreadyExists {
                    folder_id: folder_id.clone(),
                });
            }
            if let Some(parent_id) = parent_id {
                if !data.contains_folder(parent_id) {
                    return Err(ApplyError::UnknownParent {
                        parent_id: parent_id.clone(),
                    });
                }
            }

            data.push_folder(Folder::new(folder_id.clone(), name, parent_id.clone(), now));
            data.contents_mut(folder_id);
            delta.record_added(folder_id.clone());
            delta.record_contents(folder_id.clone());
            Ok(Outcome::Changed)
        }
        FolderOp::Rename { folder_id, name } => {
            if name.trim().is_empty() {
                tracing::debug!(folder_id = %folder_id, "ignoring rename to an empty name");
                return Ok(Outcome::Skipped(SkipReason::EmptyName));
            }
            let Some(folder) = data.folder_mut(folder_id) else {
                return Ok(Outcome::Skipped(SkipReason::UnknownFolder));
            };
            if folder.name() == name.trim() {
                return Ok(Outcome::Skipped(SkipReason::Unchanged));
            }
            folder.set_name(name, now);
            delta.record_updated(folder_id.clone());
            Ok(Outcome::Changed)
        }
        FolderOp::Delete { folder_id } => {
            if !data.contains_folder(folder_id) {
                return Ok(Outcome::Skipped(SkipReason::UnknownFolder));
            }
            let doomed = descendants(data, folder_id);
            let doomed_set: BTreeSet<FolderId> = doomed.iter().cloned().collect();
            data.remove_folders(&doomed_set);
            for id in doomed {
                delta.record_removed(id);
            }
            Ok(Outcome::Changed)
        }
        FolderOp::TogglePin { folder_id } => {
            let Some(folder) = data.folder_mut(folder_id) else {
                return Ok(Outcome::Skipped(SkipReason::UnknownFolder));
            };
            folder.toggle_pinned(now);
            delta.record_updated(folder_id.clone());
            Ok(Outcome::Changed)
        }
        FolderOp::ToggleExpand { folder_id } => {
            let Some(folder) = data.folder_mut(folder_id) else {
                return Ok(Outcome::Skipped(SkipReason::UnknownFolder));
            };
            folder.toggle_expanded(now);
            delta.record_updated(folder_id.clone());
            Ok(Outcome::Changed)
        }
        FolderOp::Move {
            folder_id,
            new_parent_id,
        } => {
            if let Err(rejection) = check_reparent(data, folder_id, new_parent_id.as_ref()) {
                tracing::warn!(
                    folder_id = %folder_id,
                    new_parent_id = ?new_parent_id.as_ref().map(FolderId::as_str),
                    reason = rejection.as_str(),
                    "rejected folder move"
                );
                return Ok(Outcome::Skipped(SkipReason::Reparent(rejection)));
            }
            let Some(folder) = data.folder_mut(folder_id) else {
                return Ok(Outcome::Skipped(SkipReason::UnknownFolder));
            };
            if folder.parent_id() == new_parent_id.as_ref() {
                return Ok(Outcome::Skipped(SkipReason::Unchanged));
            }
            folder.set_parent_id(new_parent_id.clone(), now);
            delta.record_updated(folder_id.clone());
            Ok(Outcome::Changed)
        }
    }
}

fn apply_content_op(
    data: &mut FolderData,
    op: &ContentOp,
    now: i64,
    delta: &mut DeltaBuilder,
) -> Outcome {
    match op {
        ContentOp::Add {
            folder_id,
            conversation,
            source_folder_id,
        } => {
            if !data.is_content_key(folder_id) {
                tracing::warn!(folder_id = %folder_id, "cannot file conversation into unknown folder");
                return Outcome::Skipped(SkipReason::UnknownFolder);
            }
            if contains_conversation(data, folder_id, conversation.conversation_id()) {
                tracing::debug!(
                    folder_id = %folder_id,
                    conversation_id = %conversation.conversation_id(),
                    "conversation already filed in folder"
                );
                return Outcome::Skipped(SkipReason::AlreadyFiled);
            }

            data.contents_mut(folder_id).push(conversation.clone());
            delta.record_contents(folder_id.clone());

            if let Some(source_folder_id) = source_folder_id.as_ref().filter(|s| *s != folder_id) {
                if remove_entry(data, source_folder_id, conversation.conversation_id()) {
                    delta.record_contents(source_folder_id.clone());
                }
            }
            Outcome::Changed
        }
        ContentOp::Remove {
            folder_id,
            conversation_id,
        } => {
            if remove_entry(data, folder_id, conversation_id) {
                delta.record_contents(folder_id.clone());
                Outcome::Changed
            } else {
                Outcome::Skipped(SkipReason::NotFiled)
            }
        }
        ContentOp::RemoveEverywhere { conversation_id } => {
            let mut touched = Vec::new();
            for (folder_id, entries) in data.folder_contents_mut().iter_mut() {
                let before = entries.len();
                entries.retain(|entry| !entry.matches_loosely(conversation_id));
                if entries.len() != before {
                    touched.push(folder_id.clone());
                }
            }
            if touched.is_empty() {
                return Outcome::Skipped(SkipReason::NotFiled);
            }
            for folder_id in touched {
                tracing::debug!(
                    folder_id = %folder_id,
                    conversation_id = %conversation_id,
                    "removed deleted conversation from folder"
                );
                delta.record_contents(folder_id);
            }
            Outcome::Changed
        }
        ContentOp::RenameEntry {
            folder_id,
            conversation_id,
            title,
        } => {
            let title = title.trim();
            if title.is_empty() {
                return Outcome::Skipped(SkipReason::EmptyName);
            }
            let Some(entry) = data
                .folder_contents_mut()
                .get_mut(folder_id)
                .and_then(|entries| {
                    entries
                        .iter_mut()
                        .find(|e| e.conversation_id() == conversation_id)
                })
            else {
                return Outcome::Skipped(SkipReason::NotFiled);
            };
            if entry.title() == title {
                return Outcome::Skipped(SkipReason::Unchanged);
            }
            entry.set_title(title);
            delta.record_contents(folder_id.clone());
            Outcome::Changed
        }
        ContentOp::UpdateTitleEverywhere {
            conversation_id,
            title,
        } => {
            let mut touched = Vec::new();
            for (folder_id, entries) in data.folder_contents_mut().iter_mut() {
                let mut folder_touched = false;
                for entry in entries
                    .iter_mut()
                    .filter(|e| e.matches_loosely(conversation_id))
                {
                    if entry.title() != title {
                        entry.set_title(title);
                        folder_touched = true;
                    }
                }
                if folder_touched {
                    touched.push(folder_id.clone());
                }
            }
            if touched.is_empty() {
                return Outcome::Skipped(SkipReason::Unchanged);
            }
            for folder_id in touched {
                delta.record_contents(folder_id);
            }
            Outcome::Changed
        }
        ContentOp::Move {
            source_folder_id,
            target_folder_id,
            conversation,
        } => {
            if !data.is_content_key(target_folder_id) {
                return Outcome::Skipped(SkipReason::UnknownFolder);
            }
            if source_folder_id == target_folder_id {
                return Outcome::Skipped(SkipReason::Unchanged);
            }
            let conversation_id = conversation.conversation_id();
            let removed = remove_entry(data, source_folder_id, conversation_id);
            let inserted = !contains_conversation(data, target_folder_id, conversation_id);
            if inserted {
                let mut moved = conversation.clone();
                moved.set_added_at(now);
                data.contents_mut(target_folder_id).push(moved);
                delta.record_contents(target_folder_id.clone());
            }
            if removed {
                delta.record_contents(source_folder_id.clone());
            }
            if removed || inserted {
                Outcome::Changed
            } else {
                Outcome::Skipped(SkipReason::AlreadyFiled)
            }
        }
    }
}

fn contains_conversation(
    data: &FolderData,
    folder_id: &FolderId,
    conversation_id: &ConversationId,
) -> bool {
    data.contents(folder_id)
        .iter()
        .any(|c| c.conversation_id() == conversation_id)
}

fn remove_entry(data: &mut FolderData, folder_id: &FolderId, conversation_id: &ConversationId) -> bool {
    let Some(entries) = data.folder_contents_mut().get_mut(folder_id) else {
        return false;
    };
    let before = entries.len();
    entries.retain(|c| c.conversation_id() != conversation_id);
    entries.len() != before
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::conversation::ConversationReference;
use super::folder::Folder;
use super::folder_data::FolderData;
use super::ids::{ConversationId, FolderId};

pub(crate) fn fid(value: &str) -> FolderId {
    FolderId::new(value).expect("folder id")
}

pub(crate) fn cid(value: &str) -> ConversationId {
    ConversationId::new(value).expect("conversation id")
}

pub(crate) fn conversation(id: &str, title: &str) -> ConversationReference {
    ConversationReference::new(
        cid(id),
        title,
        format!("https://chat.deepseek.com/a/chat/s/{id}"),
        1_000,
    )
}

/// `Research > Papers` plus a sibling `Archive` and one root-level conversation.
///
/// ```text
/// research            (conv-1 "Kickoff")
///   papers            (conv-123 "Intro to X")
/// archive             (conv-123 "Intro to X", conv-9 "Old notes")
/// __root_conversations__  (conv-0 "Loose")
/// ```
pub(crate) fn research_tree() -> FolderData {
    let mut data = FolderData::new();
    data.push_folder(Folder::new(fid("research"), "Research", None, 100));
    data.push_folder(Folder::new(fid("papers"), "Papers", Some(fid("research")), 200));
    data.push_folder(Folder::new(fid("archive"), "Archive", None, 300));

    data.contents_mut(&fid("research"))
        .push(conversation("conv-1", "Kickoff"));
    data.contents_mut(&fid("papers"))
        .push(conversation("conv-123", "Intro to X"));
    data.contents_mut(&fid("archive"))
        .push(conversation("conv-123", "Intro to X"));
    data.contents_mut(&fid("archive"))
        .push(conversation("conv-9", "Old notes"));
    data.contents_mut(&FolderId::root())
        .push(conversation("conv-0", "Loose"));
    data
}

/// A linear chain `depth-0 > depth-1 > ... > depth-{n-1}`.
pub(crate) fn chain(depth: usize) -> FolderData {
    let mut data = FolderData::new();
    let mut parent: Option<FolderId> = None;
    for idx in 0..depth {
        let id = fid(&format!("depth-{idx}"));
        data.push_folder(Folder::new(id.clone(), &format!("Depth {idx}"), parent, idx as i64));
        parent = Some(id);
    }
    data
}

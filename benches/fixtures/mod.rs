// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use convo_folders::model::{ConversationId, ConversationReference, FolderData, FolderId};
use convo_folders::ops::{apply_ops, ContentOp, FolderOp, Op};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    fn shape(self) -> (usize, usize) {
        match self {
            Self::Small => (20, 5),
            Self::Medium => (200, 20),
            Self::Large => (1_000, 50),
        }
    }
}

pub fn folder_id(idx: usize) -> FolderId {
    FolderId::new(format!("bench_folder_{idx:05}")).expect("folder id")
}

pub fn conversation(idx: usize) -> ConversationReference {
    let id = ConversationId::new(format!("bench-conv-{idx:06}")).expect("conversation id");
    let url = format!("https://chat.deepseek.com/a/chat/s/{id}");
    ConversationReference::new(id, format!("Conversation {idx}"), url, idx as i64)
}

/// Four-way fan-out tree; folder `i` hangs under folder `(i - 1) / 4`.
pub fn create_ops(folders: usize) -> Vec<Op> {
    (0..folders)
        .map(|idx| {
            Op::Folder(FolderOp::Create {
                folder_id: folder_id(idx),
                name: format!("Folder {idx}"),
                parent_id: (idx > 0).then(|| folder_id((idx - 1) / 4)),
            })
        })
        .collect()
}

pub fn add_ops(folders: usize, per_folder: usize, offset: usize) -> Vec<Op> {
    let mut ops = Vec::with_capacity(folders * per_folder);
    for folder in 0..folders {
        for slot in 0..per_folder {
            ops.push(Op::Content(ContentOp::Add {
                folder_id: folder_id(folder),
                conversation: conversation(offset + folder * per_folder + slot),
                source_folder_id: None,
            }));
        }
    }
    ops
}

pub fn tree(case: Case) -> FolderData {
    let (folders, per_folder) = case.shape();
    let mut data = FolderData::new();
    apply_ops(&mut data, &create_ops(folders), 0).expect("create folders");
    apply_ops(&mut data, &add_ops(folders, per_folder, 0), 0).expect("add conversations");
    data
}

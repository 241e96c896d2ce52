// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ConversationReference, Folder, FolderData, FolderId};

pub const FORMAT_VERSION: &str = "1.0";

/// Versioned export snapshot. Field order and map key order are stable, so two exports of
/// the same data differ only in `exported_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub format_version: String,
    pub exported_at: String,
    pub folders: Vec<Folder>,
    pub folder_contents: BTreeMap<FolderId, Vec<ConversationReference>>,
}

impl ExportPayload {
    pub fn folder_ids(&self) -> impl Iterator<Item = &FolderId> {
        self.folders.iter().map(Folder::id)
    }

    pub fn conversation_count(&self) -> usize {
        self.folder_contents.values().map(Vec::len).sum()
    }

    pub fn into_data(self) -> FolderData {
        FolderData::from_parts(self.folders, self.folder_contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn export_payload(data: &FolderData, exported_at: impl Into<String>) -> ExportPayload {
    ExportPayload {
        format_version: FORMAT_VERSION.to_owned(),
        exported_at: exported_at.into(),
        folders: data.folders().to_vec(),
        folder_contents: data.folder_contents().clone(),
    }
}

/// Suggested download name, e.g. `convo-folders-2026-03-01.json`.
pub fn export_file_name(exported_at: &str) -> String {
    let date = exported_at.get(..10).unwrap_or(exported_at);
    format!("convo-folders-{date}.json")
}

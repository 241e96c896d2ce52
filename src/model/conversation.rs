// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::ConversationId;

/// Cached pointer to a conversation owned by the host application.
///
/// `title` is a copy of the host's label at filing time and may drift; the reconciler
/// rewrites it when the host label changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReference {
    conversation_id: ConversationId,
    title: String,
    url: String,
    #[serde(default)]
    added_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_gem: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gem_id: Option<String>,
}

impl ConversationReference {
    pub fn new(
        conversation_id: ConversationId,
        title: impl Into<String>,
        url: impl Into<String>,
        added_at: i64,
    ) -> Self {
        Self {
            conversation_id,
            title: title.into(),
            url: url.into(),
            added_at,
            is_gem: None,
            gem_id: None,
        }
    }

    /// Marks the reference as an alternate conversation kind (custom assistant chats).
    pub fn with_variant(mut self, is_gem: bool, gem_id: Option<String>) -> Self {
        self.is_gem = Some(is_gem);
        self.gem_id = gem_id;
        self
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn added_at(&self) -> i64 {
        self.added_at
    }

    pub fn is_gem(&self) -> Option<bool> {
        self.is_gem
    }

    pub fn gem_id(&self) -> Option<&str> {
        self.gem_id.as_deref()
    }

    /// Matches by id, or by the id appearing inside the stored url.
    ///
    /// Older records were filed before ids were normalized, so the url check stays.
    pub fn matches_loosely(&self, conversation_id: &ConversationId) -> bool {
        &self.conversation_id == conversation_id || self.url.contains(conversation_id.as_str())
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    pub(crate) fn set_added_at(&mut self, added_at: i64) {
        self.added_at = added_at;
    }
}

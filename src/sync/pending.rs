// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::identity::ConversationInfo;

/// Single-slot bridge between the click on a row's action button and the host menu that
/// renders afterwards.
///
/// A capture replaces whatever was there. The slot empties when the menu consumes it and
/// when the menu closes without consuming it.
#[derive(Debug, Clone, Default)]
pub struct PendingContext {
    slot: Option<ConversationInfo>,
}

impl PendingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the clicked row; `None` clears a stale capture (row without a usable id).
    pub fn capture(&mut self, info: Option<ConversationInfo>) {
        if let Some(info) = &info {
            tracing::debug!(conversation_id = %info.conversation_id, "captured menu context");
        }
        self.slot = info;
    }

    pub fn consume(&mut self) -> Option<ConversationInfo> {
        self.slot.take()
    }

    pub fn clear_on_menu_close(&mut self) {
        if self.slot.take().is_some() {
            tracing::debug!("menu closed, dropped pending context");
        }
    }

    pub fn peek(&self) -> Option<&ConversationInfo> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

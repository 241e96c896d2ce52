// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::locator::LocatorConfig;

/// Locator chains for every host element the sync layer reads.
///
/// Defaults target the DeepSeek web client. Obfuscated class names rotate on deploy, so the
/// primaries prefer url shapes and the fallbacks get progressively broader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostSelectors {
    pub sidebar_container: LocatorConfig,
    pub conversation_item: LocatorConfig,
    pub conversation_title: LocatorConfig,
    pub scroll_container: LocatorConfig,
    pub menu_content: LocatorConfig,
}

impl Default for HostSelectors {
    fn default() -> Self {
        Self {
            sidebar_container: LocatorConfig::new(
                ".ds-scroll-area",
                &["[class*=\"ds-scroll\"]", "[class*=\"sidebar\"]", "nav", "aside"],
                "sidebar container",
            ),
            conversation_item: LocatorConfig::new(
                "a[href*=\"/a/chat/s/\"]",
                &[
                    "a[href*=\"/chat/\"]",
                    "[class*=\"conversation\"]",
                    "[class*=\"chat-item\"]",
                ],
                "sidebar conversation item",
            ),
            conversation_title: LocatorConfig::new(
                "a[href*=\"/a/chat/s/\"] div",
                &[
                    "a[href*=\"/a/chat/s/\"] span",
                    "[class*=\"title\"]",
                    "[class*=\"name\"]",
                ],
                "conversation title",
            ),
            scroll_container: LocatorConfig::new(
                ".ds-scroll-area",
                &["[class*=\"scroll\"]", "main", "#root"],
                "main scroll container",
            ),
            menu_content: LocatorConfig::new(
                ".ds-dropdown-menu",
                &["[role=\"menu\"]", "[class*=\"dropdown\"]"],
                "conversation action menu",
            ),
        }
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only integration with the host conversation sidebar.
//!
//! The host document is reached through [`ExternalDocument`]; every lookup goes through a
//! [`LocatorConfig`] fallback chain so that markup drift degrades instead of breaking.

pub mod identity;
pub mod locator;
pub mod memory;
pub mod pending;
pub mod poll;
pub mod reconcile;
pub mod registry;
pub mod selectors;

pub use identity::{
    build_conversation_url, canonical_id, extract_conversation_id, identify, is_conversation_route,
    read_conversation_info, ConversationInfo,
};
pub use locator::{
    locate_all, locate_one, resolve, ExternalDocument, InvalidPattern, Located, LocatorConfig,
    MatchLevel,
};
pub use memory::{MemoryDocument, SnapshotNode};
pub use pending::PendingContext;
pub use poll::{wait_until, RetryPolicy};
pub use reconcile::{FolderSink, MoveRequest, MutationBatch, Reconciler, SyncReport};
pub use registry::{sync_folder_drag, RegistryChanges, SubscriptionRegistry};
pub use selectors::HostSelectors;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keeps cached conversation titles in step with the host sidebar and drops entries whose
//! host row was deleted. The host document is only ever read.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::FolderResult;
use crate::model::{ConversationId, ConversationReference, FolderData, FolderId};
use crate::ops::{apply_ops, ApplyResult, ContentOp, Op};
use crate::time::now_millis;

use super::identity::{canonical_id, extract_title, read_conversation_info, ConversationInfo};
use super::locator::{locate_all, locate_one, self_or_descendants, ExternalDocument};
use super::pending::PendingContext;
use super::poll::{wait_until, RetryPolicy};
use super::registry::SubscriptionRegistry;
use super::selectors::HostSelectors;

/// Where reconciliation sends its mutations.
pub trait FolderSink {
    fn data(&self) -> &FolderData;

    fn apply(&mut self, ops: &[Op]) -> FolderResult<ApplyResult>;
}

/// Bare in-memory sink: applies without persisting or rendering.
impl FolderSink for FolderData {
    fn data(&self) -> &FolderData {
        self
    }

    fn apply(&mut self, ops: &[Op]) -> FolderResult<ApplyResult> {
        Ok(apply_ops(self, ops, now_millis())?)
    }
}

/// One batched structural-change notification from the host document.
#[derive(Debug, Clone)]
pub struct MutationBatch<N> {
    pub added: Vec<N>,
    pub removed: Vec<N>,
}

impl<N> Default for MutationBatch<N> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows tracked for the first time.
    pub rows_indexed: usize,
    /// Rows seen without an href id; never tracked.
    pub rows_unidentified: usize,
    pub titles_updated: usize,
    pub conversations_removed: usize,
}

impl SyncReport {
    /// Whether the pass wrote anything to the tree.
    pub fn mutated(&self) -> bool {
        self.titles_updated > 0 || self.conversations_removed > 0
    }
}

/// A "move to folder" request built from the pending menu context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub conversation: ConversationInfo,
}

pub struct Reconciler {
    selectors: HostSelectors,
    base_url: String,
    menu_retry: RetryPolicy,
    tracked: SubscriptionRegistry<ConversationId>,
    pending: PendingContext,
}

impl Reconciler {
    pub fn new(selectors: HostSelectors, base_url: impl Into<String>, menu_retry: RetryPolicy) -> Self {
        Self {
            selectors,
            base_url: base_url.into(),
            menu_retry,
            tracked: SubscriptionRegistry::new(),
            pending: PendingContext::new(),
        }
    }

    pub fn selectors(&self) -> &HostSelectors {
        &self.selectors
    }

    /// Host rows currently indexed (made draggable).
    pub fn tracked(&self) -> &SubscriptionRegistry<ConversationId> {
        &self.tracked
    }

    pub fn pending(&self) -> &PendingContext {
        &self.pending
    }

    /// Current host label for a conversation, if its row can be found.
    pub fn host_title<D: ExternalDocument>(
        &self,
        doc: &D,
        conversation_id: &ConversationId,
    ) -> Option<String> {
        locate_all(doc, &self.selectors.conversation_item, None)
            .into_iter()
            .find(|row| {
                doc.attribute(row, "href")
                    .is_some_and(|href| href.contains(conversation_id.as_str()))
            })
            .and_then(|row| extract_title(doc, &self.selectors, &row))
    }

    /// First-render resync of one cached entry. Returns the title to display: the host label
    /// when found, else the cached one. Writes only when the two differ.
    pub fn resync_title<D: ExternalDocument, S: FolderSink>(
        &mut self,
        doc: &D,
        sink: &mut S,
        entry: &ConversationReference,
    ) -> FolderResult<String> {
        let Some(host_title) = self.host_title(doc, entry.conversation_id()) else {
            return Ok(entry.title().to_owned());
        };
        if host_title != entry.title() {
            tracing::debug!(
                conversation_id = %entry.conversation_id(),
                title = %host_title,
                "title drifted, updating cached copies"
            );
            sink.apply(&[Op::Content(ContentOp::UpdateTitleEverywhere {
                conversation_id: entry.conversation_id().clone(),
                title: host_title.clone(),
            })])?;
        }
        Ok(host_title)
    }

    /// Handles one structural-change batch: new rows are indexed, removed rows purge their
    /// conversation from every folder.
    pub fn on_structural_change<D: ExternalDocument, S: FolderSink>(
        &mut self,
        doc: &D,
        sink: &mut S,
        batch: &MutationBatch<D::Node>,
    ) -> FolderResult<SyncReport> {
        let mut report = SyncReport::default();

        for node in &batch.added {
            for row in self_or_descendants(doc, &self.selectors.conversation_item, node) {
                self.index_row(doc, &row, &mut report);
            }
        }

        let mut removed: BTreeSet<ConversationId> = BTreeSet::new();
        for node in &batch.removed {
            for row in self_or_descendants(doc, &self.selectors.conversation_item, node) {
                let Some(id) = canonical_id(doc, &row) else {
                    continue;
                };
                self.tracked.detach(&id);
                removed.insert(id);
            }
        }

        if !removed.is_empty() {
            let ops: Vec<Op> = removed
                .into_iter()
                .map(|conversation_id| {
                    tracing::debug!(conversation_id = %conversation_id, "host row deleted");
                    Op::Content(ContentOp::RemoveEverywhere { conversation_id })
                })
                .collect();
            let result = sink.apply(&ops)?;
            report.conversations_removed = result.applied;
        }

        Ok(report)
    }

    /// Indexes every visible row and resyncs every drifted title in one batch.
    ///
    /// Entries whose row is not visible are left alone: the host sidebar loads lazily, so
    /// absence is not deletion.
    pub fn full_pass<D: ExternalDocument, S: FolderSink>(
        &mut self,
        doc: &D,
        sink: &mut S,
    ) -> FolderResult<SyncReport> {
        let mut report = SyncReport::default();
        let mut seen = BTreeSet::new();
        let mut ops = Vec::new();

        for row in locate_all(doc, &self.selectors.conversation_item, None) {
            let Some(id) = self.index_row(doc, &row, &mut report) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(title) = extract_title(doc, &self.selectors, &row) else {
                continue;
            };
            let drifted = sink
                .data()
                .folder_contents()
                .values()
                .flatten()
                .any(|entry| entry.matches_loosely(&id) && entry.title() != title);
            if drifted {
                ops.push(Op::Content(ContentOp::UpdateTitleEverywhere {
                    conversation_id: id,
                    title,
                }));
            }
        }

        if !ops.is_empty() {
            report.titles_updated = sink.apply(&ops)?.applied;
        }
        tracing::debug!(
            indexed = report.rows_indexed,
            unidentified = report.rows_unidentified,
            titles_updated = report.titles_updated,
            "full reconcile pass"
        );
        Ok(report)
    }

    /// Tracks a row by its href id. Rows without one are counted and left untracked: a
    /// fallback id changes on every read and could never be detached again.
    fn index_row<D: ExternalDocument>(
        &mut self,
        doc: &D,
        row: &D::Node,
        report: &mut SyncReport,
    ) -> Option<ConversationId> {
        let Some(id) = canonical_id(doc, row) else {
            report.rows_unidentified += 1;
            return None;
        };
        if self.tracked.attach(id.clone()) {
            report.rows_indexed += 1;
        }
        Some(id)
    }

    /// The row's action button was clicked; remember the row for the menu that follows.
    pub fn on_action_button_click<D: ExternalDocument>(&mut self, doc: &D, row: &D::Node) {
        let info = read_conversation_info(doc, &self.selectors, &self.base_url, row);
        if info.is_none() {
            tracing::warn!("clicked row has no usable conversation id");
        }
        self.pending.capture(info);
    }

    /// The host menu rendered. Builds a move request only when a click was captured.
    pub fn on_menu_opened(&mut self) -> Option<MoveRequest> {
        let conversation = self.pending.consume()?;
        Some(MoveRequest { conversation })
    }

    pub fn on_menu_closed(&mut self) {
        self.pending.clear_on_menu_close();
    }

    /// Waits for the sidebar container, probing every `interval`. Never gives up on its own;
    /// dropping the future abandons the wait.
    pub async fn await_container<D: ExternalDocument>(
        &self,
        doc: &D,
        interval: Duration,
    ) -> D::Node {
        wait_until(interval, || {
            locate_one(doc, &self.selectors.sidebar_container, None)
        })
        .await
    }

    /// Bounded wait for the host menu, for when the open notification was missed.
    pub async fn await_menu<D: ExternalDocument>(&self, doc: &D) -> Option<D::Node> {
        self.menu_retry
            .run(|| locate_one(doc, &self.selectors.menu_content, None))
            .await
    }

    /// Files the requested conversation into `target`. With a `source` this is a move and
    /// the target copy gets a fresh `added_at`.
    pub fn move_to_folder<S: FolderSink>(
        &self,
        sink: &mut S,
        request: MoveRequest,
        target: FolderId,
        source: Option<FolderId>,
    ) -> FolderResult<ApplyResult> {
        let now = now_millis();
        let conversation = request.conversation.into_reference(now);
        let op = match source {
            Some(source_folder_id) => ContentOp::Move {
                source_folder_id,
                target_folder_id: target,
                conversation,
            },
            None => ContentOp::Add {
                folder_id: target,
                conversation,
                source_folder_id: None,
            },
        };
        sink.apply(&[Op::Content(op)])
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The single owner of the live folder tree.
//!
//! Every mutation runs to completion as one unit: apply to a candidate, persist the whole
//! record, swap the candidate in, request a render. A failure at any step leaves both the
//! in-memory tree and the persisted record as they were.

use std::future::Future;
use std::sync::Arc;

use crate::error::{FolderError, FolderResult, StoreError, TransferKind};
use crate::model::{ConversationId, ConversationReference, FolderData, FolderId};
use crate::ops::{apply_ops_in_place, ApplyResult, ContentOp, Delta, FolderOp, Op};
use crate::sync::{sync_folder_drag, FolderSink, SubscriptionRegistry};
use crate::time::{now_millis, now_rfc3339};
use crate::transfer::{
    export_file_name, export_payload, import_payload, parse_payload, ExportPayload,
    ImportOptions, ImportStats, ImportStrategy, TransferLocks,
};

use super::blob::BlobStore;

/// Receives a render request after every committed change.
pub trait RenderSink {
    fn render(&mut self, data: &FolderData, delta: &Delta);
}

/// Renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRender;

impl RenderSink for NoRender {
    fn render(&mut self, _data: &FolderData, _delta: &Delta) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Sends notices to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::error!(message = %notice.message, "notice"),
        }
    }
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

pub struct TreeStore<B: BlobStore> {
    blobs: B,
    storage_key: String,
    backup_key: String,
    data: FolderData,
    locks: Arc<TransferLocks>,
    drag_handles: SubscriptionRegistry<FolderId>,
    renderer: Box<dyn RenderSink>,
    notifier: Box<dyn Notifier>,
}

impl<B: BlobStore> TreeStore<B> {
    /// Loads the record under `storage_key`. A missing record starts empty. An inconsistent
    /// one is repaired in memory, an unreadable one is replaced with empty data; either way the
    /// raw record is first copied to [`recovery_key`] so the next write cannot lose it.
    pub fn open(
        mut blobs: B,
        storage_key: impl Into<String>,
        backup_key: impl Into<String>,
    ) -> FolderResult<Self> {
        let storage_key = storage_key.into();
        let data = match blobs.read(&storage_key)? {
            None => FolderData::new(),
            Some(raw) => {
                let (data, clean) = decode_record(&storage_key, &raw);
                if !clean {
                    let recovery = recovery_key(&storage_key);
                    blobs.write(&recovery, &raw)?;
                    tracing::warn!(key = %recovery, "kept a copy of the record as loaded");
                }
                data
            }
        };
        tracing::debug!(
            key = %storage_key,
            folders = data.folder_count(),
            conversations = data.conversation_count(),
            "loaded folder record"
        );
        let mut drag_handles = SubscriptionRegistry::new();
        sync_folder_drag(&mut drag_handles, &data);
        Ok(Self {
            blobs,
            storage_key,
            backup_key: backup_key.into(),
            data,
            locks: Arc::new(TransferLocks::new()),
            drag_handles,
            renderer: Box::new(NoRender),
            notifier: Box::new(LogNotifier),
        })
    }

    pub fn with_renderer(mut self, renderer: impl RenderSink + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn data(&self) -> &FolderData {
        &self.data
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Folders that currently carry a drag handle. Only leaves do.
    pub fn drag_handles(&self) -> &SubscriptionRegistry<FolderId> {
        &self.drag_handles
    }

    /// Shared in-flight flags; hold a ticket across file I/O to keep a second transfer out.
    pub fn transfer_locks(&self) -> Arc<TransferLocks> {
        Arc::clone(&self.locks)
    }

    /// Applies a batch to one copy of the tree. Nothing is persisted or rendered when the
    /// batch changed nothing.
    pub fn apply(&mut self, ops: &[Op]) -> FolderResult<ApplyResult> {
        let mut candidate = self.data.clone();
        let result = match apply_ops_in_place(&mut candidate, ops, now_millis()) {
            Ok(result) => result,
            Err(err) => return Err(self.report(err.into())),
        };
        if result.changed() {
            if let Err(err) = persist(&mut self.blobs, &self.storage_key, &candidate) {
                return Err(self.report(err));
            }
            self.commit(candidate, &result.delta);
        }
        Ok(result)
    }

    /// Swaps in already-persisted data, then refreshes drag handles and renders.
    fn commit(&mut self, data: FolderData, delta: &Delta) {
        self.data = data;
        let changes = sync_folder_drag(&mut self.drag_handles, &self.data);
        if !changes.is_empty() {
            tracing::debug!(
                attached = changes.attached.len(),
                detached = changes.detached.len(),
                "drag handles updated"
            );
        }
        self.renderer.render(&self.data, delta);
    }

    fn report(&mut self, err: FolderError) -> FolderError {
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }

    fn folder_op(&mut self, op: FolderOp) -> FolderResult<ApplyResult> {
        self.apply(&[Op::Folder(op)])
    }

    fn content_op(&mut self, op: ContentOp) -> FolderResult<ApplyResult> {
        self.apply(&[Op::Content(op)])
    }

    /// Creates a folder under a freshly generated id.
    pub fn create_folder(&mut self, name: &str, parent_id: Option<FolderId>) -> FolderResult<FolderId> {
        let folder_id = FolderId::generate();
        self.folder_op(FolderOp::Create {
            folder_id: folder_id.clone(),
            name: name.to_owned(),
            parent_id,
        })?;
        Ok(folder_id)
    }

    pub fn rename_folder(&mut self, folder_id: FolderId, name: &str) -> FolderResult<ApplyResult> {
        self.folder_op(FolderOp::Rename {
            folder_id,
            name: name.to_owned(),
        })
    }

    pub fn delete_folder(&mut self, folder_id: FolderId) -> FolderResult<ApplyResult> {
        self.folder_op(FolderOp::Delete { folder_id })
    }

    pub fn toggle_pin(&mut self, folder_id: FolderId) -> FolderResult<ApplyResult> {
        self.folder_op(FolderOp::TogglePin { folder_id })
    }

    pub fn toggle_expand(&mut self, folder_id: FolderId) -> FolderResult<ApplyResult> {
        self.folder_op(FolderOp::ToggleExpand { folder_id })
    }

    /// A refused move is not an error; see [`ApplyResult::reparent_rejection`].
    pub fn move_folder(
        &mut self,
        folder_id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> FolderResult<ApplyResult> {
        self.folder_op(FolderOp::Move {
            folder_id,
            new_parent_id,
        })
    }

    pub fn move_folder_to_root(&mut self, folder_id: FolderId) -> FolderResult<ApplyResult> {
        self.move_folder(folder_id, None)
    }

    pub fn add_conversation(
        &mut self,
        folder_id: FolderId,
        conversation: ConversationReference,
        source_folder_id: Option<FolderId>,
    ) -> FolderResult<ApplyResult> {
        self.content_op(ContentOp::Add {
            folder_id,
            conversation,
            source_folder_id,
        })
    }

    pub fn remove_conversation(
        &mut self,
        folder_id: FolderId,
        conversation_id: ConversationId,
    ) -> FolderResult<ApplyResult> {
        self.content_op(ContentOp::Remove {
            folder_id,
            conversation_id,
        })
    }

    pub fn remove_conversation_everywhere(
        &mut self,
        conversation_id: ConversationId,
    ) -> FolderResult<ApplyResult> {
        self.content_op(ContentOp::RemoveEverywhere { conversation_id })
    }

    /// `true` when at least one cached title changed.
    pub fn update_conversation_title(
        &mut self,
        conversation_id: ConversationId,
        title: &str,
    ) -> FolderResult<bool> {
        let result = self.content_op(ContentOp::UpdateTitleEverywhere {
            conversation_id,
            title: title.to_owned(),
        })?;
        Ok(result.changed())
    }

    pub fn rename_conversation(
        &mut self,
        folder_id: FolderId,
        conversation_id: ConversationId,
        title: &str,
    ) -> FolderResult<ApplyResult> {
        self.content_op(ContentOp::RenameEntry {
            folder_id,
            conversation_id,
            title: title.to_owned(),
        })
    }

    pub fn move_conversation(
        &mut self,
        source_folder_id: FolderId,
        target_folder_id: FolderId,
        conversation: ConversationReference,
    ) -> FolderResult<ApplyResult> {
        self.content_op(ContentOp::Move {
            source_folder_id,
            target_folder_id,
            conversation,
        })
    }

    /// Snapshot of the live tree, stamped now.
    pub fn export(&mut self) -> FolderResult<ExportPayload> {
        let locks = self.transfer_locks();
        let _ticket = match locks.try_begin(TransferKind::Export) {
            Ok(ticket) => ticket,
            Err(err) => return Err(self.report(err)),
        };
        Ok(self.snapshot())
    }

    fn snapshot(&self) -> ExportPayload {
        let payload = export_payload(&self.data, now_rfc3339());
        tracing::info!(
            folders = payload.folders.len(),
            conversations = payload.conversation_count(),
            "exported folder tree"
        );
        payload
    }

    /// Exports through `write(file_name, json)`, holding the export flag across the write.
    pub async fn export_with<F, Fut>(&mut self, write: F) -> FolderResult<String>
    where
        F: FnOnce(String, String) -> Fut,
        Fut: Future<Output = Result<(), StoreError>>,
    {
        let locks = self.transfer_locks();
        let _ticket = match locks.try_begin(TransferKind::Export) {
            Ok(ticket) => ticket,
            Err(err) => return Err(self.report(err)),
        };
        let payload = self.snapshot();
        let file_name = export_file_name(&payload.exported_at);
        let json = match payload.to_json_pretty() {
            Ok(json) => json,
            Err(source) => {
                let err = StoreError::Json {
                    key: file_name,
                    source,
                };
                return Err(self.report(err.into()));
            }
        };
        if let Err(err) = write(file_name.clone(), json).await {
            return Err(self.report(err.into()));
        }
        self.notifier.notify(Notice::success(format!(
            "Exported {} folders to {file_name}",
            payload.folders.len()
        )));
        Ok(file_name)
    }

    /// Validates, computes and commits an import from raw JSON.
    pub fn import_json(&mut self, raw: &str, options: ImportOptions) -> FolderResult<ImportStats> {
        let locks = self.transfer_locks();
        let _ticket = match locks.try_begin(TransferKind::Import) {
            Ok(ticket) => ticket,
            Err(err) => return Err(self.report(err)),
        };
        self.import_locked(raw, options)
    }

    /// Like [`TreeStore::import_json`], holding the import flag while `read` runs.
    pub async fn import_from<Fut>(&mut self, read: Fut, options: ImportOptions) -> FolderResult<ImportStats>
    where
        Fut: Future<Output = Result<String, StoreError>>,
    {
        let locks = self.transfer_locks();
        let _ticket = match locks.try_begin(TransferKind::Import) {
            Ok(ticket) => ticket,
            Err(err) => return Err(self.report(err)),
        };
        let raw = match read.await {
            Ok(raw) => raw,
            Err(err) => return Err(self.report(err.into())),
        };
        self.import_locked(&raw, options)
    }

    fn import_locked(&mut self, raw: &str, options: ImportOptions) -> FolderResult<ImportStats> {
        let outcome = match parse_payload(raw)
            .and_then(|payload| import_payload(&payload, &self.data, options))
        {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.report(err.into())),
        };

        if let Some(backup) = &outcome.backup {
            if let Err(err) = persist(&mut self.blobs, &self.backup_key, backup) {
                return Err(self.report(err));
            }
            tracing::info!(key = %self.backup_key, "wrote pre-import backup");
        }
        if let Err(err) = persist(&mut self.blobs, &self.storage_key, &outcome.data) {
            return Err(self.report(err));
        }

        let delta = Delta {
            added_folders: outcome.data.folders().iter().map(|f| f.id().clone()).collect(),
            touched_contents: outcome.data.folder_contents().keys().cloned().collect(),
            ..Delta::default()
        };
        self.commit(outcome.data, &delta);

        let stats = outcome.stats;
        let mut message = format!(
            "Imported {} folders and {} conversations",
            stats.folders_imported, stats.conversations_imported
        );
        if options.strategy == ImportStrategy::Merge && stats.duplicate_conversations_skipped > 0 {
            message.push_str(&format!(
                ", skipped {} duplicates",
                stats.duplicate_conversations_skipped
            ));
        }
        self.notifier.notify(Notice::success(message));
        Ok(stats)
    }

    /// The backup record written by the last import, if any.
    pub fn read_backup(&self) -> FolderResult<Option<FolderData>> {
        let Some(raw) = self.blobs.read(&self.backup_key)? else {
            return Ok(None);
        };
        let data = serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            key: self.backup_key.clone(),
            source,
        })?;
        Ok(Some(data))
    }
}

fn persist<B: BlobStore>(blobs: &mut B, key: &str, data: &FolderData) -> FolderResult<()> {
    let raw = serde_json::to_string(data).map_err(|source| StoreError::Json {
        key: key.to_owned(),
        source,
    })?;
    blobs.write(key, &raw)?;
    Ok(())
}

/// Key holding the raw record whenever loading had to change it.
pub fn recovery_key(storage_key: &str) -> String {
    format!("{storage_key}.recovered")
}

/// Decoded data plus whether it matches the raw record exactly.
fn decode_record(key: &str, raw: &str) -> (FolderData, bool) {
    match serde_json::from_str::<FolderData>(raw) {
        Ok(mut data) => {
            let repairs = data.repair();
            for violation in &repairs {
                tracing::warn!(key, %violation, "repaired persisted record");
            }
            (data, repairs.is_empty())
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "persisted record is unreadable, starting empty");
            (FolderData::new(), false)
        }
    }
}

impl<B: BlobStore> FolderSink for TreeStore<B> {
    fn data(&self) -> &FolderData {
        &self.data
    }

    fn apply(&mut self, ops: &[Op]) -> FolderResult<ApplyResult> {
        TreeStore::apply(self, ops)
    }
}

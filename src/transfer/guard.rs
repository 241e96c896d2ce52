// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FolderError, TransferKind};

/// At most one import and one export in flight; a second caller is turned away, not queued.
#[derive(Debug, Default)]
pub struct TransferLocks {
    import: AtomicBool,
    export: AtomicBool,
}

impl TransferLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, kind: TransferKind) -> &AtomicBool {
        match kind {
            TransferKind::Import => &self.import,
            TransferKind::Export => &self.export,
        }
    }

    pub fn try_begin(&self, kind: TransferKind) -> Result<TransferTicket<'_>, FolderError> {
        let flag = self.flag(kind);
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!(operation = %kind, "rejected concurrent transfer");
            return Err(FolderError::InProgress { operation: kind });
        }
        Ok(TransferTicket { flag, kind })
    }

    pub fn is_busy(&self, kind: TransferKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }
}

/// Holds the flag until dropped, including on early error returns.
#[derive(Debug)]
pub struct TransferTicket<'a> {
    flag: &'a AtomicBool,
    kind: TransferKind,
}

impl TransferTicket<'_> {
    pub fn kind(&self) -> TransferKind {
        self.kind
    }
}

impl Drop for TransferTicket<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

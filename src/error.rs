// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Error taxonomy shared by the mutation, transfer, sync and store layers.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::FolderId;

pub type FolderResult<T> = Result<T, FolderError>;

/// Which half of the transfer subsystem an error or lock refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Import,
    Export,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => f.write_str("import"),
            Self::Export => f.write_str("export"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("invalid import file: {0}")]
    Schema(#[from] SchemaError),

    #[error("cannot move folder {folder_id}: {reason}")]
    Cycle {
        folder_id: FolderId,
        reason: &'static str,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{operation} already in progress")]
    InProgress { operation: TransferKind },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FolderError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Errors that must stop a caller before any state changes.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Cycle { .. })
    }
}

/// First structural violation found in an untrusted payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("json error for record {key:?}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage key {key:?}")]
    InvalidKey { key: String },
}

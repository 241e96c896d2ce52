// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Import/export of versioned snapshots.

mod guard;
mod merge;
mod payload;
mod validate;

pub use guard::{TransferLocks, TransferTicket};
pub use merge::{import_payload, ImportOptions, ImportOutcome, ImportStats, ImportStrategy};
pub use payload::{export_file_name, export_payload, ExportPayload, FORMAT_VERSION};
pub use validate::{parse_payload, validate_payload};

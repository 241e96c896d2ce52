// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural validation of an untrusted import document.
//!
//! Checks run in document order and stop at the first violation.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::model::{ConversationReference, Folder, FolderId};

use super::payload::ExportPayload;

const SUPPORTED_MAJOR: &str = "1";

pub fn parse_payload(raw: &str) -> Result<ExportPayload, SchemaError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| SchemaError::new("$", format!("not valid JSON: {err}")))?;
    validate_payload(&value)
}

pub fn validate_payload(raw: &Value) -> Result<ExportPayload, SchemaError> {
    let root = raw
        .as_object()
        .ok_or_else(|| SchemaError::new("$", "expected an object"))?;

    let format_version = required_str(root, "formatVersion")?;
    if format_version.split('.').next() != Some(SUPPORTED_MAJOR) {
        return Err(SchemaError::new(
            "formatVersion",
            format!("unsupported format version {format_version:?}"),
        ));
    }
    let exported_at = required_str(root, "exportedAt")?;

    let folders = validate_folders(root)?;
    let folder_contents = validate_contents(root, &folders)?;

    Ok(ExportPayload {
        format_version: format_version.to_owned(),
        exported_at: exported_at.to_owned(),
        folders,
        folder_contents,
    })
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, SchemaError> {
    match obj.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(SchemaError::new(key, "expected a string")),
        None => Err(SchemaError::new(key, "missing required field")),
    }
}

fn decode<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T, SchemaError> {
    serde_json::from_value(value.clone()).map_err(|err| SchemaError::new(path, err.to_string()))
}

fn validate_folders(root: &Map<String, Value>) -> Result<Vec<Folder>, SchemaError> {
    let entries = match root.get("folders") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(SchemaError::new("folders", "expected an array")),
        None => return Err(SchemaError::new("folders", "missing required field")),
    };

    let mut folders = Vec::with_capacity(entries.len());
    let mut seen = BTreeSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        let path = format!("folders[{idx}]");
        let obj = entry
            .as_object()
            .ok_or_else(|| SchemaError::new(path.clone(), "expected an object"))?;
        match obj.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(SchemaError::new(format!("{path}.name"), "must not be empty"))
            }
            _ => {
                return Err(SchemaError::new(
                    format!("{path}.name"),
                    "missing or not a string",
                ))
            }
        }
        let folder: Folder = decode(entry, &path)?;
        if folder.id().is_root() {
            return Err(SchemaError::new(
                format!("{path}.id"),
                "reserved root id cannot name a folder",
            ));
        }
        if !seen.insert(folder.id().clone()) {
            return Err(SchemaError::new(
                format!("{path}.id"),
                format!("duplicate folder id {:?}", folder.id().as_str()),
            ));
        }
        folders.push(folder);
    }

    for (idx, folder) in folders.iter().enumerate() {
        if let Some(parent_id) = folder.parent_id() {
            if !seen.contains(parent_id) {
                return Err(SchemaError::new(
                    format!("folders[{idx}].parentId"),
                    format!("unknown parent folder {:?}", parent_id.as_str()),
                ));
            }
        }
    }

    check_acyclic(&folders)?;
    Ok(folders)
}

fn check_acyclic(folders: &[Folder]) -> Result<(), SchemaError> {
    let parents: BTreeMap<&FolderId, &FolderId> = folders
        .iter()
        .filter_map(|f| f.parent_id().map(|parent| (f.id(), parent)))
        .collect();

    for (idx, folder) in folders.iter().enumerate() {
        let mut current = parents.get(folder.id()).copied();
        let mut steps = 0usize;
        while let Some(parent_id) = current {
            if parent_id == folder.id() || steps > folders.len() {
                return Err(SchemaError::new(
                    format!("folders[{idx}].parentId"),
                    format!("folder {:?} is its own ancestor", folder.id().as_str()),
                ));
            }
            steps += 1;
            current = parents.get(parent_id).copied();
        }
    }
    Ok(())
}

fn validate_contents(
    root: &Map<String, Value>,
    folders: &[Folder],
) -> Result<BTreeMap<FolderId, Vec<ConversationReference>>, SchemaError> {
    let lists = match root.get("folderContents") {
        Some(Value::Object(lists)) => lists,
        Some(_) => return Err(SchemaError::new("folderContents", "expected an object")),
        None => return Err(SchemaError::new("folderContents", "missing required field")),
    };

    let known: BTreeSet<&str> = folders.iter().map(|f| f.id().as_str()).collect();
    let mut out = BTreeMap::new();
    for (key, entries) in lists {
        let path = format!("folderContents[{key:?}]");
        let folder_id = FolderId::new(key.as_str())
            .map_err(|err| SchemaError::new(path.clone(), err.to_string()))?;
        if !folder_id.is_root() && !known.contains(key.as_str()) {
            return Err(SchemaError::new(
                path,
                "key does not name a folder in this file",
            ));
        }
        let Value::Array(entries) = entries else {
            return Err(SchemaError::new(path, "expected an array"));
        };
        let mut refs = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            refs.push(decode::<ConversationReference>(entry, &format!("{path}[{idx}]"))?);
        }
        out.insert(folder_id, refs);
    }
    Ok(out)
}

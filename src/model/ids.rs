// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reserved content-list key for conversations filed outside any user folder.
pub const ROOT_CONVERSATIONS_ID: &str = "__root_conversations__";

/// An opaque string identifier.
///
/// Ids are never interpreted; the only enforced rule is that they are non-empty once
/// surrounding whitespace is ignored. The tag parameter keeps folder ids and conversation
/// ids from being mixed up at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.trim().is_empty() {
        return Err(IdError::Empty);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FolderIdTag {}
pub type FolderId = Id<FolderIdTag>;

impl FolderId {
    /// The pseudo-folder that holds root-level conversations.
    pub fn root() -> Self {
        Self {
            value: ROOT_CONVERSATIONS_ID.to_owned(),
            _marker: PhantomData,
        }
    }

    pub fn is_root(&self) -> bool {
        self.value == ROOT_CONVERSATIONS_ID
    }

    /// Allocates a fresh, globally unique folder id.
    pub fn generate() -> Self {
        Self {
            value: format!("folder_{}", uuid::Uuid::new_v4().simple()),
            _marker: PhantomData,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversationIdTag {}
pub type ConversationId = Id<ConversationIdTag>;

impl ConversationId {
    /// A `conv_`-prefixed id built from a digest; never empty.
    pub(crate) fn from_digest(hex: &str) -> Self {
        Self {
            value: format!("conv_{hex}"),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FolderId, Id, IdError};

    #[test]
    fn id_rejects_empty() {
        let result: Result<Id<()>, _> = Id::new("");
        assert_eq!(result, Err(IdError::Empty));
    }

    #[test]
    fn id_rejects_whitespace_only() {
        let result: Result<Id<()>, _> = Id::new("   ");
        assert_eq!(result, Err(IdError::Empty));
    }

    #[test]
    fn generated_folder_ids_are_distinct_and_not_root() {
        let a = FolderId::generate();
        let b = FolderId::generate();
        assert_ne!(a, b);
        assert!(!a.is_root());
        assert!(FolderId::root().is_root());
    }

    #[test]
    fn id_deserialize_rejects_empty_string() {
        let result: Result<FolderId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}

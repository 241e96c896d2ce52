// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layered lookups against the host document: one primary pattern, then ordered fallbacks.
//!
//! The host ships obfuscated class names that change between deployments, so every lookup
//! is a chain. Hitting a fallback is logged at `warn` to surface drift; exhausting the chain
//! is soft (`None` / empty) and never an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported pattern {pattern:?}")]
pub struct InvalidPattern {
    pub pattern: String,
}

/// Read-only view of the host application's live document.
///
/// Nothing in this crate writes through this trait.
pub trait ExternalDocument {
    type Node: Clone;

    /// Nodes under `scope` (the whole document when `None`) matching `pattern`, in document
    /// order.
    fn query_all(
        &self,
        scope: Option<&Self::Node>,
        pattern: &str,
    ) -> Result<Vec<Self::Node>, InvalidPattern>;

    /// Whether `node` itself matches `pattern`.
    fn matches(&self, node: &Self::Node, pattern: &str) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Concatenated text content.
    fn text(&self, node: &Self::Node) -> String;

    /// Position among the parent's children.
    fn sibling_index(&self, node: &Self::Node) -> Option<usize>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorConfig {
    pub primary: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl LocatorConfig {
    pub fn new(primary: &str, fallbacks: &[&str], description: &str) -> Self {
        Self {
            primary: primary.to_owned(),
            fallbacks: fallbacks.iter().map(|f| (*f).to_owned()).collect(),
            description: description.to_owned(),
        }
    }

    /// Primary first, then fallbacks in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Which pattern of the chain produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLevel {
    Primary,
    /// Zero-based index into `fallbacks`.
    Fallback(usize),
}

#[derive(Debug, Clone)]
pub struct Located<N> {
    pub nodes: Vec<N>,
    pub level: MatchLevel,
}

/// Walks the chain and returns the first non-empty match.
pub fn resolve<D: ExternalDocument>(
    doc: &D,
    config: &LocatorConfig,
    scope: Option<&D::Node>,
) -> Option<Located<D::Node>> {
    for (idx, pattern) in config.patterns().enumerate() {
        let nodes = match doc.query_all(scope, pattern) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::debug!(locator = %config.description, error = %err, "skipping pattern");
                continue;
            }
        };
        if nodes.is_empty() {
            continue;
        }
        let level = if idx == 0 {
            MatchLevel::Primary
        } else {
            tracing::warn!(
                locator = %config.description,
                pattern,
                fallback = idx - 1,
                "locator drift: primary pattern failed, using fallback"
            );
            MatchLevel::Fallback(idx - 1)
        };
        return Some(Located { nodes, level });
    }

    tracing::debug!(locator = %config.description, "locator exhausted every pattern");
    None
}

pub fn locate_one<D: ExternalDocument>(
    doc: &D,
    config: &LocatorConfig,
    scope: Option<&D::Node>,
) -> Option<D::Node> {
    resolve(doc, config, scope).and_then(|located| located.nodes.into_iter().next())
}

pub fn locate_all<D: ExternalDocument>(
    doc: &D,
    config: &LocatorConfig,
    scope: Option<&D::Node>,
) -> Vec<D::Node> {
    resolve(doc, config, scope)
        .map(|located| located.nodes)
        .unwrap_or_default()
}

/// `node` itself when it matches the primary pattern, else every match inside it.
pub fn self_or_descendants<D: ExternalDocument>(
    doc: &D,
    config: &LocatorConfig,
    node: &D::Node,
) -> Vec<D::Node> {
    if doc.matches(node, &config.primary) {
        return vec![node.clone()];
    }
    locate_all(doc, config, Some(node))
}

#[cfg(test)]
mod tests {
    use super::{locate_all, locate_one, resolve, ExternalDocument, LocatorConfig, MatchLevel};
    use crate::sync::memory::MemoryDocument;

    fn config() -> LocatorConfig {
        LocatorConfig::new("a.primary", &["!!invalid", "a.backup", "a"], "test item")
    }

    #[test]
    fn primary_wins_when_it_matches() {
        let mut doc = MemoryDocument::new();
        doc.append_link(None, "primary", "/x", "First");
        doc.append_link(None, "backup", "/y", "Second");

        let located = resolve(&doc, &config(), None).expect("match");
        assert_eq!(located.level, MatchLevel::Primary);
        assert_eq!(located.nodes.len(), 1);
    }

    #[test]
    fn invalid_and_empty_levels_fall_through_in_order() {
        let mut doc = MemoryDocument::new();
        doc.append_link(None, "backup", "/y", "Second");
        doc.append_link(None, "other", "/z", "Third");

        let located = resolve(&doc, &config(), None).expect("match");
        assert_eq!(located.level, MatchLevel::Fallback(1));
        assert_eq!(located.nodes.len(), 1);
        assert_eq!(doc.text(&located.nodes[0]), "Second");
    }

    #[test]
    fn exhausted_chain_is_soft() {
        let doc = MemoryDocument::new();
        assert!(locate_one(&doc, &config(), None).is_none());
        assert!(locate_all(&doc, &config(), None).is_empty());
    }

    #[test]
    fn scoped_lookup_stays_inside_scope() {
        let mut doc = MemoryDocument::new();
        let inside = doc.append_link(None, "primary", "/in", "Inside");
        doc.append_link(None, "primary", "/out", "Outside");
        let title_config = LocatorConfig::new("div", &[], "title");

        let title = locate_one(&doc, &title_config, Some(&inside)).expect("title");
        assert_eq!(doc.text(&title), "Inside");
    }
}

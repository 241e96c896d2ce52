// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation identity, urls and titles as read from host rows.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use sha2::{Digest, Sha256};

use crate::model::{ConversationId, ConversationReference};

use super::locator::{locate_one, ExternalDocument};
use super::selectors::HostSelectors;

pub const UNTITLED: &str = "Untitled";
const FALLBACK_TITLE_CHARS: usize = 80;
const CONVERSATION_SEGMENT: &str = "/a/chat/s/";

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .ok()
    })
    .as_ref()
}

fn conversation_path() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&PATTERN, r"/a/chat/s/([a-f0-9-]{36})")
}

fn conversation_route() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&PATTERN, r"^/a/chat/s/[a-f0-9-]{36}")
}

/// The canonical id embedded in a conversation href or url.
pub fn extract_conversation_id(href: &str) -> Option<ConversationId> {
    let captures = conversation_path()?.captures(href)?;
    ConversationId::new(captures.get(1)?.as_str()).ok()
}

pub fn is_conversation_route(path: &str) -> bool {
    conversation_route().is_some_and(|re| re.is_match(path))
}

pub fn build_conversation_url(base_url: &str, conversation_id: &ConversationId) -> String {
    format!(
        "{}{CONVERSATION_SEGMENT}{conversation_id}",
        base_url.trim_end_matches('/')
    )
}

/// Relative hrefs are resolved against `base_url`; absolute ones pass through.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// A non-persistent id for rows whose href does not carry one.
///
/// Salted with randomness and the clock, so the same row gets a different id on every
/// call. Entries filed under such an id cannot be matched again later.
pub fn fallback_conversation_id(text: &str, index: usize, now: i64) -> ConversationId {
    let salt: u64 = rand::random();
    let digest = Sha256::digest(format!("{text}_{index}_{salt}_{now}").as_bytes());
    let hex = format!("{digest:x}");
    let id = ConversationId::from_digest(hex.get(..12).unwrap_or(&hex));
    tracing::warn!(conversation_id = %id, "no id in conversation href, using unstable fallback");
    id
}

/// The id carried by the row's href, if any. Only these ids are stable across passes.
pub fn canonical_id<D: ExternalDocument>(doc: &D, node: &D::Node) -> Option<ConversationId> {
    doc.attribute(node, "href")
        .and_then(|href| extract_conversation_id(&href))
}

/// Stable id from the row's href, or an unstable fallback derived from its text and position.
pub fn identify<D: ExternalDocument>(doc: &D, node: &D::Node, now: i64) -> ConversationId {
    if let Some(id) = canonical_id(doc, node) {
        return id;
    }
    let text = doc.text(node);
    let index = doc.sibling_index(node).unwrap_or(0);
    fallback_conversation_id(text.trim(), index, now)
}

/// Title locator, then the row's own text, then its aria-label.
pub fn extract_title<D: ExternalDocument>(
    doc: &D,
    selectors: &HostSelectors,
    node: &D::Node,
) -> Option<String> {
    let from_locator = locate_one(doc, &selectors.conversation_title, Some(node))
        .map(|title| doc.text(&title).trim().to_owned())
        .filter(|t| !t.is_empty());
    if from_locator.is_some() {
        return from_locator;
    }
    let text = doc.text(node).trim().to_owned();
    if !text.is_empty() {
        return Some(text);
    }
    non_empty_attribute(doc, node, "aria-label")
}

/// Last resort when nothing better is available: aria-label, title attribute, then the first
/// line of text cut to 80 characters.
pub fn fallback_title<D: ExternalDocument>(doc: &D, node: &D::Node) -> String {
    if let Some(label) = non_empty_attribute(doc, node, "aria-label")
        .or_else(|| non_empty_attribute(doc, node, "title"))
    {
        return label;
    }
    let text = doc.text(node);
    let first_line = text.trim().lines().next().unwrap_or_default().trim();
    if first_line.is_empty() {
        return UNTITLED.to_owned();
    }
    first_line.chars().take(FALLBACK_TITLE_CHARS).collect()
}

fn non_empty_attribute<D: ExternalDocument>(doc: &D, node: &D::Node, name: &str) -> Option<String> {
    doc.attribute(node, name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Everything needed to file a conversation, read off one host row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationInfo {
    pub conversation_id: ConversationId,
    pub title: String,
    pub url: String,
}

impl ConversationInfo {
    pub fn into_reference(self, added_at: i64) -> ConversationReference {
        ConversationReference::new(self.conversation_id, self.title, self.url, added_at)
    }
}

/// Reads id, title and url from a row. `None` unless the href carries a canonical id; no
/// fallback id is invented here.
pub fn read_conversation_info<D: ExternalDocument>(
    doc: &D,
    selectors: &HostSelectors,
    base_url: &str,
    node: &D::Node,
) -> Option<ConversationInfo> {
    let href = doc.attribute(node, "href")?;
    let conversation_id = extract_conversation_id(&href)?;
    let title = extract_title(doc, selectors, node).unwrap_or_else(|| fallback_title(doc, node));
    Some(ConversationInfo {
        url: absolute_url(base_url, &href),
        conversation_id,
        title,
    })
}

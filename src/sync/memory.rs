// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory host document: a node arena plus a small selector matcher.
//!
//! Supports what the host locators use: tag names, `.class`, `#id`, `[attr]`,
//! `[attr="v"]`, `[attr*="v"]`, `[attr^="v"]`, `*`, and the descendant combinator.
//! Detached subtrees stay addressable so removal batches can still be inspected.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};

use super::locator::{ExternalDocument, InvalidPattern};

pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Serialized form of a captured sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(roots: &[SnapshotNode]) -> Self {
        let mut doc = Self::new();
        for root in roots {
            doc.insert_snapshot(None, root);
        }
        doc
    }

    fn insert_snapshot(&mut self, parent: Option<NodeId>, snapshot: &SnapshotNode) -> NodeId {
        let attrs: Vec<(&str, &str)> = snapshot
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let id = self.append(parent, &snapshot.tag, &attrs, &snapshot.text);
        for child in &snapshot.children {
            self.insert_snapshot(Some(id), child);
        }
        id
    }

    /// Appends an element; `parent: None` appends at document level.
    pub fn append(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            text: text.to_owned(),
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// `<a class=.. href=..><div>title</div></a>`, the shape of a host sidebar row.
    pub fn append_link(
        &mut self,
        parent: Option<NodeId>,
        class: &str,
        href: &str,
        title: &str,
    ) -> NodeId {
        let link = self.append(parent, "a", &[("class", class), ("href", href)], "");
        self.append(Some(link), "div", &[], title);
        link
    }

    /// Detaches `node` from the document; the subtree stays readable.
    pub fn remove(&mut self, node: NodeId) {
        let parent = self.nodes.get(node).and_then(|n| n.parent);
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children.retain(|c| *c != node),
            None => self.roots.retain(|r| *r != node),
        }
    }

    /// Replaces the own text of `node` (e.g. the title div of a row).
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.text = text.to_owned();
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn descendants_of(&self, scope: Option<NodeId>) -> Vec<NodeId> {
        let start: Vec<NodeId> = match scope {
            Some(node) => self.children(node).to_vec(),
            None => self.roots.clone(),
        };
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = start.into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(n) = self.nodes.get(node) else {
            return false;
        };
        if compound.tag.as_ref().is_some_and(|tag| *tag != n.tag) {
            return false;
        }
        if let Some(id) = &compound.id {
            if n.attrs.get("id") != Some(id) {
                return false;
            }
        }
        let classes: Vec<&str> = n
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !compound.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        compound.attrs.iter().all(|cond| {
            let Some(value) = n.attrs.get(&cond.name) else {
                return false;
            };
            match &cond.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Contains(v) => value.contains(v.as_str()),
                AttrOp::Prefix(v) => value.starts_with(v.as_str()),
            }
        })
    }

    fn matches_selector(&self, node: NodeId, selector: &[Compound]) -> bool {
        let Some((last, rest)) = selector.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }
        let mut remaining = rest;
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some((wanted, earlier)) = remaining.split_last() {
            let Some(ancestor) = current else {
                return false;
            };
            if self.matches_compound(ancestor, wanted) {
                remaining = earlier;
            }
            current = self.nodes.get(ancestor).and_then(|n| n.parent);
        }
        true
    }
}

impl ExternalDocument for MemoryDocument {
    type Node = NodeId;

    fn query_all(
        &self,
        scope: Option<&NodeId>,
        pattern: &str,
    ) -> Result<Vec<NodeId>, InvalidPattern> {
        let selector = parse_selector(pattern)?;
        Ok(self
            .descendants_of(scope.copied())
            .into_iter()
            .filter(|node| self.matches_selector(*node, &selector))
            .collect())
    }

    fn matches(&self, node: &NodeId, pattern: &str) -> bool {
        parse_selector(pattern).is_ok_and(|selector| self.matches_selector(*node, &selector))
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.get(*node).and_then(|n| n.attrs.get(name).cloned())
    }

    fn text(&self, node: &NodeId) -> String {
        let mut out = self
            .nodes
            .get(*node)
            .map(|n| n.text.clone())
            .unwrap_or_default();
        for child in self.descendants_of(Some(*node)) {
            if let Some(n) = self.nodes.get(child) {
                out.push_str(&n.text);
            }
        }
        out
    }

    fn sibling_index(&self, node: &NodeId) -> Option<usize> {
        let siblings = match self.nodes.get(*node)?.parent {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|s| s == node)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCond>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCond {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut out = String::new();
    while let Some(c) = chars.next_if(|c| is_ident_char(*c)) {
        out.push(c);
    }
    (!out.is_empty()).then_some(out)
}

fn read_value(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut out = String::new();
            loop {
                match chars.next()? {
                    c if c == quote => return Some(out),
                    c => out.push(c),
                }
            }
        }
        _ => read_ident(chars),
    }
}

fn read_attr(chars: &mut Peekable<Chars<'_>>) -> Option<AttrCond> {
    let name = read_ident(chars)?;
    let op = match chars.next()? {
        ']' => return Some(AttrCond { name, op: AttrOp::Exists }),
        '=' => AttrOp::Equals(read_value(chars)?),
        '*' if chars.next_if_eq(&'=').is_some() => AttrOp::Contains(read_value(chars)?),
        '^' if chars.next_if_eq(&'=').is_some() => AttrOp::Prefix(read_value(chars)?),
        _ => return None,
    };
    chars.next_if_eq(&']')?;
    Some(AttrCond { name, op })
}

fn parse_selector(pattern: &str) -> Result<Vec<Compound>, InvalidPattern> {
    let invalid = || InvalidPattern {
        pattern: pattern.to_owned(),
    };
    let mut compounds = Vec::new();
    let mut current = Compound::default();
    let mut open = false;
    let mut chars = pattern.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if open {
                    compounds.push(std::mem::take(&mut current));
                    open = false;
                }
            }
            '.' => current.classes.push(read_ident(&mut chars).ok_or_else(invalid)?),
            '#' => current.id = Some(read_ident(&mut chars).ok_or_else(invalid)?),
            '[' => current.attrs.push(read_attr(&mut chars).ok_or_else(invalid)?),
            '*' => {}
            c if is_ident_char(c) && !open => {
                let mut tag = c.to_string();
                tag.push_str(&read_ident(&mut chars).unwrap_or_default());
                current.tag = Some(tag.to_ascii_lowercase());
            }
            _ => return Err(invalid()),
        }
        if !c.is_whitespace() {
            open = true;
        }
    }
    if open {
        compounds.push(current);
    }
    if compounds.is_empty() {
        return Err(invalid());
    }
    Ok(compounds)
}

#[cfg(test)]
mod tests {
    use super::{parse_selector, MemoryDocument, SnapshotNode};
    use crate::sync::locator::ExternalDocument;

    #[test]
    fn parses_host_selectors() {
        let selector = parse_selector(r#"a[href*="/a/chat/s/"] div"#).expect("selector");
        assert_eq!(selector.len(), 2);
        assert_eq!(selector[0].tag.as_deref(), Some("a"));
        assert!(parse_selector("[class*=\"ds-scroll\"]").is_ok());
        assert!(parse_selector(".d29f3d7d.ds-message").is_ok());
        assert!(parse_selector("!!").is_err());
        assert!(parse_selector("   ").is_err());
        assert!(parse_selector("[href*=").is_err());
    }

    #[test]
    fn descendant_combinator_and_attribute_operators() {
        let mut doc = MemoryDocument::new();
        let nav = doc.append(None, "nav", &[("class", "ds-scroll-area")], "");
        let row = doc.append_link(Some(nav), "row", "/a/chat/s/abc", "Hello");
        doc.append_link(None, "row", "/elsewhere", "Other");

        let hits = doc
            .query_all(None, r#".ds-scroll-area a[href^="/a/chat"] div"#)
            .expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.text(&hits[0]), "Hello");
        assert!(doc.matches(&row, r#"a[href*="/chat/s/"]"#));
        assert_eq!(doc.sibling_index(&row), Some(0));
    }

    #[test]
    fn removed_subtree_leaves_queries_but_stays_readable() {
        let mut doc = MemoryDocument::new();
        let row = doc.append_link(None, "row", "/a/chat/s/abc", "Hello");
        doc.remove(row);

        assert!(doc.query_all(None, "a").expect("query").is_empty());
        assert_eq!(doc.attribute(&row, "href").as_deref(), Some("/a/chat/s/abc"));
        assert_eq!(doc.text(&row), "Hello");
    }

    #[test]
    fn builds_from_snapshot_json() {
        let roots: Vec<SnapshotNode> = serde_json::from_str(
            r#"[{"tag":"nav","attrs":{"class":"ds-scroll-area"},"children":[
                {"tag":"a","attrs":{"href":"/a/chat/s/x"},"children":[{"tag":"div","text":"T"}]}
            ]}]"#,
        )
        .expect("snapshot");
        let doc = MemoryDocument::from_snapshot(&roots);
        assert_eq!(doc.query_all(None, "nav a div").expect("query").len(), 1);
    }
}

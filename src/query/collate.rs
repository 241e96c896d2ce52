// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folder-name collation: case- and accent-insensitive, with digit runs compared by value
//! (`Week 2` < `Week 10`).

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Digits(String),
    Text(char),
}

fn base_form(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn chunks(folded: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for c in folded.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if !digits.is_empty() {
            out.push(Chunk::Digits(std::mem::take(&mut digits)));
        }
        out.push(Chunk::Text(c));
    }
    if !digits.is_empty() {
        out.push(Chunk::Digits(digits));
    }
    out
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

/// Punctuation and whitespace sort first, then digit runs, then letters.
fn text_class(c: char) -> u8 {
    if c.is_alphanumeric() {
        2
    } else {
        0
    }
}

fn compare_chunk(a: &Chunk, b: &Chunk) -> Ordering {
    match (a, b) {
        (Chunk::Digits(a), Chunk::Digits(b)) => compare_digit_runs(a, b),
        (Chunk::Digits(_), Chunk::Text(c)) => 1.cmp(&text_class(*c)),
        (Chunk::Text(c), Chunk::Digits(_)) => text_class(*c).cmp(&1),
        (Chunk::Text(a), Chunk::Text(b)) => text_class(*a)
            .cmp(&text_class(*b))
            .then_with(|| a.cmp(b)),
    }
}

/// Compares two names at "base" strength: `a`, `A` and `á` are equal.
pub fn compare_names_base(a: &str, b: &str) -> Ordering {
    let a_chunks = chunks(&base_form(a));
    let b_chunks = chunks(&base_form(b));
    for (left, right) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = compare_chunk(left, right);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

/// Total order: base comparison first, raw text breaks ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    compare_names_base(a, b).then_with(|| a.cmp(b))
}

// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A named section of the event owning an ordered list of moments.
///
/// Ids are immutable once created; only the display name can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// URL-safe identifier, unique within the aggregate.
    pub id: String,
    /// Display name; free text.
    pub name: String,
}

impl Block {
    /// Creates a new `Block`.
    #[must_use]
    pub const fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}

/// Derives a URL-safe block id from a display name.
///
/// Lowercases, strips diacritics, collapses runs of anything that is not an
/// ASCII letter or digit into a single `-`, and trims leading/trailing `-`.
/// Returns `None` when nothing survives, in which case callers fall back to
/// [`fallback_block_id`].
#[must_use]
pub fn derive_block_id(name: &str) -> Option<String> {
    let lowered: String = name.to_lowercase();
    let mut id = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let folded = strip_diacritic(ch);
        if folded.is_ascii_alphanumeric() {
            id.push(folded);
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    let trimmed = id.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Timestamp-based id used when [`derive_block_id`] yields nothing.
#[must_use]
pub fn fallback_block_id(now_ms: i64) -> String {
    format!("bloque-{now_ms}")
}

// Covers the Latin accents Spanish block names use; anything unmapped and
// non-alphanumeric collapses to '-'.
const fn strip_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' => 'n',
        'ç' => 'c',
        _ => ch,
    }
}

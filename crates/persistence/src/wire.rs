// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wire encode/decode for both aggregates.
//!
//! [`decode_board`] is the single place that understands the legacy flat
//! document shape (top-level block keys, no `moments` wrapper); everything
//! downstream works on the canonical [`MomentsBoard`]. Malformed pieces
//! decode to typed fallbacks, matching how the product treated corrupt
//! payloads: keep what parses, default the rest.

use runsheet::{MomentsBoard, Timeline, default_board};
use runsheet_domain::{Alert, Block, Moment, TimelineBlock};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::PersistenceError;
use crate::store::Document;

/// Top-level keys of a moments document that are not block lists.
const RESERVED_KEYS: [&str; 3] = ["blocks", "updatedAt", "migratedFrom"];

/// The serialized `{blocks, moments}` aggregate.
///
/// The moments map is ordered, so equal boards always produce equal
/// strings; the engine's loop guard depends on that.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn board_snapshot_json(board: &MomentsBoard) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(board)?)
}

/// Decodes a moments payload of either shape into the canonical board.
///
/// Current shape (`moments` wrapper present): blocks are taken from the
/// payload when they form a non-empty list, else defaulted; each moment
/// list decodes independently and malformed lists are dropped. Legacy flat
/// shape: every top-level array-valued key (minus the reserved ones) is a
/// block's moment list; blocks fall back to the defaults, and an entirely
/// empty result falls back to the default moments.
#[must_use]
pub fn decode_board(value: &Value) -> MomentsBoard {
    let defaults = default_board();

    if let Some(wrapped) = value.get("moments").and_then(Value::as_object) {
        let blocks = value
            .get("blocks")
            .and_then(|raw| serde_json::from_value::<Vec<Block>>(raw.clone()).ok())
            .filter(|blocks| !blocks.is_empty())
            .unwrap_or(defaults.blocks);
        let mut moments: BTreeMap<String, Vec<Moment>> = BTreeMap::new();
        for (key, list) in wrapped {
            if let Ok(list) = serde_json::from_value::<Vec<Moment>>(list.clone()) {
                moments.insert(key.clone(), list);
            }
        }
        return MomentsBoard::new(blocks, moments);
    }

    let Some(flat) = value.as_object() else {
        return defaults;
    };
    let mut moments: BTreeMap<String, Vec<Moment>> = BTreeMap::new();
    for (key, list) in flat {
        if RESERVED_KEYS.contains(&key.as_str()) || !list.is_array() {
            continue;
        }
        if let Ok(list) = serde_json::from_value::<Vec<Moment>>(list.clone()) {
            moments.insert(key.clone(), list);
        }
    }
    if moments.is_empty() {
        return defaults;
    }
    MomentsBoard::new(defaults.blocks, moments)
}

/// Decodes a remote change notification, or `None` when the payload
/// carries no moment lists at all.
///
/// Unlike [`decode_board`], an empty or contentless payload must not
/// produce defaults here: a notification merge never wipes existing state.
#[must_use]
pub fn decode_board_update(value: &Value) -> Option<MomentsBoard> {
    if value.get("moments").is_some_and(Value::is_object) {
        return Some(decode_board(value));
    }
    let object = value.as_object()?;
    let has_lists = object
        .iter()
        .any(|(key, list)| !RESERVED_KEYS.contains(&key.as_str()) && list.is_array());
    if !has_lists {
        return None;
    }
    Some(decode_board(value))
}

/// Parses a raw mirror slot into the canonical board.
///
/// # Errors
///
/// Returns an error when `raw` is not JSON at all; shape problems inside
/// valid JSON fall back to defaults via [`decode_board`].
pub fn decode_board_str(raw: &str) -> Result<MomentsBoard, PersistenceError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(decode_board(&value))
}

/// Builds the merge-write fields for the moments document.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn board_document(board: &MomentsBoard, updated_at_ms: i64) -> Result<Document, PersistenceError> {
    let mut fields = Document::new();
    fields.insert(String::from("blocks"), serde_json::to_value(&board.blocks)?);
    fields.insert(String::from("moments"), serde_json::to_value(&board.moments)?);
    fields.insert(String::from("updatedAt"), Value::from(updated_at_ms));
    Ok(fields)
}

/// The three independently-typed fields of a timeline document.
///
/// `None` means the field was absent or malformed and must be left alone;
/// partial payloads never wipe state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineFields {
    pub blocks: Option<Vec<TimelineBlock>>,
    pub alerts: Option<Vec<Alert>>,
    pub automatic_alerts: Option<bool>,
}

/// Decodes a timeline payload field-wise, type-checking each field.
#[must_use]
pub fn decode_timeline_fields(value: &Value) -> TimelineFields {
    TimelineFields {
        blocks: value
            .get("blocks")
            .filter(|raw| raw.is_array())
            .and_then(|raw| serde_json::from_value(raw.clone()).ok()),
        alerts: value
            .get("alerts")
            .filter(|raw| raw.is_array())
            .and_then(|raw| serde_json::from_value(raw.clone()).ok()),
        automatic_alerts: value.get("automaticAlerts").and_then(Value::as_bool),
    }
}

/// Builds the merge-write fields for the timeline document.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn timeline_document(timeline: &Timeline, updated_at_ms: i64) -> Result<Document, PersistenceError> {
    let mut fields = Document::new();
    fields.insert(String::from("blocks"), serde_json::to_value(&timeline.blocks)?);
    fields.insert(String::from("alerts"), serde_json::to_value(&timeline.alerts)?);
    fields.insert(
        String::from("automaticAlerts"),
        Value::from(timeline.automatic_alerts),
    );
    fields.insert(String::from("updatedAt"), Value::from(updated_at_ms));
    Ok(fields)
}

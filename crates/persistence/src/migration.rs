// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::Value;
use tracing::info;

use crate::error::PersistenceError;
use crate::paths::{legacy_moments_path, special_moments_path};
use crate::store::DocumentStore;
use crate::wire::{board_document, decode_board};

/// What the one-time legacy migration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The legacy payload was normalized and written to the new location.
    Migrated,
    /// No legacy document exists; nothing to do.
    NoLegacyDocument,
    /// The destination already holds data; migration must not overwrite it.
    DestinationExists,
}

/// Copies the legacy flat moments document into the current shape, once.
///
/// Idempotent by construction: a populated destination short-circuits, so a
/// second run is a no-op. The written document carries a `migratedFrom` tag
/// naming the legacy collection.
///
/// # Errors
///
/// Returns an error when the store cannot be reached or the normalized
/// payload fails to serialize.
pub async fn migrate_legacy_moments(
    store: &dyn DocumentStore,
    wedding_id: &str,
    now_ms: i64,
) -> Result<MigrationOutcome, PersistenceError> {
    let destination = special_moments_path(wedding_id);
    if store.get(&destination).await?.is_some_and(|doc| !doc.is_empty()) {
        return Ok(MigrationOutcome::DestinationExists);
    }

    let Some(legacy) = store.get(&legacy_moments_path(wedding_id)).await? else {
        return Ok(MigrationOutcome::NoLegacyDocument);
    };

    let board = decode_board(&Value::Object(legacy));
    let mut fields = board_document(&board, now_ms)?;
    fields.insert(
        String::from("migratedFrom"),
        Value::from("momentosEspeciales"),
    );
    store.set_merge(&destination, fields).await?;
    info!(wedding_id, "migrated legacy moments document");
    Ok(MigrationOutcome::Migrated)
}

// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Persistence layer for the runsheet core.
//!
//! Three concerns live here:
//!
//! - the [`DocumentStore`] trait the engine consumes for remote documents,
//!   with an in-memory implementation for tests and local-only deployments;
//! - the [`LocalMirror`]: a persisted key-value slot shared across replicas,
//!   carrying an origin-tagged change broadcast (the cross-tab contract);
//! - the wire codecs for both aggregates, including the single pure adapter
//!   for the legacy flat document shape, and the one-time remote migration.
//!
//! Nothing in this crate owns domain logic; malformed payloads decode to
//! typed fallbacks instead of errors wherever the product tolerated them.

mod error;
mod migration;
mod mirror;
mod paths;
mod store;
mod wire;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use migration::{MigrationOutcome, migrate_legacy_moments};
pub use mirror::{FileMirror, LocalMirror, MemoryMirror, MirrorBackend, MirrorEvent};
pub use paths::{legacy_moments_path, special_moments_path, timeline_path};
pub use store::{Document, DocumentStore, MemoryStore};
pub use wire::{
    TimelineFields, board_document, board_snapshot_json, decode_board, decode_board_str,
    decode_board_update, decode_timeline_fields, timeline_document,
};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the guard from a poisoned lock.
///
/// State behind these locks is plain data; a panicked writer cannot leave it
/// half-updated in a way later readers must reject.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

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

//! The services UI surfaces hold: [`MomentsService`] for the editor and
//! [`TimelineService`] for the live timing board.
//!
//! Both wrap a pure aggregate from `runsheet` behind a mutex, apply
//! mutations optimistically, and push persistence onto background tasks:
//! the mirror write is synchronous and unconditional, the remote write is
//! asynchronous, best-effort and loop-guarded. No error from an I/O
//! boundary ever reaches a caller of a mutation; the services degrade to
//! local-only operation and log.

mod config;
mod guests;
mod moments_service;
mod notify;
mod timeline_service;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use guests::{
    Guest, GuestDirectory, RECIPIENT_ROLES, RecipientFields, StaticGuestDirectory,
    resolve_recipient,
};
pub use moments_service::MomentsService;
pub use notify::{NoticeLevel, NotificationSink, RecordingSink, TracingSink};
pub use timeline_service::TimelineService;

use runsheet_persistence::PersistenceError;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Errors surfaced by the explicit engine entry points.
///
/// Background persistence never raises these; only construction and the
/// `flush_remote` calls propagate them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A persistence operation failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Locks a mutex, recovering the guard from a poisoned lock.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

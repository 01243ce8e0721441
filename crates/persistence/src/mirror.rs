// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The local mirror: a persisted key-value slot shared across replicas.
//!
//! Each replica holds a [`LocalMirror`] handle with its own origin id.
//! Writes land in the backend and are broadcast as [`MirrorEvent`]s; a
//! replica skips events carrying its own origin, which reproduces the
//! browser contract that storage events fire only in *other* tabs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::PersistenceError;
use crate::lock_or_recover;

/// Maximum number of mirror change events buffered per channel.
const EVENT_BUFFER_SIZE: usize = 64;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// A change notification carried to sibling replicas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEvent {
    /// The key that was written.
    pub key: String,
    /// The full new value.
    pub new_value: String,
    /// Origin id of the writing replica.
    pub origin: u64,
}

/// Storage behind the mirror.
pub trait MirrorBackend: Send + Sync {
    /// Reads a slot, `None` when never written.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Overwrites a slot.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Volatile backend for tests and ephemeral replicas.
pub struct MemoryMirror {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorBackend for MemoryMirror {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(lock_or_recover(&self.slots).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        lock_or_recover(&self.slots).insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Directory-of-files backend; survives restarts.
///
/// Each key maps to one file, written atomically (temp file + rename) so a
/// crash mid-write never leaves a truncated slot.
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    /// Opens (creating if needed) the mirror directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl MirrorBackend for FileMirror {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path: PathBuf = self.slot_path(key);
        if !Path::exists(&path) {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.slot_path(key);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }
}

/// One replica's handle onto the shared mirror.
pub struct LocalMirror {
    backend: Arc<dyn MirrorBackend>,
    tx: broadcast::Sender<MirrorEvent>,
    origin: u64,
}

impl LocalMirror {
    /// Creates the first replica handle over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn MirrorBackend>) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            backend,
            tx,
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Creates a sibling replica sharing this mirror's backend and channel
    /// but carrying a fresh origin id.
    #[must_use]
    pub fn replica(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            tx: self.tx.clone(),
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// This replica's origin id; events carrying it are this replica's own.
    #[must_use]
    pub const fn origin(&self) -> u64 {
        self.origin
    }

    /// Reads a slot.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.backend.get_item(key)
    }

    /// Overwrites a slot and notifies sibling replicas.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written; no
    /// event is broadcast in that case.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.backend.set_item(key, value)?;
        let event = MirrorEvent {
            key: key.to_owned(),
            new_value: value.to_owned(),
            origin: self.origin,
        };
        if self.tx.send(event).is_err() {
            debug!(key, "no sibling replicas listening for mirror event");
        }
        Ok(())
    }

    /// Subscribes to change events from every replica, this one included;
    /// filter on [`MirrorEvent::origin`].
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.tx.subscribe()
    }
}

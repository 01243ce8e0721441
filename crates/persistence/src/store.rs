// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::PersistenceError;
use crate::lock_or_recover;

/// Maximum number of document snapshots buffered per path subscription.
/// Slow subscribers lose the oldest snapshots, never the newest.
const SNAPSHOT_BUFFER_SIZE: usize = 64;

/// One remote document: a flat map of top-level fields.
pub type Document = serde_json::Map<String, Value>;

/// The remote per-wedding document database, consumed behind a trait.
///
/// Semantics follow the product's store: `set_merge` merges at top-level
/// field granularity (last write wins per field), and subscriptions push
/// full document snapshots after every write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document, `None` when the path has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be reached.
    async fn get(&self, path: &str) -> Result<Option<Document>, PersistenceError>;

    /// Merge-writes `fields` into the document at `path`, creating it if
    /// absent. Fields not named are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be reached.
    async fn set_merge(&self, path: &str, fields: Document) -> Result<(), PersistenceError>;

    /// Subscribes to full-document snapshots of `path`.
    ///
    /// Snapshots written before subscription are not replayed.
    fn subscribe(&self, path: &str) -> broadcast::Receiver<Document>;
}

/// In-memory [`DocumentStore`] used by tests and local-only deployments.
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
    channels: Mutex<HashMap<String, broadcast::Sender<Document>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, path: &str) -> broadcast::Sender<Document> {
        let mut channels = lock_or_recover(&self.channels);
        channels
            .entry(path.to_owned())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_BUFFER_SIZE).0)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, PersistenceError> {
        Ok(lock_or_recover(&self.documents).get(path).cloned())
    }

    async fn set_merge(&self, path: &str, fields: Document) -> Result<(), PersistenceError> {
        let snapshot = {
            let mut documents = lock_or_recover(&self.documents);
            let document = documents.entry(path.to_owned()).or_default();
            for (key, value) in fields {
                document.insert(key, value);
            }
            document.clone()
        };

        let sender = self.sender_for(path);
        if sender.send(snapshot).is_err() {
            // No subscribers yet; the write itself already landed.
            debug!(path, "no subscribers for document snapshot");
        }
        Ok(())
    }

    fn subscribe(&self, path: &str) -> broadcast::Receiver<Document> {
        self.sender_for(path).subscribe()
    }
}

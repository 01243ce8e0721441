// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The editor-facing moments service.
//!
//! Owns the [`MomentsBoard`] for one replica and keeps three parties in
//! agreement: the in-process state, the local mirror slot shared with
//! sibling replicas, and (when a wedding is configured) the remote
//! document. Mutations apply optimistically; persistence failures degrade
//! to local-only operation and log instead of surfacing.

use chrono::Utc;
use runsheet::{MomentsBoard, MoveDirection, default_board};
use runsheet_domain::MomentPatch;
use runsheet_persistence::{
    DocumentStore, LocalMirror, MigrationOutcome, board_document, board_snapshot_json,
    decode_board_str, decode_board_update, migrate_legacy_moments, special_moments_path,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::guests::{GuestDirectory, resolve_recipient};
use crate::notify::NotificationSink;
use crate::{EngineConfig, EngineError, lock_or_recover};

struct MomentsInner {
    config: EngineConfig,
    sink: Arc<dyn NotificationSink>,
    mirror: LocalMirror,
    store: Option<Arc<dyn DocumentStore>>,
    board: Mutex<MomentsBoard>,
    /// Serialization of the last state known to match the remote document.
    /// The write path compares against it to drop echoes of its own writes.
    last_remote: Mutex<Option<String>>,
    board_watch: watch::Sender<MomentsBoard>,
}

/// Live handle over one replica's moments aggregate.
///
/// Cheap state reads go through [`Self::board`]; continuous consumers (the
/// timeline projection, a UI) subscribe via [`Self::watch`].
pub struct MomentsService {
    inner: Arc<MomentsInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MomentsService {
    /// Brings the service up: loads the mirror slot (falling back to the
    /// seeded default board), runs the one-time legacy migration, adopts the
    /// current remote document and starts the two listener tasks.
    ///
    /// With no store or no wedding configured the service runs mirror-only.
    ///
    /// # Errors
    ///
    /// Returns an error when the mirror backend cannot be read. Remote
    /// failures during startup are logged and tolerated; the service comes
    /// up on local state.
    pub async fn start(
        config: EngineConfig,
        store: Option<Arc<dyn DocumentStore>>,
        mirror: LocalMirror,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, EngineError> {
        let board = match mirror.get_item(&config.mirror_key)? {
            Some(raw) => decode_board_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "corrupt mirror slot, starting from defaults");
                default_board()
            }),
            None => default_board(),
        };
        let (board_watch, _) = watch::channel(board.clone());

        let inner = Arc::new(MomentsInner {
            config,
            sink,
            mirror,
            store,
            board: Mutex::new(board),
            last_remote: Mutex::new(None),
            board_watch,
        });
        let service = Self {
            inner: Arc::clone(&inner),
            tasks: Mutex::new(Vec::new()),
        };

        if let (Some(store), Some(wedding_id)) =
            (inner.store.clone(), inner.config.wedding_id.clone())
        {
            let now = Utc::now().timestamp_millis();
            match migrate_legacy_moments(store.as_ref(), &wedding_id, now).await {
                Ok(MigrationOutcome::Migrated) => {
                    info!(wedding_id, "adopted migrated legacy moments");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "legacy moments migration failed"),
            }

            // Subscribe before the initial read so no snapshot falls in
            // between.
            let remote_rx = store.subscribe(&special_moments_path(&wedding_id));
            match store.get(&special_moments_path(&wedding_id)).await {
                Ok(Some(document)) => apply_remote(&inner, &Value::Object(document)),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "initial remote moments read failed"),
            }
            service.spawn_remote_listener(remote_rx);
        }
        service.spawn_mirror_listener();

        // Seed the mirror slot so sibling replicas starting later see the
        //(possibly defaulted) aggregate immediately. No remote push here:
        // startup must not clobber a document this replica has not seen.
        write_mirror(&inner);

        Ok(service)
    }

    fn spawn_remote_listener(&self, mut rx: broadcast::Receiver<runsheet_persistence::Document>) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(document) => apply_remote(&inner, &Value::Object(document)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "remote moments listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        lock_or_recover(&self.tasks).push(handle);
    }

    fn spawn_mirror_listener(&self) {
        let inner = Arc::clone(&self.inner);
        let mut rx = inner.mirror.subscribe();
        let own_origin = inner.mirror.origin();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.origin == own_origin || event.key != inner.config.mirror_key {
                            continue;
                        }
                        match decode_board_str(&event.new_value) {
                            Ok(board) => {
                                *lock_or_recover(&inner.board) = board.clone();
                                inner.board_watch.send_replace(board);
                                // The writing replica already updated the
                                // mirror; only the remote needs catching up.
                                if let Err(err) = flush_remote_inner(&inner).await {
                                    warn!(error = %err, "remote moments write failed");
                                }
                            }
                            Err(err) => warn!(error = %err, "ignoring corrupt mirror event"),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "mirror moments listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        lock_or_recover(&self.tasks).push(handle);
    }

    /// A snapshot of the current board.
    #[must_use]
    pub fn board(&self) -> MomentsBoard {
        lock_or_recover(&self.inner.board).clone()
    }

    /// Subscribes to board snapshots; the receiver always starts on the
    /// current state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MomentsBoard> {
        self.inner.board_watch.subscribe()
    }

    /// Adds a moment to `block_id` seeded from `draft`.
    ///
    /// Returns the new id, or `None` when a capacity cap rejected the add;
    /// the rejection reaches the user through the notification sink.
    #[must_use]
    pub fn add_moment(&self, block_id: &str, draft: MomentPatch) -> Option<i64> {
        let now = Utc::now().timestamp_millis();
        let result = lock_or_recover(&self.inner.board).add_moment(
            block_id,
            draft,
            &self.inner.config.limits,
            now,
        );
        match result {
            Ok(id) => {
                self.after_mutation();
                Some(id)
            }
            Err(err) => {
                debug!(block_id, error = %err, "add moment rejected");
                self.inner.sink.warning(&err.to_string());
                None
            }
        }
    }

    /// Removes a moment; survivors are renumbered. Returns whether anything
    /// changed.
    #[must_use]
    pub fn remove_moment(&self, block_id: &str, moment_id: i64) -> bool {
        let changed = lock_or_recover(&self.inner.board).remove_moment(block_id, moment_id);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Merges `changes` into a moment. Returns whether a moment matched;
    /// cap rejections notify and leave state untouched.
    #[must_use]
    pub fn update_moment(&self, block_id: &str, moment_id: i64, changes: MomentPatch) -> bool {
        let result = lock_or_recover(&self.inner.board).update_moment(
            block_id,
            moment_id,
            changes,
            &self.inner.config.limits,
        );
        match result {
            Ok(changed) => {
                if changed {
                    self.after_mutation();
                }
                changed
            }
            Err(err) => {
                debug!(block_id, moment_id, error = %err, "update moment rejected");
                self.inner.sink.warning(&err.to_string());
                false
            }
        }
    }

    /// Swaps a moment with its neighbor. Returns whether a swap happened.
    #[must_use]
    pub fn reorder_moment(&self, block_id: &str, moment_id: i64, direction: MoveDirection) -> bool {
        let changed =
            lock_or_recover(&self.inner.board).reorder_moment(block_id, moment_id, direction);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Moves a moment to a 0-based index within its block.
    #[must_use]
    pub fn move_moment(&self, block_id: &str, moment_id: i64, to_index: usize) -> bool {
        let changed =
            lock_or_recover(&self.inner.board).move_moment(block_id, moment_id, to_index);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Moves a moment across blocks, inserting at `to_index` in the
    /// destination. Capacity rejections notify and leave state untouched.
    #[must_use]
    pub fn move_moment_between_blocks(
        &self,
        from: &str,
        to: &str,
        moment_id: i64,
        to_index: usize,
    ) -> bool {
        let result = lock_or_recover(&self.inner.board).move_moment_between_blocks(
            from,
            to,
            moment_id,
            to_index,
            &self.inner.config.limits,
        );
        match result {
            Ok(changed) => {
                if changed {
                    self.after_mutation();
                }
                changed
            }
            Err(err) => {
                debug!(from, to, moment_id, error = %err, "move between blocks rejected");
                self.inner.sink.warning(&err.to_string());
                false
            }
        }
    }

    /// Clones a moment under a fresh id, into `to` or next to the original.
    ///
    /// Returns the new id, `None` when the source was unknown or a cap
    /// rejected the copy.
    #[must_use]
    pub fn duplicate_moment(&self, from: &str, moment_id: i64, to: Option<&str>) -> Option<i64> {
        let now = Utc::now().timestamp_millis();
        let result = lock_or_recover(&self.inner.board).duplicate_moment(
            from,
            moment_id,
            to,
            &self.inner.config.limits,
            now,
        );
        match result {
            Ok(Some(id)) => {
                self.after_mutation();
                Some(id)
            }
            Ok(None) => None,
            Err(err) => {
                debug!(from, moment_id, error = %err, "duplicate moment rejected");
                self.inner.sink.warning(&err.to_string());
                None
            }
        }
    }

    /// Adds a block named `name` and returns its derived id.
    #[must_use]
    pub fn add_block(&self, name: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let id = lock_or_recover(&self.inner.board).add_block(name, now);
        self.after_mutation();
        id
    }

    /// Renames a block; ids are immutable.
    #[must_use]
    pub fn rename_block(&self, block_id: &str, new_name: &str) -> bool {
        let changed = lock_or_recover(&self.inner.board).rename_block(block_id, new_name);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Removes a block and its moments.
    #[must_use]
    pub fn remove_block(&self, block_id: &str) -> bool {
        let changed = lock_or_recover(&self.inner.board).remove_block(block_id);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Moves a block from one index to another.
    #[must_use]
    pub fn reorder_blocks(&self, from_index: usize, to_index: usize) -> bool {
        let changed = lock_or_recover(&self.inner.board).reorder_blocks(from_index, to_index);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Resolves `input` against the guest directory and writes the recipient
    /// trio onto the moment. Returns whether a moment matched.
    #[must_use]
    pub fn set_moment_recipient(
        &self,
        block_id: &str,
        moment_id: i64,
        input: &str,
        directory: &dyn GuestDirectory,
    ) -> bool {
        let fields = resolve_recipient(directory, input);
        let patch = MomentPatch {
            recipient_id: Some(fields.id),
            recipient_name: Some(fields.name),
            recipient_role: Some(fields.role),
            ..MomentPatch::default()
        };
        self.update_moment(block_id, moment_id, patch)
    }

    /// Validates every moment of a block and returns the findings keyed by
    /// moment id.
    ///
    /// The first time a wedding produces findings, a warning notice fires
    /// and a persisted flag suppresses repeats; switching weddings re-arms
    /// the reminder.
    #[must_use]
    pub fn remind_validation_issues(&self, block_id: &str) -> BTreeMap<i64, Vec<String>> {
        let findings = lock_or_recover(&self.inner.board)
            .moment_validation_errors(block_id, &self.inner.config.limits);
        if findings.is_empty() {
            return findings;
        }

        let key = self.inner.config.reminder_key();
        match self.inner.mirror.get_item(&key) {
            Ok(Some(_)) => {}
            Ok(None) => {
                let count = findings.len();
                let message = if count == 1 {
                    String::from("Hay un momento con datos incompletos")
                } else {
                    format!("Hay {count} momentos con datos incompletos")
                };
                self.inner.sink.warning(&message);
                if let Err(err) = self.inner.mirror.set_item(&key, "shown") {
                    warn!(error = %err, "could not persist the validation reminder flag");
                }
            }
            Err(err) => warn!(error = %err, "could not read the validation reminder flag"),
        }
        findings
    }

    /// Pushes the current board to the remote document unless the remote
    /// already holds it.
    ///
    /// Returns whether a write went out; `Ok(false)` covers both the
    /// local-only mode and the loop guard.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the store write fails.
    pub async fn flush_remote(&self) -> Result<bool, EngineError> {
        flush_remote_inner(&self.inner).await
    }

    /// Stops the listener tasks. Mutations keep working mirror-only.
    pub fn shutdown(&self) {
        for task in lock_or_recover(&self.tasks).drain(..) {
            task.abort();
        }
    }

    fn after_mutation(&self) {
        let snapshot = lock_or_recover(&self.inner.board).clone();
        self.inner.board_watch.send_replace(snapshot);
        write_mirror(&self.inner);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(err) = flush_remote_inner(&inner).await {
                warn!(error = %err, "remote moments write failed");
            }
        });
    }
}

impl Drop for MomentsService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Merges a remote payload into the board: blocks are replaced, moment
/// lists land per block so absent blocks are never wiped.
///
/// Payloads carrying no moment lists at all are dropped, and payloads that
/// serialize to the last state this replica wrote are echoes and skipped.
fn apply_remote(inner: &Arc<MomentsInner>, value: &Value) {
    let Some(update) = decode_board_update(value) else {
        return;
    };
    let incoming = match board_snapshot_json(&update) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "could not serialize remote moments payload");
            return;
        }
    };
    if lock_or_recover(&inner.last_remote).as_deref() == Some(incoming.as_str()) {
        return;
    }

    let merged = {
        let mut board = lock_or_recover(&inner.board);
        board.blocks = update.blocks;
        for (key, list) in update.moments {
            board.moments.insert(key, list);
        }
        board.clone()
    };
    match board_snapshot_json(&merged) {
        Ok(raw) => {
            *lock_or_recover(&inner.last_remote) = Some(raw.clone());
            if let Err(err) = inner.mirror.set_item(&inner.config.mirror_key, &raw) {
                warn!(error = %err, "mirror write failed after remote update");
            }
        }
        Err(err) => warn!(error = %err, "could not serialize merged moments state"),
    }
    inner.board_watch.send_replace(merged);
}

fn write_mirror(inner: &Arc<MomentsInner>) {
    let snapshot = lock_or_recover(&inner.board).clone();
    match board_snapshot_json(&snapshot) {
        Ok(raw) => {
            if let Err(err) = inner.mirror.set_item(&inner.config.mirror_key, &raw) {
                warn!(error = %err, "mirror moments write failed");
            }
        }
        Err(err) => warn!(error = %err, "could not serialize moments for the mirror"),
    }
}

async fn flush_remote_inner(inner: &Arc<MomentsInner>) -> Result<bool, EngineError> {
    let Some(store) = inner.store.clone() else {
        return Ok(false);
    };
    let Some(wedding_id) = inner.config.wedding_id.clone() else {
        return Ok(false);
    };

    let snapshot = lock_or_recover(&inner.board).clone();
    let serialized = board_snapshot_json(&snapshot)?;
    if lock_or_recover(&inner.last_remote).as_deref() == Some(serialized.as_str()) {
        return Ok(false);
    }

    let now = Utc::now().timestamp_millis();
    let fields = board_document(&snapshot, now)?;
    store
        .set_merge(&special_moments_path(&wedding_id), fields)
        .await?;
    *lock_or_recover(&inner.last_remote) = Some(serialized);
    Ok(true)
}

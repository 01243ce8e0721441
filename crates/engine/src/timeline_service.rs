// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The day-of timeline service.
//!
//! Owns the [`Timeline`] aggregate and layers the time-dependent behavior
//! on top of it: a debounced remote writer, field-wise adoption of remote
//! changes, auto-acknowledging `info` alerts, and the projection of moment
//! summaries from a [`MomentsService`] board.

use chrono::{Local, NaiveDateTime, Utc};
use runsheet::{Timeline, TimelineSummary, default_timeline};
use runsheet_domain::{AlertKind, BlockStatus, BlockTiming, ScheduleIssue, TimelineBlockPatch};
use runsheet_persistence::{
    DocumentStore, TimelineFields, decode_timeline_fields, timeline_document, timeline_path,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::moments_service::MomentsService;
use crate::notify::NotificationSink;
use crate::{EngineConfig, EngineError, lock_or_recover};

struct TimelineInner {
    config: EngineConfig,
    sink: Arc<dyn NotificationSink>,
    store: Option<Arc<dyn DocumentStore>>,
    timeline: Mutex<Timeline>,
    /// Bumped on every local edit; the debounced writer listens here.
    /// Remote adoptions do not bump it, so echoes never re-arm the writer.
    dirty: watch::Sender<u64>,
    /// Bumped on every state change, local or remote; UIs listen here.
    revision: watch::Sender<u64>,
    sync_in_progress: AtomicBool,
    /// Auto-acknowledge timers keyed by alert id.
    timers: Mutex<HashMap<i64, JoinHandle<()>>>,
}

/// Live handle over one replica's timeline.
pub struct TimelineService {
    inner: Arc<TimelineInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TimelineService {
    /// Brings the service up on the seeded default timeline, adopts the
    /// current remote document and starts the writer and listener tasks.
    ///
    /// With no store or no wedding configured the service runs in memory.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; kept fallible for parity with the
    /// moments service so embedders handle both the same way.
    pub async fn start(
        config: EngineConfig,
        store: Option<Arc<dyn DocumentStore>>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, EngineError> {
        let (dirty, _) = watch::channel(0_u64);
        let (revision, _) = watch::channel(0_u64);
        let inner = Arc::new(TimelineInner {
            config,
            sink,
            store,
            timeline: Mutex::new(default_timeline()),
            dirty,
            revision,
            sync_in_progress: AtomicBool::new(false),
            timers: Mutex::new(HashMap::new()),
        });
        let service = Self {
            inner: Arc::clone(&inner),
            tasks: Mutex::new(Vec::new()),
        };

        if let (Some(store), Some(wedding_id)) =
            (inner.store.clone(), inner.config.wedding_id.clone())
        {
            let remote_rx = store.subscribe(&timeline_path(&wedding_id));
            match store.get(&timeline_path(&wedding_id)).await {
                Ok(Some(document)) => {
                    apply_remote(&inner, decode_timeline_fields(&Value::Object(document)));
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "initial remote timeline read failed"),
            }
            service.spawn_remote_listener(remote_rx);
            service.spawn_writer();
        }

        Ok(service)
    }

    /// Recomputes every block's moment summaries from `moments` now and on
    /// every later board change, for as long as the service lives.
    pub fn attach_moments(&self, moments: &MomentsService) {
        let inner = Arc::clone(&self.inner);
        let mut rx = moments.watch();
        let handle = tokio::spawn(async move {
            loop {
                let board = rx.borrow_and_update().clone();
                lock_or_recover(&inner.timeline).project_moments(&board);
                bump(&inner.revision);
                bump(&inner.dirty);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        lock_or_recover(&self.tasks).push(handle);
    }

    fn spawn_remote_listener(&self, mut rx: broadcast::Receiver<runsheet_persistence::Document>) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(document) => {
                        apply_remote(&inner, decode_timeline_fields(&Value::Object(document)));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "remote timeline listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        lock_or_recover(&self.tasks).push(handle);
    }

    /// The debounced writer: a burst of edits collapses into one remote
    /// write, sent once the timeline has been quiet for the configured
    /// debounce window.
    fn spawn_writer(&self) {
        let inner = Arc::clone(&self.inner);
        let mut rx = inner.dirty.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
                loop {
                    tokio::select! {
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                        () = tokio::time::sleep(inner.config.timeline_debounce) => break,
                    }
                }
                write_remote(&inner).await;
            }
        });
        lock_or_recover(&self.tasks).push(handle);
    }

    /// A snapshot of the current timeline.
    #[must_use]
    pub fn timeline(&self) -> Timeline {
        lock_or_recover(&self.inner.timeline).clone()
    }

    /// Subscribes to change notifications; the value is an opaque revision
    /// counter, read state through [`Self::timeline`].
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Whether a remote write is in flight right now.
    #[must_use]
    pub fn sync_in_progress(&self) -> bool {
        self.inner.sync_in_progress.load(Ordering::SeqCst)
    }

    /// Sets a block's status from its wire name.
    ///
    /// Unknown statuses are dropped. With automatic alerts on, a real
    /// transition to a delay status synthesizes the matching alert inside
    /// the aggregate. Returns whether a block matched.
    #[must_use]
    pub fn set_block_status(&self, block_id: &str, status: &str) -> bool {
        let Ok(status) = status.parse::<BlockStatus>() else {
            debug!(block_id, status, "ignoring unknown block status");
            return false;
        };
        let now = Utc::now().timestamp_millis();
        let changed = lock_or_recover(&self.inner.timeline).set_block_status(block_id, status, now);
        if changed {
            self.after_edit();
        }
        changed
    }

    /// Adds an alert and returns its id.
    ///
    /// `info` alerts acknowledge themselves after the configured timeout;
    /// `warning` and `error` alerts wait for a person.
    #[must_use]
    pub fn add_alert(&self, kind: AlertKind, message: String, block_id: Option<String>) -> i64 {
        let now = Utc::now().timestamp_millis();
        let id =
            lock_or_recover(&self.inner.timeline).add_alert(kind, message, block_id, now);
        if kind == AlertKind::Info {
            self.arm_auto_acknowledge(id);
        }
        self.after_edit();
        id
    }

    /// Marks an alert acknowledged and cancels its auto-acknowledge timer.
    #[must_use]
    pub fn acknowledge_alert(&self, alert_id: i64) -> bool {
        let changed = lock_or_recover(&self.inner.timeline).acknowledge_alert(alert_id);
        if changed {
            self.cancel_timer(alert_id);
            self.after_edit();
        }
        changed
    }

    /// Deletes an alert and cancels its auto-acknowledge timer.
    #[must_use]
    pub fn remove_alert(&self, alert_id: i64) -> bool {
        let changed = lock_or_recover(&self.inner.timeline).remove_alert(alert_id);
        if changed {
            self.cancel_timer(alert_id);
            self.after_edit();
        }
        changed
    }

    /// Turns synthesized status-transition alerts on or off.
    pub fn set_automatic_alerts(&self, enabled: bool) {
        let changed = {
            let mut timeline = lock_or_recover(&self.inner.timeline);
            let changed = timeline.automatic_alerts != enabled;
            timeline.automatic_alerts = enabled;
            changed
        };
        if changed {
            self.after_edit();
        }
    }

    /// Merges a patch into a block. Returns whether a block matched.
    #[must_use]
    pub fn update_block(&self, block_id: &str, patch: TimelineBlockPatch) -> bool {
        let changed = lock_or_recover(&self.inner.timeline).update_block(block_id, patch);
        if changed {
            self.after_edit();
        }
        changed
    }

    /// Adds a custom block and returns its derived id.
    #[must_use]
    pub fn add_block(&self, name: &str, start_time: &str, end_time: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let id =
            lock_or_recover(&self.inner.timeline).add_block(name, start_time, end_time, now);
        self.after_edit();
        id
    }

    /// Removes a custom block.
    ///
    /// The five canonical blocks are protected; trying to remove one
    /// notifies and returns `false`.
    #[must_use]
    pub fn remove_block(&self, block_id: &str) -> bool {
        let result = lock_or_recover(&self.inner.timeline).remove_block(block_id);
        match result {
            Ok(changed) => {
                if changed {
                    self.after_edit();
                }
                changed
            }
            Err(err) => {
                debug!(block_id, error = %err, "block removal rejected");
                self.inner.sink.warning(&err.to_string());
                false
            }
        }
    }

    /// Moves a block from one index to another.
    #[must_use]
    pub fn reorder_blocks(&self, from_index: usize, to_index: usize) -> bool {
        let changed = lock_or_recover(&self.inner.timeline).reorder_blocks(from_index, to_index);
        if changed {
            self.after_edit();
        }
        changed
    }

    /// Live timing of a block against the wall clock.
    #[must_use]
    pub fn block_timing(&self, block_id: &str) -> Option<BlockTiming> {
        self.block_timing_at(block_id, Local::now().naive_local())
    }

    /// Timing of a block against an explicit clock.
    #[must_use]
    pub fn block_timing_at(&self, block_id: &str, now: NaiveDateTime) -> Option<BlockTiming> {
        lock_or_recover(&self.inner.timeline).block_timing(block_id, now)
    }

    /// Overlaps and long gaps in the configured schedule.
    #[must_use]
    pub fn schedule_issues(&self) -> Vec<ScheduleIssue> {
        lock_or_recover(&self.inner.timeline).schedule_issues()
    }

    /// Display aggregate against the wall clock.
    #[must_use]
    pub fn summary(&self) -> TimelineSummary {
        self.summary_at(Local::now().naive_local())
    }

    /// Display aggregate against an explicit clock.
    #[must_use]
    pub fn summary_at(&self, now: NaiveDateTime) -> TimelineSummary {
        lock_or_recover(&self.inner.timeline).summary(now)
    }

    /// Writes the timeline to the remote document right now, skipping the
    /// debounce.
    ///
    /// Returns whether a write went out; `Ok(false)` covers the local-only
    /// mode and a write already in flight.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the store write fails.
    pub async fn flush_remote(&self) -> Result<bool, EngineError> {
        let Some(store) = self.inner.store.clone() else {
            return Ok(false);
        };
        let Some(wedding_id) = self.inner.config.wedding_id.clone() else {
            return Ok(false);
        };
        if self.inner.sync_in_progress.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let now = Utc::now().timestamp_millis();
        let document = {
            let timeline = lock_or_recover(&self.inner.timeline);
            timeline_document(&timeline, now)
        };
        let result = match document {
            Ok(fields) => store.set_merge(&timeline_path(&wedding_id), fields).await,
            Err(err) => Err(err),
        };
        self.inner.sync_in_progress.store(false, Ordering::SeqCst);
        result?;
        Ok(true)
    }

    /// Stops the writer, listeners and every pending alert timer.
    pub fn shutdown(&self) {
        for task in lock_or_recover(&self.tasks).drain(..) {
            task.abort();
        }
        for (_, timer) in lock_or_recover(&self.inner.timers).drain() {
            timer.abort();
        }
    }

    fn after_edit(&self) {
        bump(&self.inner.revision);
        bump(&self.inner.dirty);
    }

    fn arm_auto_acknowledge(&self, alert_id: i64) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.config.alert_auto_acknowledge).await;
            let acknowledged = lock_or_recover(&inner.timeline).acknowledge_alert(alert_id);
            lock_or_recover(&inner.timers).remove(&alert_id);
            if acknowledged {
                bump(&inner.revision);
                bump(&inner.dirty);
            }
        });
        if let Some(previous) = lock_or_recover(&self.inner.timers).insert(alert_id, handle) {
            previous.abort();
        }
    }

    fn cancel_timer(&self, alert_id: i64) {
        if let Some(timer) = lock_or_recover(&self.inner.timers).remove(&alert_id) {
            timer.abort();
        }
    }
}

impl Drop for TimelineService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Adopts a remote payload field by field, touching only fields that are
/// present, well-typed and actually different. Echoes of this replica's
/// own writes decode to identical fields and change nothing.
fn apply_remote(inner: &Arc<TimelineInner>, fields: TimelineFields) {
    let changed = {
        let mut timeline = lock_or_recover(&inner.timeline);
        let mut changed = false;
        if let Some(blocks) = fields.blocks
            && timeline.blocks != blocks
        {
            timeline.blocks = blocks;
            changed = true;
        }
        if let Some(alerts) = fields.alerts
            && timeline.alerts != alerts
        {
            timeline.alerts = alerts;
            changed = true;
        }
        if let Some(automatic) = fields.automatic_alerts
            && timeline.automatic_alerts != automatic
        {
            timeline.automatic_alerts = automatic;
            changed = true;
        }
        changed
    };
    if changed {
        bump(&inner.revision);
    }
}

async fn write_remote(inner: &Arc<TimelineInner>) {
    let Some(store) = inner.store.clone() else {
        return;
    };
    let Some(wedding_id) = inner.config.wedding_id.clone() else {
        return;
    };
    if inner.sync_in_progress.swap(true, Ordering::SeqCst) {
        return;
    }

    let now = Utc::now().timestamp_millis();
    let document = {
        let timeline = lock_or_recover(&inner.timeline);
        timeline_document(&timeline, now)
    };
    let result = match document {
        Ok(fields) => store.set_merge(&timeline_path(&wedding_id), fields).await,
        Err(err) => Err(err),
    };
    inner.sync_in_progress.store(false, Ordering::SeqCst);
    if let Err(err) = result {
        warn!(error = %err, "remote timeline write failed");
    }
}

fn bump(sender: &watch::Sender<u64>) {
    sender.send_modify(|revision| *revision += 1);
}

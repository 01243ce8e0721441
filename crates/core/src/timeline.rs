// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDateTime;
use runsheet_domain::{
    Alert, AlertKind, BlockStatus, BlockTiming, DomainError, ScheduleIssue, TimelineBlock,
    TimelineBlockPatch, block_timing, derive_block_id, fallback_block_id, validate_schedule,
};
use serde::{Deserialize, Serialize};

use crate::moments::MomentsBoard;
use crate::projection::project_block;

/// The time-boxed day-of aggregate: blocks with start/end times and delay
/// statuses, plus the alert list.
///
/// Per-block `moments` are a projection from a [`MomentsBoard`]; refresh
/// them through [`Timeline::project_moments`] whenever the board changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Ordered block list.
    pub blocks: Vec<TimelineBlock>,
    /// Active and acknowledged alerts, oldest first.
    pub alerts: Vec<Alert>,
    /// Whether status transitions synthesize alerts.
    pub automatic_alerts: bool,
}

/// Read-only aggregate for display, recomputed on each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    /// First block whose timing reports active, if any.
    pub active_block_id: Option<String>,
    /// Ids of blocks not currently on time.
    pub delayed_block_ids: Vec<String>,
    /// Alerts not yet acknowledged, oldest first.
    pub pending_alerts: Vec<Alert>,
    /// Current advisory schedule findings.
    pub schedule_issues: Vec<ScheduleIssue>,
}

impl Timeline {
    /// Creates a timeline from existing parts.
    #[must_use]
    pub const fn new(blocks: Vec<TimelineBlock>, alerts: Vec<Alert>, automatic_alerts: bool) -> Self {
        Self {
            blocks,
            alerts,
            automatic_alerts,
        }
    }

    /// Picks a fresh alert id, starting at `now_ms` and bumping past any
    /// collision with an existing alert.
    #[must_use]
    pub fn next_alert_id(&self, now_ms: i64) -> i64 {
        let mut candidate = now_ms;
        while self.alerts.iter().any(|alert| alert.id == candidate) {
            candidate += 1;
        }
        candidate
    }

    /// Sets a block's delay status.
    ///
    /// On an actual transition to a non-on-time status, with automatic
    /// alerts enabled, a `warning` ("ligero retraso") or `error`
    /// ("retrasado") alert referencing the block is appended. Returns
    /// whether the status changed.
    pub fn set_block_status(&mut self, block_id: &str, status: BlockStatus, now_ms: i64) -> bool {
        let Some(block) = self.blocks.iter_mut().find(|block| block.id == block_id) else {
            return false;
        };
        if block.status == status {
            return false;
        }
        block.status = status;
        let name = block.name.clone();

        if self.automatic_alerts {
            let synthesized = match status {
                BlockStatus::OnTime => None,
                BlockStatus::SlightlyDelayed => Some((
                    AlertKind::Warning,
                    format!("«{name}» va con ligero retraso"),
                )),
                BlockStatus::Delayed => {
                    Some((AlertKind::Error, format!("«{name}» va retrasado")))
                }
            };
            if let Some((kind, message)) = synthesized {
                self.add_alert(kind, message, Some(block_id.to_owned()), now_ms);
            }
        }
        true
    }

    /// Appends an unacknowledged alert and returns its id.
    ///
    /// `info` alerts are expected to be auto-acknowledged by the engine
    /// after its configured timeout; the aggregate itself has no clock.
    pub fn add_alert(
        &mut self,
        kind: AlertKind,
        message: String,
        block_id: Option<String>,
        now_ms: i64,
    ) -> i64 {
        let id = self.next_alert_id(now_ms);
        self.alerts.push(Alert::new(id, kind, message, block_id, now_ms));
        id
    }

    /// Marks an alert acknowledged; a terminal flag, the alert stays listed.
    ///
    /// Returns whether an alert matched.
    pub fn acknowledge_alert(&mut self, alert_id: i64) -> bool {
        match self.alerts.iter_mut().find(|alert| alert.id == alert_id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Deletes an alert entirely.
    ///
    /// Returns whether an alert matched.
    pub fn remove_alert(&mut self, alert_id: i64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|alert| alert.id != alert_id);
        self.alerts.len() != before
    }

    /// Shallow-merges a patch into a block (name, start, end).
    ///
    /// Returns whether a block matched.
    pub fn update_block(&mut self, block_id: &str, patch: TimelineBlockPatch) -> bool {
        match self.blocks.iter_mut().find(|block| block.id == block_id) {
            Some(block) => {
                patch.apply_to(block);
                true
            }
            None => false,
        }
    }

    /// Appends an on-time block with a slug id derived from `name`, falling
    /// back to a timestamp-based id. Returns the new block's id.
    pub fn add_block(&mut self, name: &str, start_time: &str, end_time: &str, now_ms: i64) -> String {
        let id = derive_block_id(name).unwrap_or_else(|| fallback_block_id(now_ms));
        self.blocks.push(TimelineBlock::new(
            id.clone(),
            name.to_owned(),
            start_time.to_owned(),
            end_time.to_owned(),
        ));
        id
    }

    /// Removes a user-added block.
    ///
    /// Returns whether a block matched.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ProtectedBlock`] for the baseline blocks,
    /// which cannot be deleted; state is unchanged.
    pub fn remove_block(&mut self, block_id: &str) -> Result<bool, DomainError> {
        if let Some(block) = self.blocks.iter().find(|block| block.id == block_id) {
            if block.is_protected() {
                return Err(DomainError::ProtectedBlock(block_id.to_owned()));
            }
        }
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != block_id);
        Ok(self.blocks.len() != before)
    }

    /// Standard array move of a block; no-op on out-of-range indices.
    ///
    /// Returns whether the move happened.
    pub fn reorder_blocks(&mut self, from_index: usize, to_index: usize) -> bool {
        if from_index >= self.blocks.len() || to_index >= self.blocks.len() {
            return false;
        }
        let block = self.blocks.remove(from_index);
        self.blocks.insert(to_index, block);
        true
    }

    /// Rebuilds every block's moment summaries from the board.
    pub fn project_moments(&mut self, board: &MomentsBoard) {
        for block in &mut self.blocks {
            project_block(block, board);
        }
    }

    /// Computes where a block stands relative to `now`.
    #[must_use]
    pub fn block_timing(&self, block_id: &str, now: NaiveDateTime) -> Option<BlockTiming> {
        self.blocks
            .iter()
            .find(|block| block.id == block_id)
            .map(|block| block_timing(block, now))
    }

    /// Walks consecutive block pairs flagging overlaps and oversized gaps.
    #[must_use]
    pub fn schedule_issues(&self) -> Vec<ScheduleIssue> {
        validate_schedule(&self.blocks)
    }

    /// Derives the display summary for `now`.
    #[must_use]
    pub fn summary(&self, now: NaiveDateTime) -> TimelineSummary {
        let active_block_id = self
            .blocks
            .iter()
            .find(|block| block_timing(block, now).is_active)
            .map(|block| block.id.clone());
        let delayed_block_ids = self
            .blocks
            .iter()
            .filter(|block| block.status != BlockStatus::OnTime)
            .map(|block| block.id.clone())
            .collect();
        let pending_alerts = self
            .alerts
            .iter()
            .filter(|alert| !alert.acknowledged)
            .cloned()
            .collect();
        TimelineSummary {
            active_block_id,
            delayed_block_ids,
            pending_alerts,
            schedule_issues: self.schedule_issues(),
        }
    }
}

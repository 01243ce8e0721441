// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::lock_or_recover;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Info,
    Error,
}

/// Fire-and-forget sink for user-facing notices (toasts in the product).
///
/// Implementations must never block and never fail; a notice is advisory.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sink that forwards notices as tracing events; the headless default.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn success(&self, message: &str) {
        info!(notice = "success", "{message}");
    }

    fn warning(&self, message: &str) {
        warn!(notice = "warning", "{message}");
    }

    fn info(&self, message: &str) {
        info!(notice = "info", "{message}");
    }

    fn error(&self, message: &str) {
        error!(notice = "error", "{message}");
    }
}

/// Sink that records every notice, for assertions in tests.
#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice recorded so far, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        lock_or_recover(&self.notices).clone()
    }

    /// The warning messages recorded so far, in order.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        lock_or_recover(&self.notices)
            .iter()
            .filter(|(level, _)| *level == NoticeLevel::Warning)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn record(&self, level: NoticeLevel, message: &str) {
        lock_or_recover(&self.notices).push((level, message.to_owned()));
    }
}

impl NotificationSink for RecordingSink {
    fn success(&self, message: &str) {
        self.record(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.record(NoticeLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.record(NoticeLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(NoticeLevel::Error, message);
    }
}

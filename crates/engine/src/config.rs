// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use runsheet_domain::Limits;
use std::time::Duration;

/// The mirror key the product has always used for the moments aggregate.
pub(crate) const DEFAULT_MIRROR_KEY: &str = "runsheetSpecialMoments";

/// Engine knobs; the defaults are the product's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// The active wedding scoping all document paths. `None` disables
    /// remote sync entirely; the services run mirror-only.
    pub wedding_id: Option<String>,
    /// Mirror slot holding the moments aggregate.
    pub mirror_key: String,
    /// Capacity caps for moments and their relation arrays.
    pub limits: Limits,
    /// How long the timeline writer waits after the last change.
    pub timeline_debounce: Duration,
    /// How long an `info` alert lives before acknowledging itself.
    pub alert_auto_acknowledge: Duration,
}

impl EngineConfig {
    /// Config scoped to one wedding, everything else defaulted.
    #[must_use]
    pub fn for_wedding(wedding_id: impl Into<String>) -> Self {
        Self {
            wedding_id: Some(wedding_id.into()),
            ..Self::default()
        }
    }

    /// Config with remote sync disabled.
    #[must_use]
    pub fn local_only() -> Self {
        Self::default()
    }

    /// Mirror key of the persisted validation-reminder flag, scoped per
    /// wedding so switching weddings re-arms the reminder.
    #[must_use]
    pub fn reminder_key(&self) -> String {
        format!(
            "{}:reminder:{}",
            self.mirror_key,
            self.wedding_id.as_deref().unwrap_or("global")
        )
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wedding_id: None,
            mirror_key: String::from(DEFAULT_MIRROR_KEY),
            limits: Limits::default(),
            timeline_debounce: Duration::from_millis(1000),
            alert_auto_acknowledge: Duration::from_millis(300_000),
        }
    }
}

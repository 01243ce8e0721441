// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::moment::{MomentKind, MomentState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Baseline timeline blocks that cannot be deleted.
pub const PROTECTED_BLOCK_IDS: [&str; 5] =
    ["preparativos", "ceremonia", "coctel", "banquete", "fiesta"];

/// Represents the delay status of a timeline block.
///
/// Transitions happen only through an explicit status change; unknown wire
/// values are rejected rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlockStatus {
    /// Running as planned.
    #[default]
    #[serde(rename = "on-time")]
    OnTime,
    /// Running behind by a few minutes.
    #[serde(rename = "slightly-delayed")]
    SlightlyDelayed,
    /// Seriously behind schedule.
    #[serde(rename = "delayed")]
    Delayed,
}

impl BlockStatus {
    /// Returns the wire representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "on-time",
            Self::SlightlyDelayed => "slightly-delayed",
            Self::Delayed => "delayed",
        }
    }
}

impl FromStr for BlockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on-time" => Ok(Self::OnTime),
            "slightly-delayed" => Ok(Self::SlightlyDelayed),
            "delayed" => Ok(Self::Delayed),
            _ => Err(DomainError::InvalidBlockStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Informational; self-acknowledges after a timeout.
    #[default]
    Info,
    /// Needs attention; never self-acknowledges.
    Warning,
    /// Something went wrong; never self-acknowledges.
    Error,
}

impl AlertKind {
    /// Returns the wire representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl FromStr for AlertKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(DomainError::InvalidAlertKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A day-of alert, synthesized from a status change or added manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique id (millisecond timestamp in practice).
    pub id: i64,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Human-readable message.
    pub message: String,
    /// The timeline block this alert refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    /// Creation time in milliseconds.
    pub timestamp: i64,
    /// Terminal flag; acknowledged alerts stay in the list until removed.
    #[serde(default)]
    pub acknowledged: bool,
}

impl Alert {
    /// Creates a new, unacknowledged `Alert`.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique alert id
    /// * `kind` - Severity
    /// * `message` - Human-readable message
    /// * `block_id` - The timeline block this alert refers to, if any
    /// * `timestamp` - Creation time in milliseconds
    #[must_use]
    pub const fn new(
        id: i64,
        kind: AlertKind,
        message: String,
        block_id: Option<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            kind,
            message,
            block_id,
            timestamp,
            acknowledged: false,
        }
    }
}

/// The projection of one moment into a timeline block.
///
/// Derived wholesale from the moments aggregate; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentSummary {
    pub id: i64,
    pub title: String,
    /// The moment's own time, or the owning block's start time.
    pub time: String,
    /// The moment's own duration, or the projection default ("15").
    pub duration: String,
    /// First responsable's name, or empty.
    pub responsible: String,
    /// The moment's confirmation state.
    pub status: MomentState,
    pub song: String,
    #[serde(rename = "type")]
    pub kind: MomentKind,
}

/// A time-boxed phase of the event day, as shown on the live board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineBlock {
    /// URL-safe identifier, unique within the timeline.
    pub id: String,
    /// Display name; free text.
    pub name: String,
    /// Planned start, "hh:mm".
    pub start_time: String,
    /// Planned end, "hh:mm"; an end hour below the start hour means the
    /// block crosses midnight.
    pub end_time: String,
    /// Delay status.
    pub status: BlockStatus,
    /// Per-block alert slot kept for wire compatibility; alerts live at the
    /// timeline level.
    pub alerts: Vec<Alert>,
    /// Read-mostly projection from the moments aggregate.
    pub moments: Vec<MomentSummary>,
}

impl TimelineBlock {
    /// Creates an on-time block with no alerts and no projected moments.
    ///
    /// # Arguments
    ///
    /// * `id` - URL-safe identifier
    /// * `name` - Display name
    /// * `start_time` - Planned start, "hh:mm"
    /// * `end_time` - Planned end, "hh:mm"
    #[must_use]
    pub const fn new(id: String, name: String, start_time: String, end_time: String) -> Self {
        Self {
            id,
            name,
            start_time,
            end_time,
            status: BlockStatus::OnTime,
            alerts: Vec::new(),
            moments: Vec::new(),
        }
    }

    /// Whether this block is one of the protected baseline blocks.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        PROTECTED_BLOCK_IDS.contains(&self.id.as_str())
    }
}

/// A shallow set of changes applied onto an existing timeline block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineBlockPatch {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl TimelineBlockPatch {
    /// Applies every set field onto `block`, consuming the patch.
    pub fn apply_to(self, block: &mut TimelineBlock) {
        if let Some(name) = self.name {
            block.name = name;
        }
        if let Some(start_time) = self.start_time {
            block.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            block.end_time = end_time;
        }
    }
}

// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::timeline::TimelineBlock;
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Largest idle interval between consecutive blocks that passes schedule
/// validation without a `gap` issue, in minutes.
pub const MAX_SCHEDULE_GAP_MINUTES: i64 = 60;

/// Strict "hh:mm" parser.
///
/// Accepts one or two hour digits (0-23) and exactly two minute digits
/// (00-59); anything else is `None`. Deliberately stricter than a general
/// time parser: "7:5" is rejected even though "7:05" is fine.
#[must_use]
pub fn parse_hh_mm(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Where a timeline block stands relative to a wall-clock instant.
///
/// Exactly one of the three flags is set for a block with parseable times;
/// all are false when either time fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockTiming {
    /// `now` falls inside the block's window.
    pub is_active: bool,
    /// The block's window has already closed.
    pub is_past: bool,
    /// The block's window has not opened yet.
    pub is_future: bool,
    /// Minutes until the window closes; zero unless active.
    pub minutes_remaining: i64,
    /// Minutes since the window closed; zero unless past.
    pub minutes_exceeded: i64,
}

/// Computes where `block` stands relative to `now`.
///
/// Both times are anchored to `now`'s date; an end hour numerically below
/// the start hour means the block runs past midnight, so the end is pushed
/// to the next day.
#[must_use]
pub fn block_timing(block: &TimelineBlock, now: NaiveDateTime) -> BlockTiming {
    let Some(start) = parse_hh_mm(block.start_time.trim()) else {
        return BlockTiming::default();
    };
    let Some(end) = parse_hh_mm(block.end_time.trim()) else {
        return BlockTiming::default();
    };

    let start_at: NaiveDateTime = now.date().and_time(start);
    let mut end_at: NaiveDateTime = now.date().and_time(end);
    if end.hour() < start.hour() {
        end_at += Duration::days(1);
    }

    if now < start_at {
        BlockTiming {
            is_future: true,
            ..BlockTiming::default()
        }
    } else if now > end_at {
        BlockTiming {
            is_past: true,
            minutes_exceeded: (now - end_at).num_minutes(),
            ..BlockTiming::default()
        }
    } else {
        BlockTiming {
            is_active: true,
            minutes_remaining: (end_at - now).num_minutes(),
            ..BlockTiming::default()
        }
    }
}

/// Represents the kind of a schedule issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleIssueKind {
    /// A block starts before the previous one ends.
    Overlap,
    /// The idle interval between two blocks exceeds
    /// [`MAX_SCHEDULE_GAP_MINUTES`].
    Gap,
}

impl ScheduleIssueKind {
    /// Returns the wire representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::Gap => "gap",
        }
    }
}

/// A purely advisory finding from [`validate_schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleIssue {
    /// What went wrong.
    pub kind: ScheduleIssueKind,
    /// Id of the earlier block of the pair.
    pub first_block_id: String,
    /// Id of the later block of the pair.
    pub second_block_id: String,
    /// Human-readable description naming both blocks.
    pub message: String,
}

/// Walks consecutive block pairs in list order, flagging overlaps and
/// oversized gaps.
///
/// Pairs with unparseable times are skipped. Findings never block an
/// operation; they exist to be displayed.
#[must_use]
pub fn validate_schedule(blocks: &[TimelineBlock]) -> Vec<ScheduleIssue> {
    let mut issues: Vec<ScheduleIssue> = Vec::new();

    for pair in blocks.windows(2) {
        let [first, second] = pair else {
            continue;
        };
        let Some(first_start) = parse_hh_mm(first.start_time.trim()) else {
            continue;
        };
        let Some(first_end) = parse_hh_mm(first.end_time.trim()) else {
            continue;
        };
        let Some(second_start) = parse_hh_mm(second.start_time.trim()) else {
            continue;
        };

        let mut first_end_minutes = minutes_since_midnight(first_end);
        if first_end.hour() < first_start.hour() {
            first_end_minutes += 24 * 60;
        }
        let second_start_minutes = minutes_since_midnight(second_start);

        if first_end_minutes > second_start_minutes {
            issues.push(ScheduleIssue {
                kind: ScheduleIssueKind::Overlap,
                first_block_id: first.id.clone(),
                second_block_id: second.id.clone(),
                message: format!("«{}» se solapa con «{}»", first.name, second.name),
            });
        } else {
            let idle = second_start_minutes - first_end_minutes;
            if idle > MAX_SCHEDULE_GAP_MINUTES {
                issues.push(ScheduleIssue {
                    kind: ScheduleIssueKind::Gap,
                    first_block_id: first.id.clone(),
                    second_block_id: second.id.clone(),
                    message: format!(
                        "Hueco de {idle} minutos entre «{}» y «{}»",
                        first.name, second.name
                    ),
                });
            }
        }
    }

    issues
}

fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

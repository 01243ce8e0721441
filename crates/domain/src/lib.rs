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

mod block;
mod error;
mod moment;
mod timeline;
mod timing;
mod validation;

#[cfg(test)]
mod tests;

pub use block::{Block, derive_block_id, fallback_block_id};
pub use error::DomainError;
pub use moment::{Limits, Moment, MomentKind, MomentPatch, MomentState, Responsible};

// Re-export public types
pub use timeline::{
    Alert, AlertKind, BlockStatus, MomentSummary, PROTECTED_BLOCK_IDS, TimelineBlock,
    TimelineBlockPatch,
};
pub use timing::{
    BlockTiming, MAX_SCHEDULE_GAP_MINUTES, ScheduleIssue, ScheduleIssueKind, block_timing,
    parse_hh_mm, validate_schedule,
};
pub use validation::{
    MSG_INVALID_TIME, MSG_RESPONSIBLE_REQUIRED, MSG_SONG_REQUIRED, MSG_TITLE_REQUIRED,
    validate_moment,
};

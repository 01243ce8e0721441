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

//! The two run-of-show aggregates and their pure state transitions.
//!
//! [`MomentsBoard`] owns the canonical blocks-and-moments structure the
//! editor works on; [`Timeline`] owns the time-boxed day-of board with its
//! delay statuses and alerts. Every operation here is a synchronous,
//! side-effect-free transition over in-memory state; persistence, user
//! notification and timers belong to `runsheet-engine`.

mod defaults;
mod moments;
mod projection;
mod timeline;

#[cfg(test)]
mod tests;

pub use defaults::{default_board, default_timeline};
pub use moments::{MomentsBoard, MoveDirection};
pub use projection::{moments_key_for, timeline_key_for};
pub use timeline::{Timeline, TimelineSummary};

// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The id remap between the timeline board and the moments aggregate.
//!
//! The product historically stored the cocktail moments under `coctail`
//! while the timing board labels the block `coctel`. The pair lives in one
//! bidirectional table here; nothing else in the workspace compares these
//! strings.

use runsheet_domain::{MomentSummary, Responsible, TimelineBlock};

use crate::moments::MomentsBoard;

/// Timeline block id ↔ moments block id pairs that differ.
const BLOCK_KEY_REMAP: [(&str, &str); 1] = [("coctel", "coctail")];

/// Maps a timeline block id to the moments-aggregate key it reads from.
#[must_use]
pub fn moments_key_for(timeline_block_id: &str) -> &str {
    for (timeline_id, moments_id) in &BLOCK_KEY_REMAP {
        if *timeline_id == timeline_block_id {
            return moments_id;
        }
    }
    timeline_block_id
}

/// Maps a moments-aggregate key to the timeline block id that shows it.
#[must_use]
pub fn timeline_key_for(moments_block_id: &str) -> &str {
    for (timeline_id, moments_id) in &BLOCK_KEY_REMAP {
        if *moments_id == moments_block_id {
            return timeline_id;
        }
    }
    moments_block_id
}

/// Rebuilds one timeline block's moment summaries from the board.
///
/// A full replacement, never a merge: the timeline is not authoritative for
/// moment content.
pub(crate) fn project_block(block: &mut TimelineBlock, board: &MomentsBoard) {
    let key = moments_key_for(&block.id);
    let Some(list) = board.moments.get(key) else {
        block.moments = Vec::new();
        return;
    };
    block.moments = list
        .iter()
        .map(|moment| MomentSummary {
            id: moment.id,
            title: moment.title.clone(),
            time: if moment.time.trim().is_empty() {
                block.start_time.clone()
            } else {
                moment.time.clone()
            },
            duration: if moment.duration.trim().is_empty() {
                String::from("15")
            } else {
                moment.duration.clone()
            },
            responsible: moment
                .responsables
                .first()
                .map(|responsible: &Responsible| responsible.name.clone())
                .unwrap_or_default(),
            status: moment.state,
            song: moment.song.clone(),
            kind: moment.kind,
        })
        .collect();
}

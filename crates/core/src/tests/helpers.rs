// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::MomentsBoard;
use runsheet_domain::{Block, Limits, Moment};
use std::collections::BTreeMap;

/// Fixed "now" used for deterministic id allocation in tests.
pub const NOW_MS: i64 = 1_700_000_000_000;

pub fn default_limits() -> Limits {
    Limits::default()
}

/// A two-block board: block "a" holding `count` moments (ids 1..=count),
/// block "b" empty.
pub fn board_with_moments(count: usize) -> MomentsBoard {
    let blocks = vec![
        Block::new(String::from("a"), String::from("Bloque A")),
        Block::new(String::from("b"), String::from("Bloque B")),
    ];
    let mut moments: BTreeMap<String, Vec<Moment>> = BTreeMap::new();
    let list: Vec<Moment> = (1..=count)
        .map(|index| {
            let mut moment = Moment::new(i64::try_from(index).unwrap(), index);
            moment.title = format!("Momento {index}");
            moment
        })
        .collect();
    moments.insert(String::from("a"), list);
    moments.insert(String::from("b"), Vec::new());
    MomentsBoard::new(blocks, moments)
}

/// Asserts a block's `order` fields form the contiguous permutation `1..N`.
pub fn assert_contiguous_order(board: &MomentsBoard, block_id: &str) {
    let list = board.moments.get(block_id).expect("block should exist");
    let orders: Vec<usize> = list.iter().map(|moment| moment.order).collect();
    let expected: Vec<usize> = (1..=list.len()).collect();
    assert_eq!(orders, expected, "orders in block '{block_id}' not contiguous");
}

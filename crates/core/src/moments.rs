// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use runsheet_domain::{
    Block, DomainError, Limits, Moment, MomentPatch, derive_block_id, fallback_block_id,
    validate_moment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a single-step reorder within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Swap with the previous moment.
    Up,
    /// Swap with the next moment.
    Down,
}

/// The canonical blocks-and-moments aggregate.
///
/// The moments map is a `BTreeMap` so the aggregate serializes with a
/// deterministic key order; the engine's sync loop guard compares serialized
/// strings and must not see spurious differences.
///
/// Every mutating operation leaves the `order` fields of each touched list
/// as the contiguous permutation `1..N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentsBoard {
    /// Ordered, user-editable block list.
    pub blocks: Vec<Block>,
    /// Moment lists keyed by block id.
    pub moments: BTreeMap<String, Vec<Moment>>,
}

impl MomentsBoard {
    /// Creates a board from existing parts.
    #[must_use]
    pub const fn new(blocks: Vec<Block>, moments: BTreeMap<String, Vec<Moment>>) -> Self {
        Self { blocks, moments }
    }

    /// Picks a fresh moment id, starting at `now_ms` and bumping past any
    /// collision with an existing moment.
    #[must_use]
    pub fn next_moment_id(&self, now_ms: i64) -> i64 {
        let mut candidate = now_ms;
        while self
            .moments
            .values()
            .flatten()
            .any(|moment| moment.id == candidate)
        {
            candidate += 1;
        }
        candidate
    }

    /// Appends a new moment to `block_id`, defaulted and then overridden by
    /// `draft`, creating the moment list when the block has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::BlockAtCapacity`] when the block already holds
    /// the configured maximum, and the relation-cap errors when the draft
    /// itself exceeds a cap. State is unchanged on error.
    pub fn add_moment(
        &mut self,
        block_id: &str,
        draft: MomentPatch,
        limits: &Limits,
        now_ms: i64,
    ) -> Result<i64, DomainError> {
        draft.check_relation_caps(limits)?;
        let len = self.moments.get(block_id).map_or(0, Vec::len);
        if len >= limits.moments_per_block {
            return Err(DomainError::BlockAtCapacity {
                block_id: block_id.to_owned(),
                cap: limits.moments_per_block,
            });
        }

        let id = self.next_moment_id(now_ms);
        let mut moment = Moment::new(id, len + 1);
        draft.apply_to(&mut moment);
        moment.id = id;
        moment.order = len + 1;
        moment.suppliers = dedup_suppliers(moment.suppliers);
        self.moments.entry(block_id.to_owned()).or_default().push(moment);
        Ok(id)
    }

    /// Removes a moment by id and renumbers the survivors `1..N`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_moment(&mut self, block_id: &str, moment_id: i64) -> bool {
        let Some(list) = self.moments.get_mut(block_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|moment| moment.id != moment_id);
        if list.len() == before {
            return false;
        }
        renumber(list);
        true
    }

    /// Shallow-merges `changes` into the matching moment.
    ///
    /// Supplier patches are deduplicated case-insensitively (first occurrence
    /// wins) before the cap check. Returns whether a moment matched.
    ///
    /// # Errors
    ///
    /// Returns the relation-cap errors when the patch would exceed a cap;
    /// state is unchanged.
    pub fn update_moment(
        &mut self,
        block_id: &str,
        moment_id: i64,
        mut changes: MomentPatch,
        limits: &Limits,
    ) -> Result<bool, DomainError> {
        if let Some(suppliers) = changes.suppliers.take() {
            changes.suppliers = Some(dedup_suppliers(suppliers));
        }
        changes.check_relation_caps(limits)?;

        let Some(moment) = self
            .moments
            .get_mut(block_id)
            .and_then(|list| list.iter_mut().find(|moment| moment.id == moment_id))
        else {
            return Ok(false);
        };
        changes.apply_to(moment);
        Ok(true)
    }

    /// Swaps a moment with its immediate neighbor; no-op at a list boundary.
    ///
    /// Returns whether a swap happened.
    pub fn reorder_moment(
        &mut self,
        block_id: &str,
        moment_id: i64,
        direction: MoveDirection,
    ) -> bool {
        let Some(list) = self.moments.get_mut(block_id) else {
            return false;
        };
        let Some(index) = list.iter().position(|moment| moment.id == moment_id) else {
            return false;
        };
        let neighbor = match direction {
            MoveDirection::Up => {
                let Some(neighbor) = index.checked_sub(1) else {
                    return false;
                };
                neighbor
            }
            MoveDirection::Down => {
                if index + 1 >= list.len() {
                    return false;
                }
                index + 1
            }
        };
        list.swap(index, neighbor);
        renumber(list);
        true
    }

    /// Removes and reinserts a moment at `to_index` (0-based) within the same
    /// block; no-op when the id is unknown or the index is out of bounds.
    ///
    /// Returns whether the move happened.
    pub fn move_moment(&mut self, block_id: &str, moment_id: i64, to_index: usize) -> bool {
        let Some(list) = self.moments.get_mut(block_id) else {
            return false;
        };
        let Some(index) = list.iter().position(|moment| moment.id == moment_id) else {
            return false;
        };
        if to_index >= list.len() {
            return false;
        }
        let moment = list.remove(index);
        list.insert(to_index, moment);
        renumber(list);
        true
    }

    /// Moves a moment from one block to another, inserting at `to_index`
    /// (clamped to an append when beyond the destination's end).
    ///
    /// With `from == to` this behaves exactly as [`Self::move_moment`].
    /// Returns whether the move happened.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::BlockAtCapacity`] when the destination is full;
    /// state is unchanged.
    pub fn move_moment_between_blocks(
        &mut self,
        from: &str,
        to: &str,
        moment_id: i64,
        to_index: usize,
        limits: &Limits,
    ) -> Result<bool, DomainError> {
        if from == to {
            return Ok(self.move_moment(from, moment_id, to_index));
        }

        let Some(index) = self
            .moments
            .get(from)
            .and_then(|list| list.iter().position(|moment| moment.id == moment_id))
        else {
            return Ok(false);
        };
        if self.moments.get(to).map_or(0, Vec::len) >= limits.moments_per_block {
            return Err(DomainError::BlockAtCapacity {
                block_id: to.to_owned(),
                cap: limits.moments_per_block,
            });
        }

        let moment = match self.moments.get_mut(from) {
            Some(source) => source.remove(index),
            None => return Ok(false),
        };
        if let Some(source) = self.moments.get_mut(from) {
            renumber(source);
        }
        let destination = self.moments.entry(to.to_owned()).or_default();
        let at = to_index.min(destination.len());
        destination.insert(at, moment);
        renumber(destination);
        Ok(true)
    }

    /// Clones a moment under a fresh id.
    ///
    /// With `to` absent or equal to the source block, the copy lands
    /// immediately after the original; otherwise it is appended to the
    /// destination. `responsables` are deep-cloned with fresh sub-ids,
    /// `suppliers` are copied as-is. Returns the new id, or `None` when the
    /// source moment does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::BlockAtCapacity`] when the target block is
    /// full; state is unchanged.
    pub fn duplicate_moment(
        &mut self,
        from: &str,
        moment_id: i64,
        to: Option<&str>,
        limits: &Limits,
        now_ms: i64,
    ) -> Result<Option<i64>, DomainError> {
        let Some((index, original)) = self
            .moments
            .get(from)
            .and_then(|list| {
                list.iter()
                    .position(|moment| moment.id == moment_id)
                    .map(|index| (index, list[index].clone()))
            })
        else {
            return Ok(None);
        };

        let target = to.unwrap_or(from);
        if self.moments.get(target).map_or(0, Vec::len) >= limits.moments_per_block {
            return Err(DomainError::BlockAtCapacity {
                block_id: target.to_owned(),
                cap: limits.moments_per_block,
            });
        }

        let id = self.next_moment_id(now_ms);
        let mut copy = original;
        copy.id = id;
        for (offset, responsible) in (1_i64..).zip(copy.responsables.iter_mut()) {
            responsible.id = id + offset;
        }

        if target == from {
            if let Some(list) = self.moments.get_mut(from) {
                list.insert(index + 1, copy);
                renumber(list);
            }
        } else {
            let destination = self.moments.entry(target.to_owned()).or_default();
            destination.push(copy);
            renumber(destination);
        }
        Ok(Some(id))
    }

    /// Adds a block with a slug id derived from `name`, falling back to a
    /// timestamp-based id, and creates its empty moment list.
    ///
    /// Returns the new block's id.
    pub fn add_block(&mut self, name: &str, now_ms: i64) -> String {
        let id = derive_block_id(name).unwrap_or_else(|| fallback_block_id(now_ms));
        self.blocks.push(Block::new(id.clone(), name.to_owned()));
        self.moments.entry(id.clone()).or_default();
        id
    }

    /// Updates a block's display name; ids are immutable.
    ///
    /// Returns whether a block matched.
    pub fn rename_block(&mut self, block_id: &str, new_name: &str) -> bool {
        match self.blocks.iter_mut().find(|block| block.id == block_id) {
            Some(block) => {
                block.name = new_name.to_owned();
                true
            }
            None => false,
        }
    }

    /// Removes a block and its moment list entirely.
    ///
    /// Returns whether a block matched.
    pub fn remove_block(&mut self, block_id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != block_id);
        self.moments.remove(block_id);
        self.blocks.len() != before
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

    /// Runs [`validate_moment`] over every moment of a block, keeping only
    /// entries with at least one finding.
    #[must_use]
    pub fn moment_validation_errors(
        &self,
        block_id: &str,
        limits: &Limits,
    ) -> BTreeMap<i64, Vec<String>> {
        let mut findings: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        if let Some(list) = self.moments.get(block_id) {
            for moment in list {
                let errors = validate_moment(moment, limits);
                if !errors.is_empty() {
                    findings.insert(moment.id, errors);
                }
            }
        }
        findings
    }
}

/// Rewrites a list's `order` fields as the contiguous permutation `1..N`.
fn renumber(list: &mut [Moment]) {
    for (index, moment) in list.iter_mut().enumerate() {
        moment.order = index + 1;
    }
}

/// Case-insensitive dedup preserving first occurrence and original casing.
fn dedup_suppliers(suppliers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(suppliers.len());
    let mut out: Vec<String> = Vec::with_capacity(suppliers.len());
    for supplier in suppliers {
        let folded = supplier.trim().to_lowercase();
        if folded.is_empty() || seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        out.push(supplier);
    }
    out
}

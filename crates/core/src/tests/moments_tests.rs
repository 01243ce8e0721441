// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{NOW_MS, assert_contiguous_order, board_with_moments, default_limits};
use crate::{MomentsBoard, MoveDirection, default_board};
use runsheet_domain::{DomainError, Limits, MomentKind, MomentPatch, Responsible};

#[test]
fn add_moment_appends_with_defaults_and_next_order() {
    let mut board = board_with_moments(2);
    let limits = default_limits();

    let draft = MomentPatch {
        title: Some(String::from("Brindis")),
        kind: Some(MomentKind::Discurso),
        ..MomentPatch::default()
    };
    let id = board.add_moment("a", draft, &limits, NOW_MS).expect("should add");

    let list = &board.moments["a"];
    assert_eq!(list.len(), 3);
    let added = list.last().unwrap();
    assert_eq!(added.id, id);
    assert_eq!(added.order, 3);
    assert_eq!(added.title, "Brindis");
    assert_eq!(added.kind, MomentKind::Discurso);
    assert_eq!(added.song, "");
    assert_contiguous_order(&board, "a");
}

#[test]
fn add_moment_creates_missing_block_list() {
    let mut board = board_with_moments(0);
    let limits = default_limits();

    board
        .add_moment("bienvenida", MomentPatch::default(), &limits, NOW_MS)
        .expect("should add into a fresh list");

    assert_eq!(board.moments["bienvenida"].len(), 1);
    assert_eq!(board.moments["bienvenida"][0].order, 1);
}

#[test]
fn add_moment_at_capacity_is_rejected_and_state_unchanged() {
    let limits = Limits::new(2, 12, 12);
    let mut board = board_with_moments(2);
    let before = board.clone();

    let result = board.add_moment("a", MomentPatch::default(), &limits, NOW_MS);

    assert_eq!(
        result,
        Err(DomainError::BlockAtCapacity {
            block_id: String::from("a"),
            cap: 2
        })
    );
    assert_eq!(board, before);
}

#[test]
fn moment_ids_bump_past_collisions() {
    let board = board_with_moments(3);
    // ids 1..=3 exist; asking for 1 must walk past all of them.
    assert_eq!(board.next_moment_id(1), 4);
    assert_eq!(board.next_moment_id(NOW_MS), NOW_MS);
}

#[test]
fn remove_moment_renumbers_survivors() {
    let mut board = board_with_moments(4);

    assert!(board.remove_moment("a", 2));

    let list = &board.moments["a"];
    assert_eq!(list.len(), 3);
    assert_eq!(
        list.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![1, 3, 4]
    );
    assert_contiguous_order(&board, "a");
}

#[test]
fn remove_moment_unknown_id_is_noop() {
    let mut board = board_with_moments(2);
    let before = board.clone();

    assert!(!board.remove_moment("a", 99));
    assert!(!board.remove_moment("missing", 1));
    assert_eq!(board, before);
}

#[test]
fn update_moment_merges_changes_shallowly() {
    let mut board = board_with_moments(2);
    let limits = default_limits();

    let changed = board
        .update_moment(
            "a",
            1,
            MomentPatch {
                song: Some(String::from("Perfect – Ed Sheeran")),
                time: Some(String::from("18:30")),
                ..MomentPatch::default()
            },
            &limits,
        )
        .expect("caps not exceeded");

    assert!(changed);
    let moment = &board.moments["a"][0];
    assert_eq!(moment.song, "Perfect – Ed Sheeran");
    assert_eq!(moment.time, "18:30");
    assert_eq!(moment.title, "Momento 1");
}

#[test]
fn update_moment_unknown_id_is_noop() {
    let mut board = board_with_moments(1);
    let limits = default_limits();
    let before = board.clone();

    let changed = board
        .update_moment("a", 42, MomentPatch::default(), &limits)
        .expect("no caps involved");

    assert!(!changed);
    assert_eq!(board, before);
}

#[test]
fn update_moment_dedups_suppliers_case_insensitively() {
    let mut board = board_with_moments(1);
    let limits = default_limits();

    board
        .update_moment(
            "a",
            1,
            MomentPatch {
                suppliers: Some(vec![
                    String::from("Floristería Rosa"),
                    String::from("floristería rosa"),
                    String::from("Catering Sur"),
                    String::from("  "),
                ]),
                ..MomentPatch::default()
            },
            &limits,
        )
        .expect("caps not exceeded");

    assert_eq!(
        board.moments["a"][0].suppliers,
        vec![String::from("Floristería Rosa"), String::from("Catering Sur")]
    );
}

#[test]
fn update_moment_over_responsables_cap_is_rejected() {
    let limits = Limits::new(200, 2, 2);
    let mut board = board_with_moments(1);
    let before = board.clone();

    let too_many: Vec<Responsible> = (0..3)
        .map(|i| Responsible::new(i, String::new(), format!("Persona {i}"), String::new()))
        .collect();
    let result = board.update_moment(
        "a",
        1,
        MomentPatch {
            responsables: Some(too_many),
            ..MomentPatch::default()
        },
        &limits,
    );

    assert_eq!(result, Err(DomainError::ResponsablesAtCapacity { cap: 2 }));
    assert_eq!(board, before);
}

#[test]
fn reorder_moment_swaps_with_neighbor() {
    let mut board = board_with_moments(3);

    assert!(board.reorder_moment("a", 3, MoveDirection::Up));

    let ids: Vec<i64> = board.moments["a"].iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 3, 2]);
    assert_contiguous_order(&board, "a");
}

#[test]
fn reorder_moment_at_boundary_is_noop() {
    let mut board = board_with_moments(3);
    let before = board.clone();

    assert!(!board.reorder_moment("a", 1, MoveDirection::Up));
    assert!(!board.reorder_moment("a", 3, MoveDirection::Down));
    assert_eq!(board, before);
}

#[test]
fn move_moment_reinserts_at_index() {
    let mut board = board_with_moments(4);

    assert!(board.move_moment("a", 4, 0));

    let ids: Vec<i64> = board.moments["a"].iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![4, 1, 2, 3]);
    assert_contiguous_order(&board, "a");
}

#[test]
fn move_moment_out_of_bounds_is_noop() {
    let mut board = board_with_moments(2);
    let before = board.clone();

    assert!(!board.move_moment("a", 1, 2));
    assert!(!board.move_moment("a", 99, 0));
    assert_eq!(board, before);
}

#[test]
fn move_between_blocks_renumbers_both_lists() {
    let mut board = board_with_moments(3);
    let limits = default_limits();

    let moved = board
        .move_moment_between_blocks("a", "b", 2, 0, &limits)
        .expect("destination has room");

    assert!(moved);
    assert_eq!(
        board.moments["a"].iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(
        board.moments["b"].iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![2]
    );
    assert_contiguous_order(&board, "a");
    assert_contiguous_order(&board, "b");
}

#[test]
fn move_between_blocks_clamps_index_to_append() {
    let mut board = board_with_moments(2);
    let limits = default_limits();

    let moved = board
        .move_moment_between_blocks("a", "b", 1, 10, &limits)
        .expect("destination has room");

    assert!(moved);
    assert_eq!(board.moments["b"][0].id, 1);
    assert_eq!(board.moments["b"][0].order, 1);
}

#[test]
fn move_between_blocks_same_block_behaves_as_move() {
    let mut board = board_with_moments(3);
    let limits = default_limits();

    let moved = board
        .move_moment_between_blocks("a", "a", 3, 0, &limits)
        .expect("same-block move");

    assert!(moved);
    assert_eq!(
        board.moments["a"].iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![3, 1, 2]
    );
}

#[test]
fn move_between_blocks_full_destination_is_rejected() {
    let limits = Limits::new(3, 12, 12);
    let mut board = board_with_moments(3);
    board
        .move_moment_between_blocks("a", "b", 1, 0, &limits)
        .expect("first move fits");
    board
        .move_moment_between_blocks("a", "b", 2, 0, &limits)
        .expect("second move fits");
    board
        .move_moment_between_blocks("a", "b", 3, 0, &limits)
        .expect("third move fits");
    let before = board.clone();

    board
        .add_moment("a", MomentPatch::default(), &limits, NOW_MS)
        .expect("source has room again");
    let id = board.moments["a"][0].id;
    let result = board.move_moment_between_blocks("a", "b", id, 0, &limits);

    assert_eq!(
        result,
        Err(DomainError::BlockAtCapacity {
            block_id: String::from("b"),
            cap: 3
        })
    );
    assert_eq!(board.moments["b"], before.moments["b"]);
}

#[test]
fn duplicate_into_same_block_lands_after_original() {
    let mut board = board_with_moments(3);
    let limits = default_limits();

    let id = board
        .duplicate_moment("a", 1, None, &limits, NOW_MS)
        .expect("room available")
        .expect("source exists");

    let list = &board.moments["a"];
    assert_eq!(list.len(), 4);
    assert_eq!(list[0].id, 1);
    assert_eq!(list[1].id, id);
    assert_eq!(list[1].title, "Momento 1");
    assert_contiguous_order(&board, "a");
}

#[test]
fn duplicate_into_other_block_appends_with_fresh_sub_ids() {
    let mut board = board_with_moments(1);
    let limits = default_limits();
    board
        .update_moment(
            "a",
            1,
            MomentPatch {
                responsables: Some(vec![Responsible::new(
                    7,
                    String::from("oficiante"),
                    String::from("Ana"),
                    String::new(),
                )]),
                suppliers: Some(vec![String::from("Sonido Norte")]),
                ..MomentPatch::default()
            },
            &limits,
        )
        .expect("caps not exceeded");

    let id = board
        .duplicate_moment("a", 1, Some("b"), &limits, NOW_MS)
        .expect("room available")
        .expect("source exists");

    let copy = &board.moments["b"][0];
    assert_eq!(copy.id, id);
    assert_eq!(copy.order, 1);
    assert_eq!(copy.suppliers, vec![String::from("Sonido Norte")]);
    assert_eq!(copy.responsables.len(), 1);
    assert_ne!(copy.responsables[0].id, 7);
    assert_eq!(copy.responsables[0].name, "Ana");
    // Source untouched.
    assert_eq!(board.moments["a"][0].responsables[0].id, 7);
}

#[test]
fn duplicate_then_remove_leaves_copy_alone_in_destination() {
    let mut board = board_with_moments(1);
    let limits = default_limits();
    let original = board.moments["a"][0].clone();

    let id = board
        .duplicate_moment("a", 1, Some("b"), &limits, NOW_MS)
        .expect("room available")
        .expect("source exists");
    assert!(board.remove_moment("a", 1));

    assert!(board.moments["a"].is_empty());
    let copy = &board.moments["b"][0];
    assert_eq!(board.moments["b"].len(), 1);
    assert_eq!(copy.order, 1);
    assert_ne!(copy.id, original.id);
    let mut expected = original;
    expected.id = id;
    expected.order = 1;
    assert_eq!(*copy, expected);
}

#[test]
fn duplicate_unknown_moment_is_noop() {
    let mut board = board_with_moments(1);
    let limits = default_limits();
    let before = board.clone();

    let result = board
        .duplicate_moment("a", 99, Some("b"), &limits, NOW_MS)
        .expect("no capacity issue");

    assert_eq!(result, None);
    assert_eq!(board, before);
}

#[test]
fn duplicate_into_full_destination_is_rejected() {
    let limits = Limits::new(1, 12, 12);
    let mut board = board_with_moments(1);
    board
        .duplicate_moment("a", 1, Some("b"), &limits, NOW_MS)
        .expect("destination empty")
        .expect("source exists");
    let before = board.clone();

    let result = board.duplicate_moment("a", 1, Some("b"), &limits, NOW_MS);

    assert_eq!(
        result,
        Err(DomainError::BlockAtCapacity {
            block_id: String::from("b"),
            cap: 1
        })
    );
    assert_eq!(board, before);
}

#[test]
fn add_block_derives_slug_id_and_empty_list() {
    let mut board = board_with_moments(0);

    let id = board.add_block("Sesión de Fotos", NOW_MS);

    assert_eq!(id, "sesion-de-fotos");
    assert!(board.blocks.iter().any(|b| b.id == id && b.name == "Sesión de Fotos"));
    assert_eq!(board.moments[&id], Vec::new());
}

#[test]
fn add_block_falls_back_to_timestamp_id() {
    let mut board = board_with_moments(0);

    let id = board.add_block("¡¡¡", NOW_MS);

    assert_eq!(id, format!("bloque-{NOW_MS}"));
}

#[test]
fn rename_block_keeps_id() {
    let mut board = board_with_moments(1);

    assert!(board.rename_block("a", "Bloque renombrado"));
    assert!(!board.rename_block("missing", "x"));

    let block = board.blocks.iter().find(|b| b.id == "a").unwrap();
    assert_eq!(block.name, "Bloque renombrado");
}

#[test]
fn remove_block_drops_its_moments() {
    let mut board = board_with_moments(3);

    assert!(board.remove_block("a"));

    assert!(!board.blocks.iter().any(|b| b.id == "a"));
    assert!(!board.moments.contains_key("a"));
}

#[test]
fn reorder_blocks_moves_and_rejects_out_of_range() {
    let mut board = board_with_moments(0);

    assert!(board.reorder_blocks(0, 1));
    assert_eq!(board.blocks[0].id, "b");
    assert_eq!(board.blocks[1].id, "a");

    assert!(!board.reorder_blocks(5, 0));
    assert!(!board.reorder_blocks(0, 5));
}

#[test]
fn order_invariant_survives_a_mixed_mutation_sequence() {
    let mut board = board_with_moments(5);
    let limits = default_limits();

    board.add_moment("a", MomentPatch::default(), &limits, NOW_MS).unwrap();
    board.remove_moment("a", 3);
    board.reorder_moment("a", 5, MoveDirection::Up);
    board.move_moment("a", 1, 3);
    board.move_moment_between_blocks("a", "b", 2, 0, &limits).unwrap();
    board.duplicate_moment("a", 4, None, &limits, NOW_MS + 1).unwrap();
    board.duplicate_moment("a", 5, Some("b"), &limits, NOW_MS + 2).unwrap();

    assert_contiguous_order(&board, "a");
    assert_contiguous_order(&board, "b");
}

#[test]
fn validation_errors_map_only_lists_offending_moments() {
    let mut board = board_with_moments(0);
    let limits = default_limits();
    board
        .add_moment(
            "a",
            MomentPatch {
                title: Some(String::from("Walk in")),
                kind: Some(MomentKind::Entrada),
                ..MomentPatch::default()
            },
            &limits,
            NOW_MS,
        )
        .unwrap();
    let clean_id = board
        .add_moment(
            "a",
            MomentPatch {
                title: Some(String::from("Cake")),
                kind: Some(MomentKind::Otro),
                ..MomentPatch::default()
            },
            &limits,
            NOW_MS + 1,
        )
        .unwrap();

    let findings = board.moment_validation_errors("a", &limits);

    assert_eq!(findings.len(), 1);
    assert!(!findings.contains_key(&clean_id));
    let errors = findings.values().next().unwrap();
    assert!(errors.iter().any(|e| e.contains("canción")));
}

#[test]
fn default_board_matches_seed_shape() {
    let board: MomentsBoard = default_board();

    let ids: Vec<&str> = board.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["ceremonia", "coctail", "banquete", "disco"]);
    assert_eq!(board.moments["ceremonia"].len(), 6);
    assert_eq!(board.moments["coctail"].len(), 1);
    assert_eq!(board.moments["banquete"].len(), 3);
    assert_eq!(board.moments["disco"].len(), 3);
    for block in &board.blocks {
        super::helpers::assert_contiguous_order(&board, &block.id);
    }
    assert_eq!(board.moments["disco"][0].key, "primer_baile");
    assert_eq!(board.moments["banquete"][1].key, "corte_tarta");
}

#[test]
fn board_serializes_with_deterministic_key_order() {
    let board = default_board();

    let first = serde_json::to_string(&board).unwrap();
    let second = serde_json::to_string(&serde_json::from_str::<MomentsBoard>(&first).unwrap())
        .unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with("{\"blocks\""));
}

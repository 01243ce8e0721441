// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DocumentStore, MemoryStore, MigrationOutcome, legacy_moments_path, migrate_legacy_moments,
    special_moments_path,
};
use serde_json::{Value, json};

const NOW_MS: i64 = 1_700_000_000_000;

fn legacy_document() -> crate::Document {
    let value = json!({
        "ceremonia": [{"id": 1, "order": 1, "title": "Entrada", "type": "entrada"}],
        "banquete": [{"id": 2, "order": 1, "title": "Discursos", "type": "discurso"}]
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn migrates_legacy_payload_into_current_shape() {
    let store = MemoryStore::new();
    store
        .set_merge(&legacy_moments_path("w1"), legacy_document())
        .await
        .unwrap();

    let outcome = migrate_legacy_moments(&store, "w1", NOW_MS).await.unwrap();

    assert_eq!(outcome, MigrationOutcome::Migrated);
    let migrated = store.get(&special_moments_path("w1")).await.unwrap().unwrap();
    assert_eq!(migrated.get("migratedFrom"), Some(&Value::from("momentosEspeciales")));
    assert_eq!(migrated.get("updatedAt"), Some(&Value::from(NOW_MS)));
    let moments = migrated.get("moments").unwrap();
    assert_eq!(moments["ceremonia"][0]["title"], Value::from("Entrada"));
    assert_eq!(moments["banquete"][0]["type"], Value::from("discurso"));
    // Blocks come from the defaults; the legacy shape never stored them.
    assert!(migrated.get("blocks").unwrap().is_array());
}

#[tokio::test]
async fn second_run_is_a_noop() {
    let store = MemoryStore::new();
    store
        .set_merge(&legacy_moments_path("w1"), legacy_document())
        .await
        .unwrap();

    migrate_legacy_moments(&store, "w1", NOW_MS).await.unwrap();
    let after_first = store.get(&special_moments_path("w1")).await.unwrap();

    let outcome = migrate_legacy_moments(&store, "w1", NOW_MS + 999).await.unwrap();

    assert_eq!(outcome, MigrationOutcome::DestinationExists);
    assert_eq!(store.get(&special_moments_path("w1")).await.unwrap(), after_first);
}

#[tokio::test]
async fn no_legacy_document_is_reported() {
    let store = MemoryStore::new();

    let outcome = migrate_legacy_moments(&store, "w1", NOW_MS).await.unwrap();

    assert_eq!(outcome, MigrationOutcome::NoLegacyDocument);
    assert_eq!(store.get(&special_moments_path("w1")).await.unwrap(), None);
}

#[tokio::test]
async fn populated_destination_is_never_overwritten() {
    let store = MemoryStore::new();
    store
        .set_merge(&legacy_moments_path("w1"), legacy_document())
        .await
        .unwrap();
    let current = json!({"blocks": [{"id": "x", "name": "X"}], "moments": {"x": []}});
    let current = match current {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    store
        .set_merge(&special_moments_path("w1"), current.clone())
        .await
        .unwrap();

    let outcome = migrate_legacy_moments(&store, "w1", NOW_MS).await.unwrap();

    assert_eq!(outcome, MigrationOutcome::DestinationExists);
    let kept = store.get(&special_moments_path("w1")).await.unwrap().unwrap();
    assert_eq!(kept.get("blocks"), current.get("blocks"));
    assert!(!kept.contains_key("migratedFrom"));
}

// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Document, DocumentStore, MemoryStore};
use serde_json::Value;

fn doc(pairs: &[(&str, Value)]) -> Document {
    let mut document = Document::new();
    for (key, value) in pairs {
        document.insert((*key).to_owned(), value.clone());
    }
    document
}

#[tokio::test]
async fn get_returns_none_for_unwritten_path() {
    let store = MemoryStore::new();
    assert_eq!(store.get("weddings/w1/specialMoments/main").await.unwrap(), None);
}

#[tokio::test]
async fn set_merge_creates_then_merges_top_level_fields() {
    let store = MemoryStore::new();
    store
        .set_merge("p", doc(&[("a", Value::from(1)), ("b", Value::from("x"))]))
        .await
        .unwrap();
    store
        .set_merge("p", doc(&[("b", Value::from("y")), ("c", Value::from(true))]))
        .await
        .unwrap();

    let merged = store.get("p").await.unwrap().unwrap();
    assert_eq!(merged.get("a"), Some(&Value::from(1)));
    assert_eq!(merged.get("b"), Some(&Value::from("y")));
    assert_eq!(merged.get("c"), Some(&Value::from(true)));
}

#[tokio::test]
async fn subscribers_receive_full_snapshots_per_write() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe("p");

    store.set_merge("p", doc(&[("a", Value::from(1))])).await.unwrap();
    store.set_merge("p", doc(&[("b", Value::from(2))])).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.len(), 1);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.get("a"), Some(&Value::from(1)));
    assert_eq!(second.get("b"), Some(&Value::from(2)));
}

#[tokio::test]
async fn writes_before_subscription_are_not_replayed() {
    let store = MemoryStore::new();
    store.set_merge("p", doc(&[("a", Value::from(1))])).await.unwrap();

    let mut rx = store.subscribe("p");
    store.set_merge("p", doc(&[("b", Value::from(2))])).await.unwrap();

    let snapshot = rx.recv().await.unwrap();
    assert!(snapshot.contains_key("b"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn paths_are_independent() {
    let store = MemoryStore::new();
    let mut rx_other = store.subscribe("other");

    store.set_merge("p", doc(&[("a", Value::from(1))])).await.unwrap();

    assert!(rx_other.try_recv().is_err());
    assert_eq!(store.get("other").await.unwrap(), None);
}

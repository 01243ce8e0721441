// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use runsheet_domain::MomentPatch;
use runsheet_persistence::{DocumentStore, LocalMirror, MemoryMirror, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

use crate::notify::RecordingSink;

pub fn memory_mirror() -> LocalMirror {
    LocalMirror::new(Arc::new(MemoryMirror::new()))
}

/// A shared in-memory store: the concrete handle for direct reads and
/// writes in assertions, plus the trait handle the services take.
pub fn memory_store() -> (Arc<MemoryStore>, Option<Arc<dyn DocumentStore>>) {
    let store = Arc::new(MemoryStore::new());
    let dynamic: Arc<dyn DocumentStore> = store.clone();
    (store, Some(dynamic))
}

pub fn recording_sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::new())
}

/// Yields to the background tasks. Every test here runs under a paused
/// clock, so the sleep is virtual and the duration only needs to clear the
/// timers the test expects to fire.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}

pub fn titled(title: &str) -> MomentPatch {
    MomentPatch {
        title: Some(title.to_owned()),
        ..MomentPatch::default()
    }
}

//! In-process revision store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RevisionStore;
use crate::Error;
use crate::revision::RevisionMap;

/// Read/write counters for a [`MemoryRevisionStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub reads: u64,
    pub writes: u64,
}

/// Session-scoped store that keeps the map in memory.
///
/// Revisions are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryRevisionStore {
    revisions: RwLock<RevisionMap>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `revisions`.
    pub fn with_revisions(revisions: RevisionMap) -> Self {
        Self { revisions: RwLock::new(revisions), ..Self::default() }
    }

    /// Number of whole-map reads and writes served so far.
    pub fn stats(&self) -> StoreStats {
        StoreStats { reads: self.reads.load(Ordering::Relaxed), writes: self.writes.load(Ordering::Relaxed) }
    }
}

#[async_trait]
impl RevisionStore for MemoryRevisionStore {
    async fn get_revisions(&self) -> Result<RevisionMap, Error> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.revisions.read().await.clone())
    }

    async fn set_revisions(&self, revisions: &RevisionMap) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        *self.revisions.write().await = revisions.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryRevisionStore::new();
        assert!(store.get_revisions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_replaces_map() {
        let store = MemoryRevisionStore::with_revisions(RevisionMap::from([("http://a/api".to_string(), 3)]));

        store
            .set_revisions(&RevisionMap::from([("http://b/api".to_string(), 1)]))
            .await
            .unwrap();

        let revisions = store.get_revisions().await.unwrap();
        assert_eq!(revisions, RevisionMap::from([("http://b/api".to_string(), 1)]));
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryRevisionStore::new();
        assert_eq!(store.stats(), StoreStats::default());

        let revisions = store.get_revisions().await.unwrap();
        store.set_revisions(&revisions).await.unwrap();
        store.get_revisions().await.unwrap();

        assert_eq!(store.stats(), StoreStats { reads: 2, writes: 1 });
    }
}

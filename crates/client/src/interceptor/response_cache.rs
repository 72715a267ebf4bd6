//! Short-lived response cache attached to versioned GET requests.
//!
//! Each URL maps to a slot that is filled at most once, so concurrent reads of
//! the same versioned URL share one round trip. Slots are evicted as soon as
//! the response passes the interceptor, which makes the next read go back to
//! the network.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::fetch::FetchResponse;

/// A response slot shared by every in-flight read of one URL.
pub type ResponseSlot = Arc<OnceCell<FetchResponse>>;

/// Clonable handle; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    slots: Arc<Mutex<HashMap<String, ResponseSlot>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `url`, created empty if absent.
    pub async fn slot(&self, url: &str) -> ResponseSlot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(url.to_string()).or_default())
    }

    /// The response stored for `url`, if its slot has been filled.
    pub async fn get(&self, url: &str) -> Option<FetchResponse> {
        let slots = self.slots.lock().await;
        slots.get(url).and_then(|slot| slot.get().cloned())
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.slots.lock().await.contains_key(url)
    }

    /// Evict `url`. Returns whether a slot was present.
    pub async fn remove(&self, url: &str) -> bool {
        self.slots.lock().await.remove(url).is_some()
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    /// Whether both handles refer to the same cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

//! Revision persistence.
//!
//! A store holds one [`RevisionMap`] and only supports reading and replacing
//! it as a whole. All invalidation logic lives in [`crate::revision`].

mod memory;
pub mod migrations;
mod sqlite;

use async_trait::async_trait;

use crate::Error;
use crate::revision::RevisionMap;

pub use memory::{MemoryRevisionStore, StoreStats};
pub use sqlite::{DEFAULT_SESSION, SqliteRevisionStore};

/// Whole-map persistence for revisions.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// The persisted map, or an empty map if nothing was stored yet.
    async fn get_revisions(&self) -> Result<RevisionMap, Error>;

    /// Replace the persisted map with `revisions`.
    async fn set_revisions(&self, revisions: &RevisionMap) -> Result<(), Error>;
}

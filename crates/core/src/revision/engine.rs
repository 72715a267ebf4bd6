//! The cache manager: versioned reads and revision bumps on writes.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::matching::{is_descendant, match_base_url};
use super::{Method, RevisionMap, versioned};
use crate::Error;
use crate::config::ConfigRegistry;
use crate::store::RevisionStore;

/// Maps request URLs to revisions and bumps them on mutations.
///
/// Revisions are only ever created by reads. A write against a URL that was
/// never read leaves no trace.
pub struct CacheManager {
    config: ConfigRegistry,
    store: Arc<dyn RevisionStore>,
    /// Serializes load/modify/store cycles so concurrent callers never drop
    /// an increment.
    update: Mutex<()>,
}

impl CacheManager {
    pub fn new(config: ConfigRegistry, store: Arc<dyn RevisionStore>) -> Self {
        Self { config, store, update: Mutex::new(()) }
    }

    pub fn config(&self) -> &ConfigRegistry {
        &self.config
    }

    /// The configured base URL that `url` falls under, if any.
    pub fn match_base_url(&self, url: &str, strict: bool) -> Option<String> {
        let config = self.config.get_configuration();
        match_base_url(&config.base_api_urls, url, strict).map(str::to_string)
    }

    /// The URL to send for a read of `url`.
    ///
    /// URLs outside every base pattern come back unchanged without touching
    /// the store. A matched URL seen for the first time is seeded with
    /// revision 1, which is persisted before returning.
    pub async fn versioned_url(&self, url: &str) -> Result<String, Error> {
        let config = self.config.get_configuration();

        if match_base_url(&config.base_api_urls, url, true).is_none() {
            return Ok(url.to_string());
        }

        let _guard = self.update.lock().await;
        let mut revisions = self.store.get_revisions().await?;

        let revision = match current_revision(&revisions, url) {
            Some(revision) => revision,
            None => {
                revisions.insert(url.to_string(), 1);
                self.store.set_revisions(&revisions).await?;
                tracing::debug!(url, "seeded revision");
                1
            }
        };

        Ok(versioned(url, &config.param, revision))
    }

    /// Record that `method` was applied to `url`.
    ///
    /// Any non-read method bumps the matched base URL. PUT and DELETE also
    /// bump `url` and every tracked URL below `url/`. Returns the bumped keys
    /// in the order they were incremented.
    pub async fn invalidate(&self, method: &Method, url: &str) -> Result<Vec<String>, Error> {
        if method.is_read_only() {
            return Ok(Vec::new());
        }

        let config = self.config.get_configuration();
        let Some(base_api_url) = match_base_url(&config.base_api_urls, url, false) else {
            return Ok(Vec::new());
        };

        let _guard = self.update.lock().await;
        let mut revisions = self.store.get_revisions().await?;
        let mut bumped = Vec::new();

        if increment(&mut revisions, base_api_url) {
            bumped.push(base_api_url.to_string());
        }

        if method.targets_resource() {
            if increment(&mut revisions, url) {
                bumped.push(url.to_string());
            }
            bumped.extend(increment_descendants(&mut revisions, &format!("{url}/")));
        }

        self.store.set_revisions(&revisions).await?;

        if config.log_enabled {
            for key in &bumped {
                tracing::info!(%method, url = %key, "invalidating cache");
            }
        }

        Ok(bumped)
    }

    /// Bump every tracked URL that contains `url`, except `url` itself.
    pub async fn invalidate_descendants(&self, url: &str) -> Result<Vec<String>, Error> {
        let config = self.config.get_configuration();

        let _guard = self.update.lock().await;
        let mut revisions = self.store.get_revisions().await?;
        let bumped = increment_descendants(&mut revisions, url);
        self.store.set_revisions(&revisions).await?;

        if config.log_enabled {
            for key in &bumped {
                tracing::info!(url = %key, "invalidating cache");
            }
        }

        Ok(bumped)
    }

    /// All tracked revisions.
    pub async fn revisions(&self) -> Result<RevisionMap, Error> {
        self.store.get_revisions().await
    }
}

/// Stored revision for `url`; zero is never a valid revision.
fn current_revision(revisions: &RevisionMap, url: &str) -> Option<u64> {
    revisions.get(url).copied().filter(|revision| *revision > 0)
}

fn increment(revisions: &mut RevisionMap, key: &str) -> bool {
    match revisions.get_mut(key) {
        Some(revision) if *revision > 0 => {
            *revision = revision.saturating_add(1);
            true
        }
        _ => false,
    }
}

fn increment_descendants(revisions: &mut RevisionMap, prefix: &str) -> Vec<String> {
    revisions
        .iter_mut()
        .filter(|(key, revision)| **revision > 0 && is_descendant(key, prefix))
        .map(|(key, revision)| {
            *revision = revision.saturating_add(1);
            key.clone()
        })
        .collect()
}

//! Shared handle to the active [`CacheConfig`].

use std::sync::{Arc, PoisonError, RwLock};

use super::CacheConfig;

/// Holds the active cache configuration.
///
/// Clones share the same configuration. Readers get an immutable snapshot;
/// [`ConfigRegistry::set_configuration`] swaps in a new one wholesale.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    current: Arc<RwLock<Arc<CacheConfig>>>,
}

impl ConfigRegistry {
    /// Create a registry holding `config`.
    pub fn new(config: CacheConfig) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(config.normalized()))) }
    }

    /// Replace the active configuration.
    ///
    /// Every field is replaced, including ones left at their defaults.
    pub fn set_configuration(&self, config: CacheConfig) {
        let config = Arc::new(config.normalized());
        tracing::debug!(
            base_api_urls = config.base_api_urls.len(),
            log_enabled = config.log_enabled,
            param = %config.param,
            "cache configuration replaced"
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Snapshot of the active configuration.
    pub fn get_configuration(&self) -> Arc<CacheConfig> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

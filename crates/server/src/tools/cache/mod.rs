//! Cache-related MCP tools.
//!
//! This module exposes the revision engine's operations as tools.

pub mod invalidate;
pub mod revisions;
pub mod versioned;

pub use invalidate::{
    CacheInvalidateDescendantsParams, CacheInvalidateParams, invalidate_descendants_impl, invalidate_impl,
};
pub use revisions::{CacheRevisionsParams, revisions_impl};
pub use versioned::{CacheVersionedUrlParams, versioned_url_impl};

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use rmcp::model::CallToolResult;
    use revcache_core::{BaseUrlPattern, CacheConfig, CacheManager, ConfigRegistry, MemoryRevisionStore};

    pub(crate) fn manager() -> CacheManager {
        let config = ConfigRegistry::new(CacheConfig {
            base_api_urls: vec![BaseUrlPattern::new("http://localhost:8080/api")],
            ..Default::default()
        });
        CacheManager::new(config, Arc::new(MemoryRevisionStore::new()))
    }

    pub(crate) fn output_text(result: &CallToolResult) -> String {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content")
            .to_string()
    }
}

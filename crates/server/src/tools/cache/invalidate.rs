//! cache_invalidate and cache_invalidate_descendants tool implementations.
//!
//! Out-of-band invalidation for mutations that did not go through the
//! intercepted client.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use revcache_core::{CacheManager, Error, Method};

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// HTTP method of the mutation (POST, PUT, DELETE, ...).
    pub method: String,

    /// The URL the mutation was sent to.
    pub url: String,
}

/// Parameters for the cache_invalidate_descendants tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateDescendantsParams {
    /// Every tracked URL containing this one, other than itself, is bumped.
    pub url: String,
}

/// Output from both invalidation tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    /// URLs whose revision was incremented, in increment order.
    pub invalidated: Vec<String>,
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(manager: &CacheManager, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    if params.method.is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let method = Method::from(params.method.as_str());
    let invalidated = manager.invalidate(&method, &params.url).await?;

    output(CacheInvalidateOutput { invalidated })
}

/// Implementation of the cache_invalidate_descendants tool.
pub async fn invalidate_descendants_impl(
    manager: &CacheManager, params: CacheInvalidateDescendantsParams,
) -> Result<CallToolResult, McpError> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let invalidated = manager.invalidate_descendants(&params.url).await?;

    output(CacheInvalidateOutput { invalidated })
}

fn output(output: CacheInvalidateOutput) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache::tests::{manager, output_text};

    const BASE: &str = "http://localhost:8080/api";

    async fn seed(manager: &CacheManager, urls: &[&str]) {
        for url in urls {
            manager.versioned_url(url).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalidate_put() {
        let manager = manager();
        seed(&manager, &[BASE, "http://localhost:8080/api/items/1", "http://localhost:8080/api/items/1/tags"]).await;

        let params =
            CacheInvalidateParams { method: "put".to_string(), url: "http://localhost:8080/api/items/1".to_string() };
        let result = invalidate_impl(&manager, params).await.unwrap();
        let output: CacheInvalidateOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(
            output.invalidated,
            vec![
                BASE.to_string(),
                "http://localhost:8080/api/items/1".to_string(),
                "http://localhost:8080/api/items/1/tags".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalidate_get_is_noop() {
        let manager = manager();
        seed(&manager, &[BASE]).await;

        let params = CacheInvalidateParams { method: "GET".to_string(), url: BASE.to_string() };
        let result = invalidate_impl(&manager, params).await.unwrap();
        let output: CacheInvalidateOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert!(output.invalidated.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_missing_method() {
        let manager = manager();
        let params = CacheInvalidateParams { method: String::new(), url: BASE.to_string() };
        assert!(invalidate_impl(&manager, params).await.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_descendants() {
        let manager = manager();
        seed(&manager, &[BASE, "http://localhost:8080/api/items/1"]).await;

        let params = CacheInvalidateDescendantsParams { url: BASE.to_string() };
        let result = invalidate_descendants_impl(&manager, params).await.unwrap();
        let output: CacheInvalidateOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.invalidated, vec!["http://localhost:8080/api/items/1".to_string()]);
    }
}

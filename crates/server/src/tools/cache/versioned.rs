//! cache_versioned_url tool implementation.
//!
//! Resolves the URL a read should be sent to, seeding its revision on first
//! sight.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use revcache_core::{CacheManager, Error};

/// Parameters for the cache_versioned_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheVersionedUrlParams {
    /// The request URL as the client would send it.
    pub url: String,
}

/// Output from the cache_versioned_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheVersionedUrlOutput {
    /// The URL given.
    pub url: String,
    /// The URL to send; equal to `url` when it is not revisioned.
    pub versioned_url: String,
}

/// Implementation of the cache_versioned_url tool.
pub async fn versioned_url_impl(
    manager: &CacheManager, params: CacheVersionedUrlParams,
) -> Result<CallToolResult, McpError> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let versioned_url = manager.versioned_url(&params.url).await?;

    let output = CacheVersionedUrlOutput { url: params.url, versioned_url };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache::tests::{manager, output_text};

    #[tokio::test]
    async fn test_versioned_url_seeds_revision() {
        let manager = manager();
        let params = CacheVersionedUrlParams { url: "http://localhost:8080/api/items".to_string() };

        let result = versioned_url_impl(&manager, params).await.unwrap();
        let output: CacheVersionedUrlOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.versioned_url, "http://localhost:8080/api/items?rev=1");
    }

    #[tokio::test]
    async fn test_versioned_url_passthrough() {
        let manager = manager();
        let params = CacheVersionedUrlParams { url: "http://cdn.example.com/app.js".to_string() };

        let result = versioned_url_impl(&manager, params).await.unwrap();
        let output: CacheVersionedUrlOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.versioned_url, output.url);
    }

    #[tokio::test]
    async fn test_versioned_url_empty() {
        let manager = manager();
        let result = versioned_url_impl(&manager, CacheVersionedUrlParams { url: String::new() }).await;
        assert!(result.is_err());
    }
}

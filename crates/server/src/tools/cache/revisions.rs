//! cache_revisions tool implementation.
//!
//! Lists tracked revisions, optionally restricted to URLs containing a prefix.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use revcache_core::{CacheManager, Error, RevisionMap};

/// Parameters for the cache_revisions tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheRevisionsParams {
    /// Only list URLs containing this string.
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Output from the cache_revisions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheRevisionsOutput {
    /// Revision per tracked URL.
    pub revisions: RevisionMap,
}

/// Implementation of the cache_revisions tool.
pub async fn revisions_impl(manager: &CacheManager, params: CacheRevisionsParams) -> Result<CallToolResult, McpError> {
    let mut revisions = manager.revisions().await?;

    if let Some(prefix) = params.prefix.as_deref() {
        revisions.retain(|url, _| url.contains(prefix));
    }

    let output = CacheRevisionsOutput { revisions };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

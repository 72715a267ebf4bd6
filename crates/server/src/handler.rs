//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{
    CacheInvalidateDescendantsParams, CacheInvalidateParams, CacheRevisionsParams, CacheVersionedUrlParams,
    invalidate_descendants_impl, invalidate_impl, revisions_impl, versioned_url_impl,
};

use revcache_core::CacheManager;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for revcache.
#[derive(Clone)]
pub struct RevcacheServer {
    tool_router: ToolRouter<Self>,
    manager: Arc<CacheManager>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RevcacheServer {
    /// Create a new server handler over `manager`.
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { tool_router: Self::tool_router(), manager }
    }

    #[tool(description = "Resolve the versioned URL a GET should be sent to. Seeds revision 1 for revisioned URLs seen for the first time.")]
    async fn cache_versioned_url(&self, params: Parameters<CacheVersionedUrlParams>) -> Result<CallToolResult, McpError> {
        versioned_url_impl(&self.manager, params.0).await
    }

    #[tool(description = "Record a mutation (POST, PUT, DELETE, ...) against a URL and bump the affected revisions.")]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(&self.manager, params.0).await
    }

    #[tool(description = "Bump the revision of every tracked URL nested below the given URL, leaving the URL itself untouched.")]
    async fn cache_invalidate_descendants(
        &self, params: Parameters<CacheInvalidateDescendantsParams>,
    ) -> Result<CallToolResult, McpError> {
        invalidate_descendants_impl(&self.manager, params.0).await
    }

    #[tool(description = "List tracked revisions, optionally only URLs containing a prefix.")]
    async fn cache_revisions(&self, params: Parameters<CacheRevisionsParams>) -> Result<CallToolResult, McpError> {
        revisions_impl(&self.manager, params.0).await
    }
}

impl ServerHandler for RevcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "revcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

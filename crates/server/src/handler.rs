//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::router::TabRouter;
use crate::tools::{
    AnalyzeNowParams, ClearCacheParams, GetAnalysisParams, SetApiKeyParams, TabActivatedParams, TabRemovedParams,
    TabUpdatedParams, analyze_now_impl, api_key_status_impl, clear_all_cache_impl, clear_cache_impl,
    get_analysis_impl, get_badge_impl, get_current_url_impl, set_api_key_impl, tab_activated_impl, tab_removed_impl,
    tab_updated_impl,
};

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

/// The main MCP server handler for privai.
#[derive(Clone)]
pub struct PrivacyServer {
    router: Arc<TabRouter>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PrivacyServer {
    /// Create a new server handler.
    pub fn new(router: TabRouter) -> Self {
        Self { router: Arc::new(router), tool_router: Self::tool_router() }
    }

    #[tool(description = "Return the URL of the active tab, or null when no tab is active.")]
    async fn get_current_url(&self) -> Result<CallToolResult, McpError> {
        get_current_url_impl(&self.router).await
    }

    /// Force a fresh analysis.
    ///
    /// Bypasses both the cache and any in-flight automatic analysis of the
    /// same page; the newest result wins.
    #[tool(description = "Analyze a page's privacy policy now, bypassing the cache. Returns success, error and the analysis.")]
    async fn analyze_now(&self, params: Parameters<AnalyzeNowParams>) -> Result<CallToolResult, McpError> {
        analyze_now_impl(self.router.orchestrator(), params.0).await
    }

    #[tool(description = "Read the cached privacy analysis for a URL without starting a new one.")]
    async fn get_analysis(&self, params: Parameters<GetAnalysisParams>) -> Result<CallToolResult, McpError> {
        get_analysis_impl(self.router.orchestrator(), params.0).await
    }

    #[tool(description = "Drop the cached analysis for a URL so the next visit analyzes it again.")]
    async fn clear_cache(&self, params: Parameters<ClearCacheParams>) -> Result<CallToolResult, McpError> {
        clear_cache_impl(self.router.orchestrator(), params.0).await
    }

    #[tool(description = "Drop every cached analysis. The stored API key is kept.")]
    async fn clear_all_cache(&self) -> Result<CallToolResult, McpError> {
        clear_all_cache_impl(self.router.orchestrator()).await
    }

    /// Forwarded `tabs.onUpdated` event.
    #[tool(description = "Report a tab update. Completed loads of web pages are analyzed unless cached.")]
    async fn tab_updated(&self, params: Parameters<TabUpdatedParams>) -> Result<CallToolResult, McpError> {
        tab_updated_impl(&self.router, params.0).await
    }

    /// Forwarded `tabs.onActivated` event.
    #[tool(description = "Report that a tab became active. Shows its cached risk or analyzes it.")]
    async fn tab_activated(&self, params: Parameters<TabActivatedParams>) -> Result<CallToolResult, McpError> {
        tab_activated_impl(&self.router, params.0).await
    }

    #[tool(description = "Report that a tab was closed.")]
    async fn tab_removed(&self, params: Parameters<TabRemovedParams>) -> Result<CallToolResult, McpError> {
        tab_removed_impl(&self.router, params.0).await
    }

    #[tool(description = "Return the risk indicator: state, text and color.")]
    async fn get_badge(&self) -> Result<CallToolResult, McpError> {
        get_badge_impl(self.router.orchestrator().badge()).await
    }

    #[tool(description = "Store a Perplexity API key (must start with pplx-). Cached failures are cleared.")]
    async fn set_api_key(&self, params: Parameters<SetApiKeyParams>) -> Result<CallToolResult, McpError> {
        set_api_key_impl(self.router.orchestrator(), params.0).await
    }

    #[tool(description = "Report whether a Perplexity API key is configured.")]
    async fn api_key_status(&self) -> Result<CallToolResult, McpError> {
        api_key_status_impl(self.router.orchestrator()).await
    }
}

impl ServerHandler for PrivacyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "privai".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Privacy-policy risk assessment. Forward tab events with tab_updated/tab_activated/tab_removed, \
                 read results with get_analysis and get_badge."
                    .into(),
            ),
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

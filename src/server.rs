//! MCP server implementation using rmcp.
//!
//! Exposes the tools registered on a [`ToolHost`] to any MCP client, over
//! stdio or streamable HTTP.

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use tower_http::trace::TraceLayer;

use crate::tools::ToolHost;

/// MCP server that serves the host's registered tools.
#[derive(Clone)]
pub struct BridgeServer {
    host: ToolHost,
}

impl BridgeServer {
    pub fn new(host: ToolHost) -> Self {
        Self { host }
    }

    /// Get the tool host.
    pub fn host(&self) -> &ToolHost {
        &self.host
    }
}

impl ServerHandler for BridgeServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.host.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let request_id = context.id.to_string();
        let host = self.host.clone();

        async move {
            if host.get(&tool_name).is_none() {
                return Err(McpError::invalid_params(
                    format!("Tool not found: {}", tool_name),
                    None,
                ));
            }

            host.call_tool(&tool_name, &request_id, args)
                .await
                .map_err(|e| McpError::internal_error(format!("Tool execution failed: {}", e), None))
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Bridges the tools of one or more remote MCP servers. Remote tools are named \
                 `<server>_<tool>`; use `bridge.list_tools` to see them and `bridge.call_tool` \
                 to call one by server and tool name."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// Serve the bridge as an MCP Streamable HTTP server.
///
/// This exposes the MCP endpoint at `/mcp` on the given bind address,
/// e.g. `127.0.0.1:3943`.
pub async fn start_mcp_http(server: BridgeServer, bind: &str) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!("MCP HTTP server listening on http://{}/mcp", bind);

    axum::serve(listener, router).await?;

    Ok(())
}

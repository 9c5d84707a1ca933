//! Handler for the `bridge.list_tools` tool.
//!
//! Lists every tool discovered on the connected MCP servers together with the
//! name it is registered under on the host.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde_json::json;

use crate::mcp_client::BoxFuture;
use crate::registry::ToolRegistry;
use crate::tools::HostTool;

/// Handler for the `bridge.list_tools` escape-hatch tool.
pub struct ListToolsHandler {
    registry: Arc<ToolRegistry>,
    parameters: Arc<JsonObject>,
}

impl ListToolsHandler {
    pub const NAME: &'static str = "bridge.list_tools";

    /// Create a new list tools handler.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            parameters: Arc::new(Self::input_schema()),
        }
    }

    /// Build the input schema for this tool.
    fn input_schema() -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));

        let mut properties = serde_json::Map::new();
        properties.insert(
            "server".to_string(),
            json!({
                "type": "string",
                "description": "Only list tools of this MCP server."
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert("required".to_string(), json!([]));
        schema
    }
}

impl HostTool for ListToolsHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List the tools available on the connected MCP servers, optionally filtered by server. \
         Each entry includes the registered tool name to call directly."
    }

    fn parameters(&self) -> Arc<JsonObject> {
        self.parameters.clone()
    }

    fn execute<'a>(
        &'a self,
        _request_id: &'a str,
        params: JsonObject,
    ) -> BoxFuture<'a, CallToolResult> {
        Box::pin(async move {
            let server = params.get("server").and_then(|v| v.as_str());
            let entries = self.registry.list(server).await;

            let tools: Vec<_> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "server": entry.key.server,
                        "tool": entry.key.tool,
                        "registeredName": entry.registered_name(),
                        "description": entry.descriptor.description,
                        "inputSchema": entry.descriptor.input_schema.as_ref(),
                    })
                })
                .collect();

            let payload = json!({
                "tools": tools,
                "count": tools.len(),
            });
            let text = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|_| "internal serialization error".to_string());

            CallToolResult::success(vec![Content::text(text)])
        })
    }
}

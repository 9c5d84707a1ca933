//! Handler for the `bridge.call_tool` tool.
//!
//! Calls any tool on any connected MCP server by `(server, tool)`, bypassing
//! the per-tool registrations.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::mcp_client::BoxFuture;
use crate::registry::ToolRegistry;
use crate::tools::result::{error_result, into_host_result};
use crate::tools::HostTool;

/// Handler for the `bridge.call_tool` escape-hatch tool.
pub struct CallToolHandler {
    registry: Arc<ToolRegistry>,
    parameters: Arc<JsonObject>,
}

impl CallToolHandler {
    pub const NAME: &'static str = "bridge.call_tool";

    /// Create a new call tool handler.
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
                "description": "Identifier of the MCP server that owns the tool."
            }),
        );
        properties.insert(
            "tool".to_string(),
            json!({
                "type": "string",
                "description": "Name of the tool as reported by the server (without the server prefix)."
            }),
        );
        properties.insert(
            "args".to_string(),
            json!({
                "type": "object",
                "description": "Arguments to pass to the tool, shaped according to its inputSchema.",
                "additionalProperties": true
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert("required".to_string(), json!(["server", "tool"]));
        schema
    }
}

impl HostTool for CallToolHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Call a tool on a connected MCP server by server identifier and tool name. \
         Use `bridge.list_tools` to discover what is available."
    }

    fn parameters(&self) -> Arc<JsonObject> {
        self.parameters.clone()
    }

    fn execute<'a>(
        &'a self,
        request_id: &'a str,
        params: JsonObject,
    ) -> BoxFuture<'a, CallToolResult> {
        Box::pin(async move {
            let Some(server) = params.get("server").and_then(|v| v.as_str()) else {
                return error_result(format!("{} requires a `server` string", Self::NAME));
            };
            let Some(tool) = params.get("tool").and_then(|v| v.as_str()) else {
                return error_result(format!("{} requires a `tool` string", Self::NAME));
            };

            let args = match params.get("args") {
                None | Some(serde_json::Value::Null) => JsonObject::new(),
                Some(serde_json::Value::Object(args)) => args.clone(),
                Some(_) => {
                    return error_result(format!("{} expects `args` to be an object", Self::NAME));
                }
            };

            tracing::debug!(request_id, server, tool, "Executing tool by name");
            into_host_result(self.registry.dispatch(server, tool, args).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::testing::{FakeConnector, FakeServer, first_text};

    async fn handler() -> CallToolHandler {
        let connector = FakeConnector::new()
            .with_server("alpha", FakeServer::with_tools(&["ask"]))
            .with_server(
                "beta",
                FakeServer {
                    fail_call: Some("upstream 502".to_string()),
                    ..FakeServer::with_tools(&["ask"])
                },
            );
        let registry = Arc::new(ToolRegistry::new(Arc::new(connector)));
        let cfg = ServerConfig::new("https://example.com/mcp");
        registry.connect("alpha", &cfg).await.unwrap();
        registry.connect("beta", &cfg).await.unwrap();
        CallToolHandler::new(registry)
    }

    fn params(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_calls_named_tool() {
        let handler = handler().await;
        let result = handler
            .execute(
                "1",
                params(json!({ "server": "alpha", "tool": "ask", "args": { "query": "hi" } })),
            )
            .await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), r#"alpha:ask:{"query":"hi"}"#);
    }

    #[tokio::test]
    async fn test_args_are_optional() {
        let handler = handler().await;
        let result = handler
            .execute("1", params(json!({ "server": "alpha", "tool": "ask" })))
            .await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), "alpha:ask:{}");
    }

    #[tokio::test]
    async fn test_missing_arguments_are_errors() {
        let handler = handler().await;

        let result = handler.execute("1", params(json!({ "tool": "ask" }))).await;
        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("`server`"));

        let result = handler.execute("1", params(json!({ "server": "alpha" }))).await;
        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("`tool`"));

        let result = handler
            .execute(
                "1",
                params(json!({ "server": "alpha", "tool": "ask", "args": [1, 2] })),
            )
            .await;
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_known_tools() {
        let handler = handler().await;
        let result = handler
            .execute("1", params(json!({ "server": "gamma", "tool": "ask" })))
            .await;

        assert_eq!(result.is_error, Some(true));
        let text = first_text(&result);
        assert!(text.contains("alpha/ask"));
        assert!(text.contains("beta/ask"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_captured() {
        let handler = handler().await;
        let result = handler
            .execute("1", params(json!({ "server": "beta", "tool": "ask" })))
            .await;

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("upstream 502"));
    }
}

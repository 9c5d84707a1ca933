//! Host tool wrapping one tool discovered on a remote MCP server.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};

use crate::mcp_client::BoxFuture;
use crate::model::ToolDescriptor;
use crate::registry::ToolRegistry;
use crate::tools::result::into_host_result;
use crate::tools::HostTool;
use crate::types::{ServerId, ToolKey};

/// Host tool named `server_tool` that forwards to the owning server.
pub struct RemoteTool {
    registry: Arc<ToolRegistry>,
    key: ToolKey,
    name: String,
    description: String,
    parameters: Arc<JsonObject>,
}

impl RemoteTool {
    pub fn new(registry: Arc<ToolRegistry>, server: ServerId, descriptor: ToolDescriptor) -> Self {
        let key = ToolKey::new(server, descriptor.name.as_str());
        let description = descriptor
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Tool {} from MCP server {}", key.tool, key.server));

        Self {
            name: key.registered_name(),
            registry,
            key,
            description,
            parameters: descriptor.input_schema,
        }
    }

    pub fn key(&self) -> &ToolKey {
        &self.key
    }
}

impl HostTool for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
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
            tracing::debug!(request_id, tool = %self.key, "Executing remote tool");
            let outcome = self
                .registry
                .dispatch(self.key.server.as_str(), self.key.tool.as_str(), params)
                .await;
            into_host_result(outcome)
        })
    }
}

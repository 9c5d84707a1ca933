//! Host-side tool registry.
//!
//! Provides the `HostTool` trait for anything the host can call and
//! `ToolHost`, the in-process host that collects registered tools and
//! services and serves them over MCP.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use rmcp::model::{CallToolResult, JsonObject, Tool as McpTool};
use tracing::{debug, error, info};

use crate::mcp_client::BoxFuture;
use crate::plugin::{HostService, PluginHost};

/// A callable unit registered with the host.
///
/// `execute` is infallible: every failure must already be folded into a
/// result with `is_error` set.
pub trait HostTool: Send + Sync {
    /// Returns the tool's name as seen by the host.
    fn name(&self) -> &str;

    /// Returns the tool's description.
    fn description(&self) -> &str;

    /// Returns the JSON schema of the tool's parameters.
    fn parameters(&self) -> Arc<JsonObject>;

    /// Executes the tool for one host request.
    fn execute<'a>(&'a self, request_id: &'a str, params: JsonObject)
        -> BoxFuture<'a, CallToolResult>;

    /// Converts this tool to an `McpTool` for use in `list_tools`.
    fn to_mcp_tool(&self) -> McpTool {
        McpTool::new(
            self.name().to_string(),
            self.description().to_string(),
            self.parameters(),
        )
    }
}

/// In-process plugin host.
///
/// Cloning is cheap; clones share the same tool and service tables.
#[derive(Clone, Default)]
pub struct ToolHost {
    tools: Arc<RwLock<BTreeMap<String, Arc<dyn HostTool>>>>,
    services: Arc<RwLock<Vec<Arc<dyn HostService>>>>,
}

impl ToolHost {
    /// Create a new empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn HostTool>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// List all registered tool names.
    pub fn list_names(&self) -> Vec<String> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Get all registered tools as `McpTool` instances for `list_tools`.
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|tool| tool.to_mcp_tool())
            .collect()
    }

    /// Execute a tool by name with the given arguments.
    ///
    /// Only an unknown name is an error; tool failures come back as results.
    pub async fn call_tool(
        &self,
        name: &str,
        request_id: &str,
        args: JsonObject,
    ) -> Result<CallToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Tool not found: {}", name))?;
        Ok(tool.execute(request_id, args).await)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start every registered service in registration order.
    pub async fn start_services(&self) -> Result<()> {
        for service in self.service_list() {
            info!("Starting service `{}`", service.id());
            service
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("Service `{}` failed to start: {:#}", service.id(), e))?;
        }
        Ok(())
    }

    /// Stop every registered service in reverse order, logging failures.
    pub async fn stop_services(&self) {
        for service in self.service_list().into_iter().rev() {
            info!("Stopping service `{}`", service.id());
            if let Err(e) = service.stop().await {
                error!("Service `{}` failed to stop: {:#}", service.id(), e);
            }
        }
    }

    fn service_list(&self) -> Vec<Arc<dyn HostService>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PluginHost for ToolHost {
    fn register_tool(&self, tool: Arc<dyn HostTool>) {
        let name = tool.name().to_string();
        let previous = self
            .tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), tool);
        if previous.is_some() {
            debug!("Replaced host tool `{}`", name);
        } else {
            debug!("Registered host tool `{}`", name);
        }
    }

    fn register_service(&self, service: Arc<dyn HostService>) {
        debug!("Registered service `{}`", service.id());
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(service);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::first_text;
    use rmcp::model::Content;

    struct EchoTool;

    impl HostTool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the request id"
        }

        fn parameters(&self) -> Arc<JsonObject> {
            Arc::new(JsonObject::new())
        }

        fn execute<'a>(
            &'a self,
            request_id: &'a str,
            _params: JsonObject,
        ) -> BoxFuture<'a, CallToolResult> {
            Box::pin(async move { CallToolResult::success(vec![Content::text(request_id)]) })
        }
    }

    #[tokio::test]
    async fn test_register_and_call() {
        let host = ToolHost::new();
        host.register_tool(Arc::new(EchoTool));

        assert_eq!(host.len(), 1);
        assert_eq!(host.list_names(), vec!["echo"]);
        assert_eq!(host.list_tools()[0].name, "echo");

        let result = host.call_tool("echo", "req-7", JsonObject::new()).await.unwrap();
        assert_eq!(first_text(&result), "req-7");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error() {
        let host = ToolHost::new();
        assert!(host.is_empty());
        assert!(host.call_tool("nope", "1", JsonObject::new()).await.is_err());
    }

    #[test]
    fn test_register_same_name_replaces() {
        let host = ToolHost::new();
        host.register_tool(Arc::new(EchoTool));
        host.register_tool(Arc::new(EchoTool));
        assert_eq!(host.len(), 1);
    }
}

// Core modules
mod config;
mod error;
mod mcp_client;
mod model;
mod registry;
mod types;
mod utils;

// Host-facing surface
mod plugin;
mod tools;
pub mod server;

#[cfg(test)]
mod testing;

// Re-export key types and functions
pub use config::{
    BridgeConfig, PLUGIN_ID, ServerConfig, load_bridge_config, resolve_config_path,
};
pub use error::{BridgeError, BridgeResult};
pub use mcp_client::{BoxFuture, Connector, HttpConnector, RmcpSession, Session};
pub use model::ToolDescriptor;
pub use registry::{ToolEntry, ToolRegistry};
pub use types::{ServerId, ToolKey, ToolName, registered_name, split_registered_name};

pub use plugin::{BridgeService, HostService, McpBridgePlugin, PluginHost, StartSummary};
pub use server::BridgeServer;
pub use tools::{CallToolHandler, HostTool, ListToolsHandler, RemoteTool, ToolHost};

use std::sync::Arc;
use anyhow::Result;

/// Convenience function to create a fully configured MCP server.
///
/// This registers the bridge plugin on a fresh [`ToolHost`], starts it (which
/// connects every enabled server over streamable HTTP) and returns a
/// `BridgeServer` that implements rmcp's ServerHandler, together with the
/// host so the caller can stop its services on shutdown.
pub async fn create_server(config: BridgeConfig) -> Result<(BridgeServer, Arc<ToolHost>)> {
    let host = Arc::new(ToolHost::new());
    McpBridgePlugin::new(config, Arc::new(HttpConnector)).register(&host);
    host.start_services().await?;

    let server = BridgeServer::new(host.as_ref().clone());
    Ok((server, host))
}

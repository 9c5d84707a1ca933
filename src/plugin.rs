//! Plugin entry point and lifecycle.
//!
//! The plugin registers one service with the host. Starting the service
//! creates the tool registry, connects every enabled server and registers the
//! discovered tools; stopping it disconnects everything.

use std::sync::{Arc, Weak};

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{BridgeConfig, PLUGIN_ID};
use crate::mcp_client::{BoxFuture, Connector};
use crate::registry::ToolRegistry;
use crate::tools::{CallToolHandler, HostTool, ListToolsHandler, RemoteTool};

/// Registration surface the host offers to plugins.
pub trait PluginHost: Send + Sync {
    /// Make a tool callable by the host.
    fn register_tool(&self, tool: Arc<dyn HostTool>);

    /// Register a service whose lifecycle the host drives.
    fn register_service(&self, service: Arc<dyn HostService>);
}

/// Long-running service with a host-driven lifecycle.
pub trait HostService: Send + Sync {
    fn id(&self) -> &str;

    fn start(&self) -> BoxFuture<'_, Result<()>>;

    fn stop(&self) -> BoxFuture<'_, Result<()>>;
}

/// Counts reported after the service has started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartSummary {
    pub configured: usize,
    pub connected: usize,
    pub tools: usize,
}

/// The bridge plugin.
pub struct McpBridgePlugin {
    config: BridgeConfig,
    connector: Arc<dyn Connector>,
}

impl McpBridgePlugin {
    pub fn new(config: BridgeConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Register the bridge service with `host` and return a handle to it.
    pub fn register<H: PluginHost + 'static>(self, host: &Arc<H>) -> Arc<BridgeService> {
        let host: Weak<dyn PluginHost> = Arc::downgrade(host) as Weak<dyn PluginHost>;
        let service = Arc::new(BridgeService {
            host,
            config: self.config,
            connector: self.connector,
            registry: Mutex::new(None),
        });
        if let Some(host) = service.host.upgrade() {
            host.register_service(service.clone());
        }
        info!("Registered plugin `{}`", PLUGIN_ID);
        service
    }
}

/// Service owning the tool registry for the lifetime of the plugin.
pub struct BridgeService {
    host: Weak<dyn PluginHost>,
    config: BridgeConfig,
    connector: Arc<dyn Connector>,
    registry: Mutex<Option<Arc<ToolRegistry>>>,
}

impl BridgeService {
    /// The live registry, if the service is running.
    pub async fn registry(&self) -> Option<Arc<ToolRegistry>> {
        self.registry.lock().await.clone()
    }

    /// Connect every enabled server and register its tools with the host.
    ///
    /// A server that fails to connect is skipped; the rest still start.
    pub async fn start_bridge(&self) -> Result<StartSummary> {
        let mut slot = self.registry.lock().await;
        if slot.is_some() {
            return Err(anyhow::anyhow!("Plugin `{}` is already started", PLUGIN_ID));
        }

        let host = self
            .host
            .upgrade()
            .ok_or_else(|| anyhow::anyhow!("Plugin host is no longer available"))?;
        let registry = Arc::new(ToolRegistry::new(self.connector.clone()));

        let mut summary = StartSummary {
            configured: self.config.servers.len(),
            ..Default::default()
        };

        for (id, server) in &self.config.servers {
            if !server.enabled {
                info!("Skipping disabled MCP server `{id}`");
            }
        }

        for (id, server) in self.config.enabled_servers() {
            let descriptors = match registry.connect(id.clone(), server).await {
                Ok(descriptors) => descriptors,
                Err(_) => {
                    // Already logged by the registry.
                    warn!("MCP server `{}` will be unavailable", id);
                    continue;
                }
            };

            summary.connected += 1;
            summary.tools += descriptors.len();
            for descriptor in descriptors {
                host.register_tool(Arc::new(RemoteTool::new(
                    registry.clone(),
                    id.clone(),
                    descriptor,
                )));
            }
        }

        host.register_tool(Arc::new(ListToolsHandler::new(registry.clone())));
        host.register_tool(Arc::new(CallToolHandler::new(registry.clone())));

        *slot = Some(registry);

        info!(
            "MCP bridge started: {}/{} servers connected, {} tools registered",
            summary.connected, summary.configured, summary.tools
        );
        Ok(summary)
    }

    /// Disconnect every server and drop the registry. No-op when not started.
    pub async fn stop_bridge(&self) {
        let registry = self.registry.lock().await.take();
        if let Some(registry) = registry {
            registry.disconnect().await;
            info!("MCP bridge stopped");
        }
    }
}

impl HostService for BridgeService {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn start(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.start_bridge().await.map(|_| ()) })
    }

    fn stop(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.stop_bridge().await;
            Ok(())
        })
    }
}

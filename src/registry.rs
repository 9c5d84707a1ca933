//! Multi-server tool registry and dispatcher.
//!
//! Keeps one session per connected MCP server and an index of the tools each
//! server exposes, keyed by `(server, tool)`. Calls are routed to the owning
//! session; the registry itself never inspects arguments or results.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use rmcp::model::{CallToolResult, JsonObject};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::mcp_client::{Connector, Session};
use crate::model::ToolDescriptor;
use crate::types::{ServerId, ToolKey, validate_server_id};
use crate::utils::{mask_url, scrub_credentials};

/// One tool exposed by one connected server.
#[derive(Clone)]
pub struct ToolEntry {
    pub key: ToolKey,
    pub descriptor: ToolDescriptor,
    session: Weak<dyn Session>,
    /// Configured server URL, used only to scrub error messages.
    url: Arc<str>,
}

impl ToolEntry {
    pub fn server(&self) -> &ServerId {
        &self.key.server
    }

    /// Host-visible name, `server_tool`.
    pub fn registered_name(&self) -> String {
        self.key.registered_name()
    }
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("key", &self.key)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

struct ServerEntry {
    session: Arc<dyn Session>,
    url: Arc<str>,
    tool_count: usize,
}

#[derive(Default)]
struct RegistryState {
    servers: BTreeMap<ServerId, ServerEntry>,
    tools: BTreeMap<ToolKey, ToolEntry>,
}

impl RegistryState {
    fn known_keys(&self) -> Vec<ToolKey> {
        self.tools.keys().cloned().collect()
    }
}

/// Registry of connected MCP servers and their tools.
pub struct ToolRegistry {
    connector: Arc<dyn Connector>,
    state: RwLock<RegistryState>,
    /// Serializes `connect` and `disconnect`.
    lifecycle: Mutex<()>,
}

impl ToolRegistry {
    /// Create an empty registry that opens sessions through `connector`.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            state: RwLock::new(RegistryState::default()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Open a session to `server`, enumerate its tools and index them.
    ///
    /// On failure nothing is recorded and any opened session is closed again.
    /// An identifier that is already connected is rejected.
    pub async fn connect(
        &self,
        server: impl Into<ServerId>,
        config: &ServerConfig,
    ) -> BridgeResult<Vec<ToolDescriptor>> {
        let server = server.into();
        validate_server_id(server.as_str()).map_err(|reason| BridgeError::InvalidServerId {
            server: server.to_string(),
            reason,
        })?;

        let _guard = self.lifecycle.lock().await;

        if self.state.read().await.servers.contains_key(&server) {
            return Err(BridgeError::AlreadyConnected(server.to_string()));
        }

        info!(
            "Connecting to MCP server `{}` at `{}`",
            server,
            mask_url(&config.url)
        );

        let connection_error = |e: anyhow::Error| {
            let err = BridgeError::Connection {
                server: server.to_string(),
                message: scrub_credentials(&format!("{e:#}"), &config.url),
            };
            error!("{}", err);
            err
        };

        let session = self
            .connector
            .open(&server, config)
            .await
            .map_err(connection_error)?;

        let listed = match session.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!(
                        "Failed to close MCP server `{}` after failed tool listing: {}",
                        server, close_err
                    );
                }
                return Err(connection_error(e));
            }
        };

        if listed.is_empty() {
            warn!("MCP server `{}` reported no tools", server);
        }

        let weak = Arc::downgrade(&session);
        let url: Arc<str> = Arc::from(config.url.as_str());
        let mut entries: BTreeMap<ToolKey, ToolEntry> = BTreeMap::new();
        let mut descriptors = Vec::with_capacity(listed.len());
        for descriptor in listed {
            let key = ToolKey::new(server.clone(), descriptor.name.as_str());
            if entries.contains_key(&key) {
                warn!(
                    "MCP server `{}` lists tool `{}` more than once; keeping the first",
                    server, descriptor.name
                );
                continue;
            }
            descriptors.push(descriptor.clone());
            entries.insert(
                key.clone(),
                ToolEntry {
                    key,
                    descriptor,
                    session: weak.clone(),
                    url: url.clone(),
                },
            );
        }

        {
            let mut state = self.state.write().await;
            state.tools.extend(entries);
            state.servers.insert(
                server.clone(),
                ServerEntry {
                    session,
                    url,
                    tool_count: descriptors.len(),
                },
            );
        }

        info!(
            "Connected to MCP server `{}` ({} tools)",
            server,
            descriptors.len()
        );
        Ok(descriptors)
    }

    /// Route a call to the session owning `(server, tool)`.
    ///
    /// The remote result is returned unchanged, including its error flag.
    pub async fn dispatch(
        &self,
        server: &str,
        tool: &str,
        args: JsonObject,
    ) -> BridgeResult<CallToolResult> {
        let (session, url) = {
            let state = self.state.read().await;
            let key = ToolKey::new(server, tool);
            match state.tools.get(&key) {
                Some(entry) => (entry.session.upgrade(), entry.url.clone()),
                None => {
                    return Err(BridgeError::ToolNotFound {
                        server: server.to_string(),
                        tool: tool.to_string(),
                        known: state.known_keys(),
                    });
                }
            }
        };

        let session = session.ok_or_else(|| BridgeError::ToolInvocation {
            server: server.to_string(),
            tool: tool.to_string(),
            message: "session is no longer open".to_string(),
        })?;

        debug!("Dispatching `{}` to MCP server `{}`", tool, server);

        session
            .call_tool(tool, args)
            .await
            .map_err(|e| BridgeError::ToolInvocation {
                server: server.to_string(),
                tool: tool.to_string(),
                message: scrub_credentials(&format!("{e:#}"), &url),
            })
    }

    /// Every indexed tool, or only those of `server_filter`, in key order.
    pub async fn list(&self, server_filter: Option<&str>) -> Vec<ToolEntry> {
        let state = self.state.read().await;
        state
            .tools
            .values()
            .filter(|entry| server_filter.is_none_or(|s| entry.server().as_str() == s))
            .cloned()
            .collect()
    }

    /// Close every session and clear the registry.
    ///
    /// Close failures are logged and never stop the remaining sessions from
    /// being closed. Calling this on an empty registry is a no-op.
    pub async fn disconnect(&self) {
        let _guard = self.lifecycle.lock().await;

        let servers = {
            let mut state = self.state.write().await;
            state.tools.clear();
            std::mem::take(&mut state.servers)
        };

        for (server, entry) in servers {
            match entry.session.close().await {
                Ok(()) => info!(
                    "Disconnected from MCP server `{}` ({} tools removed)",
                    server, entry.tool_count
                ),
                Err(e) => {
                    let err = BridgeError::Disconnect {
                        server: server.to_string(),
                        message: scrub_credentials(&format!("{e:#}"), &entry.url),
                    };
                    error!("{}", err);
                }
            }
        }
    }

    /// Return `true` if a session for `server` is open.
    pub async fn is_connected(&self, server: &str) -> bool {
        self.state.read().await.servers.contains_key(server)
    }

    /// Identifiers of all connected servers.
    pub async fn connected_servers(&self) -> Vec<ServerId> {
        self.state.read().await.servers.keys().cloned().collect()
    }

    /// Return the number of indexed tools.
    pub async fn tool_count(&self) -> usize {
        self.state.read().await.tools.len()
    }
}

// MCP client sessions backed by rmcp

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject};
use rmcp::service::{Peer, RoleClient, RunningService};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::ServiceExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::model::ToolDescriptor;
use crate::types::ServerId;

/// Boxed future returned by the session and connector traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A live, initialized connection to one remote MCP server.
pub trait Session: Send + Sync {
    /// Enumerate every tool the server exposes.
    fn list_tools(&self) -> BoxFuture<'_, Result<Vec<ToolDescriptor>>>;

    /// Invoke a tool and return the server's result unchanged.
    fn call_tool<'a>(&'a self, name: &'a str, args: JsonObject)
        -> BoxFuture<'a, Result<CallToolResult>>;

    /// Shut the session down. Closing twice is not an error.
    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

/// Opens sessions. `open` resolves only once the capability handshake is done.
pub trait Connector: Send + Sync {
    fn open<'a>(
        &'a self,
        server: &'a ServerId,
        config: &'a ServerConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn Session>>>;
}

/// Session over rmcp's streamable HTTP client transport.
pub struct RmcpSession {
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
}

impl RmcpSession {
    pub fn new(service: RunningService<RoleClient, ()>) -> Self {
        Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
        }
    }
}

impl Session for RmcpSession {
    fn list_tools(&self) -> BoxFuture<'_, Result<Vec<ToolDescriptor>>> {
        Box::pin(async move {
            let tools = self.peer.list_all_tools().await?;
            Ok(tools.into_iter().map(ToolDescriptor::from).collect())
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        args: JsonObject,
    ) -> BoxFuture<'a, Result<CallToolResult>> {
        Box::pin(async move {
            let request = CallToolRequestParam {
                name: Cow::from(name.to_string()),
                arguments: Some(args),
                meta: None,
                task: None,
            };
            let resp = self.peer.call_tool(request).await?;
            Ok(resp)
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let Some(service) = self.service.lock().await.take() else {
                return Ok(());
            };
            let reason = service.cancel().await?;
            debug!("MCP session closed: {:?}", reason);
            Ok(())
        })
    }
}

/// Connector that speaks MCP over streamable HTTP.
#[derive(Debug, Default, Clone)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn open<'a>(
        &'a self,
        server: &'a ServerId,
        config: &'a ServerConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn Session>>> {
        Box::pin(async move {
            let transport = StreamableHttpClientTransport::from_uri(config.url.as_str());

            // `serve` performs the MCP initialize handshake before returning.
            let client = ().serve(transport).await?;

            match client.peer_info() {
                Some(info) => debug!(
                    "MCP server `{}` identifies as `{}` {}",
                    server, info.server_info.name, info.server_info.version
                ),
                None => warn!("MCP server `{}` sent no server info", server),
            }

            let session: Arc<dyn Session> = Arc::new(RmcpSession::new(client));
            Ok(session)
        })
    }
}

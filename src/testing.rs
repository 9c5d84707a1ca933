//! In-memory stand-ins for remote MCP servers, shared by the unit tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rmcp::model::{CallToolResult, Content, JsonObject};

use crate::config::ServerConfig;
use crate::mcp_client::{BoxFuture, Connector, Session};
use crate::model::ToolDescriptor;
use crate::types::ServerId;

/// Behaviour of one fake remote server.
#[derive(Clone, Default)]
pub struct FakeServer {
    pub tools: Vec<ToolDescriptor>,
    pub fail_open: Option<String>,
    pub fail_list: Option<String>,
    pub fail_call: Option<String>,
    pub fail_close: Option<String>,
    /// Return results with `is_error` set instead of succeeding.
    pub remote_error: bool,
    /// Return results with no content, only structured content.
    pub structured_only: bool,
}

impl FakeServer {
    pub fn with_tools(names: &[&str]) -> Self {
        Self {
            tools: names.iter().map(|n| fake_tool(n)).collect(),
            ..Default::default()
        }
    }
}

pub fn fake_tool(name: &str) -> ToolDescriptor {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), serde_json::json!("object"));
    schema.insert(
        "properties".to_string(),
        serde_json::json!({ "query": { "type": "string" } }),
    );
    ToolDescriptor::new(name, Some(&format!("The {name} tool")), schema)
}

/// Connector handing out [`FakeSession`]s and recording every call.
#[derive(Clone, Default)]
pub struct FakeConnector {
    servers: Arc<Mutex<HashMap<String, FakeServer>>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server(self, id: &str, server: FakeServer) -> Self {
        self.servers.lock().unwrap().insert(id.to_string(), server);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn open<'a>(
        &'a self,
        server: &'a ServerId,
        _config: &'a ServerConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn Session>>> {
        Box::pin(async move {
            self.events.lock().unwrap().push(format!("open {server}"));
            let behaviour = self
                .servers
                .lock()
                .unwrap()
                .get(server.as_str())
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))?;
            if let Some(msg) = &behaviour.fail_open {
                return Err(anyhow::anyhow!("{msg}"));
            }
            let session: Arc<dyn Session> = Arc::new(FakeSession {
                server: server.to_string(),
                behaviour,
                events: self.events.clone(),
            });
            Ok(session)
        })
    }
}

pub struct FakeSession {
    server: String,
    behaviour: FakeServer,
    events: Arc<Mutex<Vec<String>>>,
}

impl Session for FakeSession {
    fn list_tools(&self) -> BoxFuture<'_, Result<Vec<ToolDescriptor>>> {
        Box::pin(async move {
            self.events.lock().unwrap().push(format!("list {}", self.server));
            match &self.behaviour.fail_list {
                Some(msg) => Err(anyhow::anyhow!("{msg}")),
                None => Ok(self.behaviour.tools.clone()),
            }
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        args: JsonObject,
    ) -> BoxFuture<'a, Result<CallToolResult>> {
        Box::pin(async move {
            self.events
                .lock()
                .unwrap()
                .push(format!("call {}/{}", self.server, name));
            if let Some(msg) = &self.behaviour.fail_call {
                return Err(anyhow::anyhow!("{msg}"));
            }
            let text = format!(
                "{}:{}:{}",
                self.server,
                name,
                serde_json::Value::Object(args.clone())
            );
            if self.behaviour.structured_only {
                let mut result = CallToolResult::success(Vec::new());
                result.structured_content = Some(serde_json::json!({
                    "server": self.server,
                    "tool": name,
                }));
                return Ok(result);
            }
            if self.behaviour.remote_error {
                return Ok(CallToolResult::error(vec![Content::text(text)]));
            }
            Ok(CallToolResult::success(vec![Content::text(text)]))
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.events.lock().unwrap().push(format!("close {}", self.server));
            match &self.behaviour.fail_close {
                Some(msg) => Err(anyhow::anyhow!("{msg}")),
                None => Ok(()),
            }
        })
    }
}

/// Text of the first content block of a tool result.
pub fn first_text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

/// `tracing` writer that keeps everything in memory.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Install a subscriber writing into this buffer for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! Error types for registry operations.

use std::fmt;

use crate::types::ToolKey;

/// Errors returned by the tool registry.
#[derive(Debug, Clone)]
pub enum BridgeError {
    /// The server identifier cannot be used as a tool-name prefix.
    InvalidServerId { server: String, reason: String },

    /// A session for this server identifier is already open.
    AlreadyConnected(String),

    /// Opening the session, the handshake or tool enumeration failed.
    Connection { server: String, message: String },

    /// No tool is registered under `(server, tool)`.
    ToolNotFound {
        server: String,
        tool: String,
        /// Every key known to the registry when the lookup failed.
        known: Vec<ToolKey>,
    },

    /// The remote call failed at the transport or protocol level.
    ToolInvocation {
        server: String,
        tool: String,
        message: String,
    },

    /// Closing a session failed. Only ever logged by the registry.
    Disconnect { server: String, message: String },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidServerId { server, reason } => {
                write!(f, "Invalid MCP server identifier `{}`: {}", server, reason)
            }
            Self::AlreadyConnected(server) => {
                write!(f, "MCP server `{}` is already connected", server)
            }
            Self::Connection { server, message } => {
                write!(f, "Failed to connect to MCP server `{}`: {}", server, message)
            }
            Self::ToolNotFound { server, tool, known } => {
                let known = if known.is_empty() {
                    "none".to_string()
                } else {
                    known
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                write!(
                    f,
                    "Tool `{}` not found on MCP server `{}` (known tools: {})",
                    tool, server, known
                )
            }
            Self::ToolInvocation {
                server,
                tool,
                message,
            } => write!(
                f,
                "Tool `{}` on MCP server `{}` failed: {}",
                tool, server, message
            ),
            Self::Disconnect { server, message } => {
                write!(f, "Failed to close MCP server `{}`: {}", server, message)
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Result type for registry operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Convert this error to an MCP ErrorData for protocol responses.
    pub fn to_mcp_error(&self) -> rmcp::ErrorData {
        match self {
            Self::ToolNotFound { known, .. } => {
                let data = serde_json::json!({
                    "knownTools": known
                        .iter()
                        .map(|k| serde_json::json!({ "server": k.server, "tool": k.tool }))
                        .collect::<Vec<_>>(),
                });
                rmcp::ErrorData::invalid_params(self.to_string(), Some(data))
            }
            Self::InvalidServerId { .. } | Self::AlreadyConnected(_) => {
                rmcp::ErrorData::invalid_params(self.to_string(), None)
            }
            Self::Connection { .. } | Self::ToolInvocation { .. } | Self::Disconnect { .. } => {
                rmcp::ErrorData::internal_error(self.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_lists_known_keys() {
        let err = BridgeError::ToolNotFound {
            server: "alpha".to_string(),
            tool: "missing".to_string(),
            known: vec![ToolKey::new("alpha", "ask"), ToolKey::new("beta", "ask")],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing"));
        assert!(msg.contains("alpha/ask"));
        assert!(msg.contains("beta/ask"));
    }

    #[test]
    fn test_tool_not_found_with_empty_index() {
        let err = BridgeError::ToolNotFound {
            server: "alpha".to_string(),
            tool: "ask".to_string(),
            known: Vec::new(),
        };
        assert!(err.to_string().contains("known tools: none"));
    }

    #[test]
    fn test_connection_error_names_server() {
        let err = BridgeError::Connection {
            server: "github".to_string(),
            message: "handshake refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to MCP server `github`: handshake refused"
        );
    }

    #[test]
    fn test_to_mcp_error_carries_known_tools() {
        let err = BridgeError::ToolNotFound {
            server: "alpha".to_string(),
            tool: "missing".to_string(),
            known: vec![ToolKey::new("alpha", "ask")],
        };
        let mcp = err.to_mcp_error();
        let data = mcp.data.expect("tool-not-found carries data");
        assert_eq!(data["knownTools"][0]["server"], "alpha");
        assert_eq!(data["knownTools"][0]["tool"], "ask");
    }
}

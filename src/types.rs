//! NewType wrappers for the identifiers the bridge passes around.
//!
//! Server identifiers and tool names are both plain strings on the wire;
//! keeping them apart in the type system stops a tool name from being used
//! where a server identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between server identifier and tool name in registered names.
pub const TOOL_NAME_SEPARATOR: char = '_';

/// Longest server identifier accepted by configuration and `connect`.
pub const MAX_SERVER_ID_LENGTH: usize = 64;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Identifier of a configured remote MCP server (e.g. "github").
    ///
    /// This is the key used under `servers` in the plugin configuration and
    /// the prefix of every registered tool name. It never contains
    /// [`TOOL_NAME_SEPARATOR`].
    ServerId
);

newtype_string!(
    /// Tool name as reported by the remote server's `tools/list`.
    ///
    /// The same name may appear on several servers; a tool is only unique
    /// together with its [`ServerId`].
    ToolName
);

/// Composite key identifying one tool on one server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolKey {
    pub server: ServerId,
    pub tool: ToolName,
}

impl ToolKey {
    pub fn new(server: impl Into<ServerId>, tool: impl Into<ToolName>) -> Self {
        Self {
            server: server.into(),
            tool: tool.into(),
        }
    }

    /// Host-visible name for this tool, `server_tool`.
    pub fn registered_name(&self) -> String {
        registered_name(self.server.as_str(), self.tool.as_str())
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.tool)
    }
}

/// Build the host-visible name for a remote tool.
pub fn registered_name(server: &str, tool: &str) -> String {
    format!("{server}{TOOL_NAME_SEPARATOR}{tool}")
}

/// Split a registered name back into server identifier and tool name.
///
/// Server identifiers never contain the separator, so the first occurrence
/// is always the boundary.
pub fn split_registered_name(name: &str) -> Option<(&str, &str)> {
    name.split_once(TOOL_NAME_SEPARATOR)
        .filter(|(server, tool)| !server.is_empty() && !tool.is_empty())
}

/// Check that a server identifier can be used as a registered-name prefix.
///
/// Returns the reason on failure.
pub fn validate_server_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("identifier is empty".to_string());
    }
    if id.len() > MAX_SERVER_ID_LENGTH {
        return Err(format!(
            "identifier is longer than {MAX_SERVER_ID_LENGTH} characters"
        ));
    }
    if id.contains(TOOL_NAME_SEPARATOR) {
        return Err(format!(
            "identifier must not contain the separator `{TOOL_NAME_SEPARATOR}`"
        ));
    }
    if let Some(bad) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
        return Err(format!("identifier contains unsupported character `{bad}`"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_id_creation() {
        let id = ServerId::new("github");
        assert_eq!(id.as_str(), "github");
        assert_eq!(id.to_string(), "github");
        assert_eq!(id.into_inner(), "github");
    }

    #[test]
    fn test_tool_name_serde_is_transparent() {
        let name = ToolName::new("read_file");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"read_file\"");

        let parsed: ToolName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn test_registered_name_uses_separator() {
        let key = ToolKey::new("github", "search_issues");
        assert_eq!(key.registered_name(), "github_search_issues");
        assert_eq!(key.to_string(), "github/search_issues");
    }

    #[test]
    fn test_split_registered_name_uses_first_separator() {
        assert_eq!(
            split_registered_name("github_search_issues"),
            Some(("github", "search_issues"))
        );
        assert_eq!(split_registered_name("noseparator"), None);
        assert_eq!(split_registered_name("_tool"), None);
        assert_eq!(split_registered_name("server_"), None);
    }

    #[test]
    fn test_registered_names_do_not_collide_across_servers() {
        let a = ToolKey::new("alpha", "ask");
        let b = ToolKey::new("beta", "ask");
        assert_ne!(a, b);
        assert_ne!(a.registered_name(), b.registered_name());
    }

    #[test]
    fn test_validate_server_id() {
        assert!(validate_server_id("github").is_ok());
        assert!(validate_server_id("my-server-2").is_ok());

        assert!(validate_server_id("").is_err());
        assert!(validate_server_id("my_server").is_err());
        assert!(validate_server_id("my server").is_err());
        assert!(validate_server_id("srv:1").is_err());
        assert!(validate_server_id(&"a".repeat(MAX_SERVER_ID_LENGTH + 1)).is_err());
    }
}

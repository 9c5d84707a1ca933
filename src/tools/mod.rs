//! Host-facing tools.
//!
//! Every tool discovered on a remote MCP server is wrapped as a `RemoteTool`
//! named `server_tool`; two escape-hatch tools list and call remote tools by
//! `(server, tool)`.

mod registry;
mod result;

pub use registry::{HostTool, ToolHost};
pub use result::{error_result, into_host_result};

// Tool handler implementations
mod remote_tool;
mod list_tools;
mod call_tool;

pub use remote_tool::RemoteTool;
pub use list_tools::ListToolsHandler;
pub use call_tool::CallToolHandler;

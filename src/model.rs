use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};

/// Descriptor of one remote tool as reported by `tools/list`.
///
/// The input schema is carried as an opaque JSON object; the remote server
/// validates arguments against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: Option<&str>, input_schema: JsonObject) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            input_schema: Arc::new(input_schema),
        }
    }
}

impl From<Tool> for ToolDescriptor {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()),
            input_schema: tool.input_schema,
        }
    }
}


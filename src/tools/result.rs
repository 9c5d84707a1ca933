//! Conversion of registry outcomes into the uniform host result shape.

use rmcp::model::{CallToolResult, Content};
use tracing::warn;

use crate::error::BridgeResult;

/// Fold a dispatch outcome into a result the host can always consume.
///
/// Remote content passes through unchanged. A result without content is
/// rendered as one JSON text block (structured content if present, else the
/// whole raw result). Failures become a single text block with `is_error`.
pub fn into_host_result(outcome: BridgeResult<CallToolResult>) -> CallToolResult {
    match outcome {
        Ok(mut result) => {
            if result.content.is_empty() {
                let raw = match &result.structured_content {
                    Some(structured) => serde_json::to_string(structured),
                    None => serde_json::to_string(&result),
                };
                let text = raw.unwrap_or_else(|_| "internal serialization error".to_string());
                result.content = vec![Content::text(text)];
            }
            result.is_error = Some(result.is_error.unwrap_or(false));
            result
        }
        Err(e) => {
            warn!("{}", e);
            error_result(e.to_string())
        }
    }
}

/// Single-text-block result with `is_error` set.
pub fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

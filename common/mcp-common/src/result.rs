//! Result helpers for MCP tool responses

use rmcp::model::{CallToolResult, Content};

/// Create a successful plain text response
///
/// The whole tool output travels as a single text content item, so an
/// empty string is still a successful (empty) answer.
///
/// # Arguments
///
/// * `text` - Any type that can be converted to a `String`
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::text_success;
///
/// fn my_tool(&self) -> Result<CallToolResult, McpError> {
///     let rendered = format_rows(&rows)?;
///     Ok(text_success(rendered))
/// }
/// ```
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

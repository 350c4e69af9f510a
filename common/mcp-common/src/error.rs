//! Error handling utilities for MCP servers

use rmcp::ErrorData as McpError;

/// Type alias for MCP tool results
pub type McpResult<T> = Result<T, McpError>;

/// Trait for converting errors into MCP-compatible errors
///
/// Implement this for a server's domain error to choose which MCP error
/// code each variant maps to, then use [`ResultExt::to_mcp_err`] with `?`.
pub trait IntoMcpError {
    /// Convert this error into an MCP error
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for anyhow::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("{:#}", self), None)
    }
}

impl IntoMcpError for String {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(self, None)
    }
}

/// Extension trait for Result types to convert to MCP errors
pub trait ResultExt<T> {
    /// Convert the error to an MCP error
    fn to_mcp_err(self) -> McpResult<T>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> McpResult<T> {
        self.map_err(|e| e.into_mcp_error())
    }
}

/// Internal error: the tool ran but the backend failed
///
/// # Arguments
///
/// * `message` - Text shown to the client as the error message
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::internal_error;
///
/// fn my_tool(&self) -> Result<CallToolResult, McpError> {
///     let rows = db.query(sql).await.map_err(|e| internal_error(e.to_string()))?;
///     // ...
/// }
/// ```
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// Invalid request: the tool refuses this input outright
///
/// Use this when the call is rejected before any work is done, so the
/// client can tell a refused input apart from a failed backend.
///
/// # Arguments
///
/// * `message` - Text shown to the client as the error message
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::invalid_request;
///
/// fn my_tool(&self, query: &str) -> Result<CallToolResult, McpError> {
///     if !query.trim_start().to_uppercase().starts_with("SELECT") {
///         return Err(invalid_request("only SELECT queries are allowed"));
///     }
///     // ...
/// }
/// ```
pub fn invalid_request(message: impl Into<String>) -> McpError {
    McpError::invalid_request(message.into(), None)
}

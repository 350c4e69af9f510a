//! Embeddable MCP trait for in-process execution
//!
//! [`EmbeddableMcp`] lets a host (or a test) call a server's tools by name
//! without a transport in between.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let tools = server.list_tools();
//! let result = server
//!     .call_tool("execute_query", serde_json::json!({ "query": "SELECT 1" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool was not found in the server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Parameters did not match the tool's input type
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// The tool returned an MCP error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// Implementations must be `Send + Sync`; tool calls may arrive
/// concurrently from multiple tasks.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Server name, matching the name used in MCP configuration files
    fn server_name(&self) -> &str;

    /// All available tools with their input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name with JSON parameters
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    fn server_description(&self) -> Option<&str> {
        None
    }
}

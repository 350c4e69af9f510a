//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: `serve_stdio!` macro for standardized server startup
//! - **Results**: `text_success` for plain text tool responses
//! - **Errors**: constructors and conversion traits for MCP errors
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, text_success};
//!
//! // In main.rs
//! serve_stdio!(MyServer, "my_mcp");
//!
//! // In a tool
//! fn my_tool(&self) -> Result<CallToolResult, McpError> {
//!     Ok(text_success("done"))
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, invalid_request, IntoMcpError, McpResult, ResultExt};
pub use init::init_tracing;
pub use result::text_success;

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;

//! MCP Server implementation for gated SQL execution
//!
//! Registers the read, schema and modify tools. Handler implementations
//! are in the handlers module.

use std::sync::Arc;

use anyhow::Context;
use mcp_common::{
    async_trait, CallToolResult, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError, Tool,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::config::SqlGateConfig;
use crate::db::{self, Database};
use crate::handlers;
use crate::params::QueryParams;

const INSTRUCTIONS: &str = "SQL gate MCP server. Use execute_query for SELECT queries, \
     ddl_query for CREATE, DROP and ALTER, and modify_query for INSERT, UPDATE and DELETE. \
     Queries are screened by their leading keyword only.";

/// The SQL gate MCP Server
#[derive(Clone)]
pub struct SqlGateServer {
    db: Arc<dyn Database>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl SqlGateServer {
    /// Create a server over an already opened database
    pub fn with_database(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    /// Load config from standard locations and open the database
    pub async fn connect() -> anyhow::Result<Self> {
        let config = SqlGateConfig::load()?;
        Self::connect_with_config(&config).await
    }

    pub async fn connect_with_config(config: &SqlGateConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database)
            .await
            .context("DB connection failed")?;

        tracing::info!(backend = db.backend(), "Database connected");

        Ok(Self::with_database(db))
    }

    #[tool(description = "Execute raw SQL SELECT")]
    async fn execute_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::execute_query(self.db.as_ref(), params).await
    }

    #[tool(description = "Run a DDL query (CREATE, DROP, ALTER)")]
    async fn ddl_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::ddl_query(self.db.as_ref(), params).await
    }

    #[tool(description = "Run a DML query (INSERT, UPDATE, DELETE)")]
    async fn modify_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::modify_query(self.db.as_ref(), params).await
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for SqlGateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for SqlGateServer {
    fn server_name(&self) -> &str {
        "sqlgate"
    }

    fn server_description(&self) -> Option<&str> {
        Some(INSTRUCTIONS)
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let call = match name {
            "execute_query" | "ddl_query" | "modify_query" => {
                Parameters(serde_json::from_value::<QueryParams>(params)?)
            }
            _ => return Err(EmbeddableError::ToolNotFound(name.to_string())),
        };

        let result = match name {
            "execute_query" => self.execute_query(call).await,
            "ddl_query" => self.ddl_query(call).await,
            _ => self.modify_query(call).await,
        };

        result.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDatabase;

    fn create_test_server() -> SqlGateServer {
        let db = SqliteDatabase::open_in_memory().unwrap();
        SqlGateServer::with_database(Arc::new(db))
    }

    #[test]
    fn test_embeddable_server_name() {
        let server = create_test_server();
        assert_eq!(server.server_name(), "sqlgate");
    }

    #[test]
    fn test_embeddable_list_tools() {
        let server = create_test_server();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 3);

        let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(tool_names.contains(&"execute_query"));
        assert!(tool_names.contains(&"ddl_query"));
        assert!(tool_names.contains(&"modify_query"));
    }

    #[test]
    fn test_tools_require_query_string() {
        let server = create_test_server();
        for tool in server.list_tools() {
            let schema = serde_json::Value::Object((*tool.input_schema).clone());
            assert_eq!(schema["properties"]["query"]["type"], "string", "{}", tool.name);
            let required = schema["required"].as_array().unwrap();
            assert!(required.contains(&serde_json::json!("query")), "{}", tool.name);
        }
    }

    #[tokio::test]
    async fn test_embeddable_unknown_tool() {
        let server = create_test_server();
        let result = server
            .call_tool("drop_everything", serde_json::json!({ "query": "DROP TABLE t" }))
            .await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_embeddable_missing_query_field() {
        let server = create_test_server();
        let result = server.call_tool("execute_query", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::SerdeError(_))));
    }

    #[tokio::test]
    async fn test_embeddable_rejection_is_mcp_error() {
        let server = create_test_server();
        let result = server
            .call_tool("execute_query", serde_json::json!({ "query": "DELETE FROM t" }))
            .await;

        match result {
            Err(EmbeddableError::McpError(message)) => {
                assert_eq!(message, "only SELECT queries are allowed")
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}

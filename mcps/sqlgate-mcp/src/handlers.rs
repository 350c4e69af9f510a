//! Tool handlers
//!
//! Each handler runs the query through its policy, then through the
//! executor, and maps the outcome onto the MCP response envelope. A
//! rejected query never reaches the database.

use mcp_common::{
    internal_error, invalid_request, text_success, CallToolResult, IntoMcpError, McpError,
    McpResult, ResultExt,
};

use crate::db::Database;
use crate::executor::{execute_read, execute_statement};
use crate::params::QueryParams;
use crate::policy::OperationClass;
use crate::types::GateError;

// ============================================================================
// Helper Functions
// ============================================================================

impl IntoMcpError for GateError {
    fn into_mcp_error(self) -> McpError {
        match &self {
            GateError::PolicyRejected { .. } => invalid_request(self.to_string()),
            GateError::ExecutionFailed { .. } | GateError::ResultReadFailed(_) => {
                internal_error(self.to_string())
            }
        }
    }
}

/// Gate a query for the given class, then run it
pub async fn run(
    db: &dyn Database,
    class: OperationClass,
    query: &str,
) -> Result<String, GateError> {
    if let Err(e) = class.check(query) {
        tracing::warn!(?class, "Rejected query: {}", e);
        return Err(e);
    }

    let result = match class {
        OperationClass::Read => execute_read(db, query).await,
        OperationClass::Schema | OperationClass::Modify => {
            execute_statement(db, query).await.map(str::to_string)
        }
    };

    if let Err(e) = &result {
        tracing::warn!(?class, "Query failed: {}", e);
    }

    result
}

async fn respond(
    db: &dyn Database,
    class: OperationClass,
    params: QueryParams,
) -> McpResult<CallToolResult> {
    tracing::debug!(?class, query_len = params.query.len(), "Tool call");

    let text = run(db, class, &params.query).await.to_mcp_err()?;

    Ok(text_success(text))
}

// ============================================================================
// Handler Functions
// ============================================================================

pub async fn execute_query(
    db: &dyn Database,
    params: QueryParams,
) -> McpResult<CallToolResult> {
    respond(db, OperationClass::Read, params).await
}

pub async fn ddl_query(db: &dyn Database, params: QueryParams) -> McpResult<CallToolResult> {
    respond(db, OperationClass::Schema, params).await
}

pub async fn modify_query(
    db: &dyn Database,
    params: QueryParams,
) -> McpResult<CallToolResult> {
    respond(db, OperationClass::Modify, params).await
}

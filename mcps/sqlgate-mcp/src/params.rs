//! Parameter types for SQL gate MCP tools

use schemars::JsonSchema;
use serde::Deserialize;

/// Input shared by all three tools
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    #[schemars(description = "Raw SQL query to execute")]
    pub query: String,
}

//! SQL gate MCP - raw SQL behind read, schema and modify tools
//!
//! Each tool screens the query's leading keyword before forwarding it to
//! the configured database.

use sqlgate_mcp::SqlGateServer;

mcp_common::serve_stdio!(SqlGateServer, "sqlgate_mcp");

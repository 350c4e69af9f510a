//! SQL gate MCP Library
//!
//! Exposes a relational database through three tools, each screening the
//! query's leading keyword before it reaches the database:
//!
//! - `execute_query`: SELECT only, rows rendered as `"col: value\t"` lines
//! - `ddl_query`: CREATE, DROP or ALTER
//! - `modify_query`: INSERT, UPDATE or DELETE
//!
//! SQLite is built in. PostgreSQL is available behind the `postgres` feature.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlgate_mcp::{SqlGateServer, SqliteDatabase};
//!
//! let db = SqliteDatabase::open_in_memory()?;
//! let server = SqlGateServer::with_database(Arc::new(db));
//! // Use with in-memory transport or serve via stdio
//! ```

pub mod config;
pub mod db;
pub mod executor;
pub mod format;
pub mod handlers;
pub mod params;
pub mod policy;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::SqlGateServer;

// Re-export the pieces needed to drive the server directly
pub use config::SqlGateConfig;
pub use db::{Database, DbError, ResultSet, SqliteDatabase, Value};
pub use params::QueryParams;
pub use policy::{classify, OperationClass};
pub use types::GateError;

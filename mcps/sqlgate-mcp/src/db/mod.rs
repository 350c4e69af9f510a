//! Database capability
//!
//! The server never owns a global connection. It holds an
//! `Arc<dyn Database>` handed to it at construction, so any backend (or a
//! test stub) can stand behind the tools.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DatabaseConfig;

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;

/// Errors reported by a database backend
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not open or reach the database
    #[error("{0}")]
    Connect(String),

    /// The SQL was rejected or failed while running
    #[error("{0}")]
    Statement(String),

    /// Column metadata or a row value could not be read
    #[error("{0}")]
    Read(String),
}

/// A single value as read from the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl From<rusqlite::types::Value> for Value {
    fn from(value: rusqlite::types::Value) -> Self {
        match value {
            rusqlite::types::Value::Null => Value::Null,
            rusqlite::types::Value::Integer(i) => Value::Integer(i),
            rusqlite::types::Value::Real(f) => Value::Real(f),
            rusqlite::types::Value::Text(s) => Value::Text(s),
            rusqlite::types::Value::Blob(b) => Value::Blob(b),
        }
    }
}

/// Rows returned by a query, in database order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names in result order
    pub columns: Vec<String>,
    /// One entry per row, values aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Capability handle over a live database
///
/// Implementations own their own concurrency story (locking, pooling).
/// Callers may invoke these concurrently and must not assume exclusive
/// access.
#[async_trait]
pub trait Database: Send + Sync {
    /// Short backend name for logs ("sqlite", "postgres")
    fn backend(&self) -> &str;

    /// Run a row-returning query
    async fn query(&self, sql: &str) -> Result<ResultSet, DbError>;

    /// Run a statement for its side effect
    async fn execute(&self, sql: &str) -> Result<(), DbError>;
}

/// Where the configured URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    SqliteMemory,
    SqliteFile(std::path::PathBuf),
    Postgres(String),
}

impl DatabaseTarget {
    /// Interpret a connection URL or bare path
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return DatabaseTarget::Postgres(url.to_string());
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if path.is_empty() || path == ":memory:" {
            DatabaseTarget::SqliteMemory
        } else {
            DatabaseTarget::SqliteFile(std::path::PathBuf::from(path))
        }
    }

    /// Location safe to log (credentials stripped)
    pub fn redacted(&self) -> String {
        match self {
            DatabaseTarget::SqliteMemory => "sqlite::memory:".to_string(),
            DatabaseTarget::SqliteFile(path) => format!("sqlite://{}", path.display()),
            DatabaseTarget::Postgres(url) => match url.rsplit_once('@') {
                Some((_, host)) => format!("postgres://***@{}", host),
                None => url.clone(),
            },
        }
    }
}

/// Open the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Database>, DbError> {
    let target = DatabaseTarget::parse(&config.url);
    tracing::info!("Connecting to {}", target.redacted());

    match target {
        DatabaseTarget::SqliteMemory => Ok(Arc::new(SqliteDatabase::open_in_memory()?)),
        DatabaseTarget::SqliteFile(path) => Ok(Arc::new(SqliteDatabase::open(
            &path,
            std::time::Duration::from_secs(config.busy_timeout_secs),
        )?)),
        #[cfg(feature = "postgres")]
        DatabaseTarget::Postgres(url) => Ok(Arc::new(
            PostgresDatabase::connect(&url, config.max_connections).await?,
        )),
        #[cfg(not(feature = "postgres"))]
        DatabaseTarget::Postgres(_) => Err(DbError::Connect(
            "PostgreSQL support is not compiled in; rebuild with --features postgres".to_string(),
        )),
    }
}

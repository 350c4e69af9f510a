//! SQLite backend
//!
//! A read must hold exactly one statement; trailing statements are refused
//! rather than dropped. Statements run through `execute_batch` as sent.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Batch, Connection};
use tokio::sync::Mutex;

use super::{Database, DbError, ResultSet, Value};

/// SQLite database behind a shared connection
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    /// Open (or create) a database file
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, DbError> {
        let conn = Connection::open(path).map_err(|e| {
            DbError::Connect(format!("Failed to open database at {:?}: {}", path, e))
        })?;

        conn.busy_timeout(busy_timeout)
            .map_err(|e| DbError::Connect(format!("Failed to set busy timeout: {}", e)))?;

        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DbError::Connect(format!("Failed to create in-memory database: {}", e))
        })?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn backend(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        let conn = self.conn.lock().await;

        let mut batch = Batch::new(&conn, sql);

        let mut stmt = batch
            .next()
            .map_err(|e| DbError::Statement(e.to_string()))?
            .ok_or_else(|| DbError::Statement("query contains no statement".to_string()))?;

        // Preparing the tail compiles it without running it
        if batch
            .next()
            .map_err(|e| DbError::Statement(e.to_string()))?
            .is_some()
        {
            return Err(DbError::Statement(
                "cannot run multiple statements in a read query".to_string(),
            ));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = stmt
            .query([])
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(|e| DbError::Read(e.to_string()))? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: rusqlite::types::Value =
                    row.get(i).map_err(|e| DbError::Read(e.to_string()))?;
                values.push(Value::from(value));
            }
            result.push(values);
        }

        Ok(ResultSet::new(columns, result))
    }

    async fn execute(&self, sql: &str) -> Result<(), DbError> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql)
            .map_err(|e| DbError::Statement(e.to_string()))
    }
}

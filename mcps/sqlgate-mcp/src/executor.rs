//! Query execution against the database capability
//!
//! Callers must have passed the query through the policy gate already.
//! SQL is forwarded unmodified. Failures are returned immediately without
//! retry.

use crate::db::{Database, DbError};
use crate::format::format_rows;
use crate::types::{GateError, Phase};

/// Confirmation text returned after a successful statement
pub const SUCCESS_MESSAGE: &str = "Query executed successfully.";

fn db_error(phase: Phase, err: DbError) -> GateError {
    match err {
        DbError::Read(message) => GateError::ResultReadFailed(message),
        DbError::Connect(message) | DbError::Statement(message) => {
            GateError::ExecutionFailed { phase, message }
        }
    }
}

/// Run a read query and render its rows as tabular text
pub async fn execute_read(db: &dyn Database, query: &str) -> Result<String, GateError> {
    let result = db
        .query(query)
        .await
        .map_err(|e| db_error(Phase::Query, e))?;

    tracing::debug!(
        backend = db.backend(),
        rows = result.rows.len(),
        "Query returned rows"
    );

    format_rows(&result)
}

/// Run a schema or modify statement for its side effect
pub async fn execute_statement(db: &dyn Database, query: &str) -> Result<&'static str, GateError> {
    db.execute(query)
        .await
        .map_err(|e| db_error(Phase::Execution, e))?;

    tracing::debug!(backend = db.backend(), "Statement executed");

    Ok(SUCCESS_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ResultSet, Value};
    use async_trait::async_trait;

    /// Returns a fixed outcome for every call
    struct ScriptedDb {
        rows: Option<ResultSet>,
        error: Option<fn() -> DbError>,
    }

    #[async_trait]
    impl Database for ScriptedDb {
        fn backend(&self) -> &str {
            "scripted"
        }

        async fn query(&self, _sql: &str) -> Result<ResultSet, DbError> {
            match self.error {
                Some(make) => Err(make()),
                None => Ok(self.rows.clone().unwrap_or_default()),
            }
        }

        async fn execute(&self, _sql: &str) -> Result<(), DbError> {
            match self.error {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_read_formats_rows() {
        let db = ScriptedDb {
            rows: Some(ResultSet::new(
                vec!["id".into(), "name".into()],
                vec![
                    vec![Value::Integer(1), Value::Text("a".into())],
                    vec![Value::Integer(2), Value::Text("b".into())],
                ],
            )),
            error: None,
        };

        let text = execute_read(&db, "SELECT id, name FROM t").await.unwrap();
        assert_eq!(text, "id: 1\tname: a\t\nid: 2\tname: b\t\n");
    }

    #[tokio::test]
    async fn test_read_zero_rows() {
        let db = ScriptedDb {
            rows: None,
            error: None,
        };
        assert_eq!(execute_read(&db, "SELECT 1 WHERE 0").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_read_wraps_query_error() {
        let db = ScriptedDb {
            rows: None,
            error: Some(|| DbError::Statement("no such table: missing".into())),
        };

        let err = execute_read(&db, "SELECT * FROM missing").await.unwrap_err();
        assert_eq!(err.to_string(), "query failed: no such table: missing");
    }

    #[tokio::test]
    async fn test_read_mid_stream_failure() {
        let db = ScriptedDb {
            rows: None,
            error: Some(|| DbError::Read("invalid column type".into())),
        };

        let err = execute_read(&db, "SELECT x FROM t").await.unwrap_err();
        assert!(matches!(err, GateError::ResultReadFailed(_)));
    }

    #[tokio::test]
    async fn test_statement_success_marker() {
        let db = ScriptedDb {
            rows: None,
            error: None,
        };
        let message = execute_statement(&db, "CREATE TABLE t (id INT)").await.unwrap();
        assert_eq!(message, SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_statement_wraps_execution_error() {
        let db = ScriptedDb {
            rows: None,
            error: Some(|| DbError::Statement("UNIQUE constraint failed: t.id".into())),
        };

        let err = execute_statement(&db, "INSERT INTO t VALUES (1)")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GateError::ExecutionFailed {
                phase: Phase::Execution,
                ..
            }
        ));
        assert!(err.to_string().contains("UNIQUE constraint failed: t.id"));
    }

    #[tokio::test]
    async fn test_connect_error_is_execution_failure() {
        let db = ScriptedDb {
            rows: None,
            error: Some(|| DbError::Connect("connection refused".into())),
        };

        let err = execute_statement(&db, "DELETE FROM t").await.unwrap_err();
        assert_eq!(err.to_string(), "execution failed: connection refused");
    }
}

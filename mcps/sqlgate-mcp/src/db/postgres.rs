//! PostgreSQL backend
//!
//! Reads go through the extended query protocol (`sqlx::query`), which
//! PostgreSQL refuses for strings holding more than one command, and each
//! column is decoded by its type. Statements go through `sqlx::raw_sql`
//! and run as sent.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, JsonValue, Uuid};
use sqlx::{Column, Postgres, Row, TypeInfo};

use super::{Database, DbError, ResultSet, Value};

/// PostgreSQL database behind a driver-managed pool
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| DbError::Connect(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::debug!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(convert_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResultSet::new(columns, rows))
    }

    async fn execute(&self, sql: &str) -> Result<(), DbError> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DbError::Statement(e.to_string()))
    }
}

/// Converts a sqlx PgRow to our value list
fn convert_row(row: &PgRow) -> Result<Vec<Value>, DbError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Option<T>, DbError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(index)
        .map_err(|e| DbError::Read(e.to_string()))
}

/// Decodes one column by its PostgreSQL type
///
/// Types without a dedicated arm are read as text; a column that cannot
/// be read as text is a read failure, not a silent NULL.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value, DbError> {
    let value = match type_name {
        "BOOL" => get::<bool>(row, index)?.map(Value::Bool),
        "INT2" => get::<i16>(row, index)?.map(|v| Value::Integer(i64::from(v))),
        "INT4" => get::<i32>(row, index)?.map(|v| Value::Integer(i64::from(v))),
        "INT8" => get::<i64>(row, index)?.map(Value::Integer),
        "FLOAT4" => get::<f32>(row, index)?.map(|v| Value::Real(f64::from(v))),
        "FLOAT8" => get::<f64>(row, index)?.map(Value::Real),
        "BYTEA" => get::<Vec<u8>>(row, index)?.map(Value::Blob),
        "NUMERIC" => get::<Decimal>(row, index)?.map(|v| Value::Text(v.to_string())),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, index)?.map(|v| Value::Text(v.to_string())),
        "TIMESTAMP" => get::<NaiveDateTime>(row, index)?.map(|v| Value::Text(v.to_string())),
        "DATE" => get::<NaiveDate>(row, index)?.map(|v| Value::Text(v.to_string())),
        "TIME" => get::<NaiveTime>(row, index)?.map(|v| Value::Text(v.to_string())),
        "UUID" => get::<Uuid>(row, index)?.map(|v| Value::Text(v.to_string())),
        "JSON" | "JSONB" => get::<JsonValue>(row, index)?.map(|v| Value::Text(v.to_string())),
        _ => get::<String>(row, index)?.map(Value::Text),
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connection string for a disposable PostgreSQL database
    fn test_url() -> Option<String> {
        std::env::var("SQLGATE_TEST_POSTGRES_URL").ok()
    }

    #[tokio::test]
    #[ignore = "integration test - requires SQLGATE_TEST_POSTGRES_URL"]
    async fn test_postgres_typed_rendering() {
        let Some(url) = test_url() else {
            eprintln!("Skipping: SQLGATE_TEST_POSTGRES_URL not set");
            return;
        };

        let db = PostgresDatabase::connect(&url, 1).await.unwrap();
        let result = db
            .query(
                "SELECT 1 AS id, 'a' AS name, NULL::text AS missing, true AS flag, \
                 1.5::float8 AS ratio, '\\x0102'::bytea AS data, DATE '2024-01-02' AS day",
            )
            .await
            .unwrap();

        assert_eq!(
            result.columns,
            vec!["id", "name", "missing", "flag", "ratio", "data", "day"]
        );
        assert_eq!(
            result.rows,
            vec![vec![
                Value::Integer(1),
                Value::Text("a".into()),
                Value::Null,
                Value::Bool(true),
                Value::Real(1.5),
                Value::Blob(vec![1, 2]),
                Value::Text("2024-01-02".into()),
            ]]
        );
    }

    #[tokio::test]
    #[ignore = "integration test - requires SQLGATE_TEST_POSTGRES_URL"]
    async fn test_postgres_read_refuses_chained_statements() {
        let Some(url) = test_url() else {
            eprintln!("Skipping: SQLGATE_TEST_POSTGRES_URL not set");
            return;
        };

        let db = PostgresDatabase::connect(&url, 1).await.unwrap();
        db.execute("DROP TABLE IF EXISTS sqlgate_chain_target; CREATE TABLE sqlgate_chain_target (id int)")
            .await
            .unwrap();

        let err = db
            .query("SELECT 1 AS x; DROP TABLE sqlgate_chain_target")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Statement(_)));
        assert!(err.to_string().contains("multiple commands"), "{}", err);

        // Table survives the refused read
        let result = db
            .query("SELECT count(*) AS n FROM sqlgate_chain_target")
            .await
            .unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(0)]]);

        db.execute("DROP TABLE sqlgate_chain_target").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "integration test - requires SQLGATE_TEST_POSTGRES_URL"]
    async fn test_postgres_statement_error() {
        let Some(url) = test_url() else {
            eprintln!("Skipping: SQLGATE_TEST_POSTGRES_URL not set");
            return;
        };

        let db = PostgresDatabase::connect(&url, 1).await.unwrap();
        let err = db
            .execute("ALTER TABLE sqlgate_table_that_does_not_exist ADD COLUMN x int")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Statement(_)));
        assert!(err.to_string().contains("does not exist"));
    }
}

//! `sqlx`-backed driver session.
//!
//! Every statement runs to completion inside `execute`, so syntax errors,
//! constraint violations, and the side effects of `RETURNING` statements
//! never wait on a fetch. Rows are buffered on the cursor.

use super::type_mapping::affinity_code;
use crate::driver::{DriverColumn, DriverCursor, DriverError, DriverSession};
use crate::models::ColumnarBatch;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, Statement, TypeInfo};

/// Converts a `sqlx` error into a driver error, keeping SQLite's result
/// code when there is one.
pub(crate) fn driver_error(error: sqlx::Error) -> DriverError {
    match error.as_database_error() {
        Some(db_error) => {
            let driver_error = DriverError::new(db_error.message());
            match db_error.code().and_then(|c| c.parse::<i64>().ok()) {
                Some(code) => driver_error.with_code(code),
                None => driver_error,
            }
        }
        None => DriverError::new(error.to_string()),
    }
}

/// One open SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSession {
    pool: SqlitePool,
}

impl SqliteSession {
    /// Wraps an open pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs a statement that returns no rows.
    pub(crate) async fn run(&self, sql: &str) -> Result<u64, DriverError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(driver_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl DriverSession for SqliteSession {
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn DriverCursor>>, DriverError> {
        let statement = (&self.pool).prepare(sql).await.map_err(driver_error)?;
        let columns: Vec<DriverColumn> = statement
            .columns()
            .iter()
            .map(|c| DriverColumn::new(c.name(), affinity_code(c.type_info().name())))
            .collect();

        if columns.is_empty() {
            let rows_affected = self.run(sql).await?;
            tracing::debug!("Statement returned no result set ({} rows affected)", rows_affected);
            return Ok(None);
        }

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(driver_error)?;
        tracing::debug!("Statement returned {} rows", rows.len());

        Ok(Some(Box::new(SqliteCursor { columns, rows })))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Cursor over the buffered rows of one executed query.
///
/// Rows are handed out once; later fetches return an empty batch.
pub struct SqliteCursor {
    columns: Vec<DriverColumn>,
    rows: Vec<SqliteRow>,
}

impl SqliteCursor {
    fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn take_batch(&mut self, limit: Option<usize>) -> ColumnarBatch {
        let mut rows = std::mem::take(&mut self.rows);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        let values = rows
            .iter()
            .map(|row| {
                (0..self.columns.len())
                    .map(|i| extract_column_value(row, i))
                    .collect()
            })
            .collect();
        ColumnarBatch::from_rows(self.names(), values)
    }
}

#[async_trait]
impl DriverCursor for SqliteCursor {
    fn columns(&self) -> &[DriverColumn] {
        &self.columns
    }

    async fn fetch_all(&mut self) -> Result<ColumnarBatch, DriverError> {
        Ok(self.take_batch(None))
    }

    // Only the kept rows are converted to JSON.
    async fn fetch_many(&mut self, limit: usize) -> Result<Option<ColumnarBatch>, DriverError> {
        Ok(Some(self.take_batch(Some(limit))))
    }
}

/// Extracts a cell as a JSON value.
///
/// SQLite is dynamically typed, so each candidate type is tried in turn.
/// BLOBs are rendered as `base64:`-prefixed strings.
fn extract_column_value(row: &SqliteRow, index: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(JsonValue::Null, |bytes| {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            JsonValue::String(format!("base64:{}", encoded))
        });
    }

    JsonValue::Null
}

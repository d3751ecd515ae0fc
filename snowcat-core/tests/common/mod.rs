//! Scripted driver used by the adapter integration tests.
//!
//! `ScriptedSession` answers each statement from a table of canned
//! responses and counts how often every statement was executed, which is
//! what the laziness and memoization tests assert on.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use snowcat_core::driver::{DriverColumn, DriverCursor, DriverError, DriverSession};
use snowcat_core::models::ColumnarBatch;
use snowcat_core::snowflake::{SessionParams, SnowflakeConnector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Snowflake's code for "SQL compilation error".
pub const COMPILATION_ERROR: i64 = 1003;

/// Canned answer to one statement.
#[derive(Debug, Clone)]
pub enum Response {
    Rows {
        columns: Vec<DriverColumn>,
        rows: Vec<Vec<JsonValue>>,
    },
    NoResult,
    Fail(DriverError),
}

impl Response {
    /// A result set whose columns all carry type code 2 (TEXT).
    pub fn text_rows(columns: &[&str], rows: Vec<Vec<JsonValue>>) -> Self {
        Self::Rows {
            columns: columns.iter().map(|c| DriverColumn::new(*c, 2)).collect(),
            rows,
        }
    }

    pub fn fail(message: &str) -> Self {
        Self::Fail(DriverError::new(message).with_code(2003).with_sql_state("02000"))
    }
}

/// Session that replays scripted responses.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    responses: Mutex<HashMap<String, Response>>,
    calls: Mutex<HashMap<String, usize>>,
    closed: AtomicUsize,
}

impl ScriptedSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets (or replaces) the response to `sql`.
    pub fn respond(&self, sql: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(sql.to_string(), response);
    }

    /// How many times `sql` was executed.
    pub fn calls(&self, sql: &str) -> usize {
        self.calls.lock().unwrap().get(sql).copied().unwrap_or(0)
    }

    /// Total number of statements executed.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn close_calls(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverSession for ScriptedSession {
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn DriverCursor>>, DriverError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(sql.to_string())
            .or_default() += 1;

        let response = self.responses.lock().unwrap().get(sql).cloned();
        match response {
            Some(Response::Rows { columns, rows }) => {
                let names = columns.iter().map(|c| c.name.clone()).collect();
                Ok(Some(Box::new(ScriptedCursor {
                    columns,
                    batch: Some(ColumnarBatch::from_rows(names, rows)),
                })))
            }
            Some(Response::NoResult) => Ok(None),
            Some(Response::Fail(error)) => Err(error),
            None => Err(DriverError::new(format!(
                "SQL compilation error:\nsyntax error line 1 at position 0 unexpected '{}'.",
                sql.trim_end_matches(';')
            ))
            .with_code(COMPILATION_ERROR)
            .with_sql_state("42000")),
        }
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cursor that delivers its whole result as one batch, like the Snowflake
/// connectors' columnar fetch.
pub struct ScriptedCursor {
    columns: Vec<DriverColumn>,
    batch: Option<ColumnarBatch>,
}

#[async_trait]
impl DriverCursor for ScriptedCursor {
    fn columns(&self) -> &[DriverColumn] {
        &self.columns
    }

    async fn fetch_all(&mut self) -> Result<ColumnarBatch, DriverError> {
        Ok(self.batch.take().unwrap_or_else(|| {
            ColumnarBatch::empty(self.columns.iter().map(|c| c.name.clone()).collect())
        }))
    }
}

/// Connector handing out one shared scripted session.
pub struct ScriptedConnector {
    pub session: Arc<ScriptedSession>,
    login_error: Mutex<Option<DriverError>>,
    connects: AtomicUsize,
    last_params: Mutex<Option<SessionParams>>,
}

impl ScriptedConnector {
    pub fn new(session: Arc<ScriptedSession>) -> Arc<Self> {
        Arc::new(Self {
            session,
            login_error: Mutex::new(None),
            connects: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        })
    }

    /// Makes every later login fail with `error`.
    pub fn reject_logins(&self, error: DriverError) {
        *self.login_error.lock().unwrap() = Some(error);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<SessionParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnowflakeConnector for ScriptedConnector {
    async fn connect(&self, params: &SessionParams) -> Result<Arc<dyn DriverSession>, DriverError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(error) = self.login_error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(Arc::clone(&self.session) as Arc<dyn DriverSession>)
    }
}

//! Boundary traits for vendor database drivers.
//!
//! An adapter never talks to the network itself. It drives a
//! [`DriverSession`] (one open, authenticated session) and the
//! [`DriverCursor`]s it hands out. Errors at this layer are [`DriverError`]s;
//! adapters translate them into [`crate::AdapterError`] before they reach the
//! host.
//!
//! # Object Safety
//! Both traits are object-safe so sessions can be shared as
//! `Arc<dyn DriverSession>` by every lazy catalog fetcher of a connection.

use crate::models::ColumnarBatch;
use async_trait::async_trait;
use std::fmt;

/// Native error reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    message: String,
    sql_state: Option<String>,
    code: Option<i64>,
}

impl DriverError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            code: None,
        }
    }

    /// Builder method to attach an ANSI SQL state.
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    /// Builder method to attach a vendor error code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// The driver's message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The SQL state, when the driver reports one.
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    /// The vendor error code, when the driver reports one.
    pub fn code(&self) -> Option<i64> {
        self.code
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, &self.sql_state) {
            (Some(code), Some(state)) => write!(f, "{:06} ({}): {}", code, state, self.message),
            (Some(code), None) => write!(f, "{:06}: {}", code, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DriverError {}

/// Result descriptor reported by a driver cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverColumn {
    /// Output column name as written in the query (aliases included)
    pub name: String,
    /// Driver-specific type code, resolved through a [`crate::TypeTable`]
    pub type_code: i32,
}

impl DriverColumn {
    /// Creates a new descriptor.
    pub fn new(name: impl Into<String>, type_code: i32) -> Self {
        Self {
            name: name.into(),
            type_code,
        }
    }
}

/// An open driver session.
#[async_trait]
pub trait DriverSession: Send + Sync {
    /// Executes one statement.
    ///
    /// # Returns
    /// `None` for statements that produce no result set (DDL, DML without
    /// `RETURNING`), otherwise a new cursor exclusively owned by the caller.
    ///
    /// # Errors
    /// Returns the driver's native error if the statement fails to compile
    /// or execute.
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn DriverCursor>>, DriverError>;

    /// Closes the session. Later calls to `execute` may fail.
    async fn close(&self) {}
}

/// A driver cursor positioned before the first row of a result set.
#[async_trait]
pub trait DriverCursor: Send {
    /// Result descriptors in declared order.
    fn columns(&self) -> &[DriverColumn];

    /// Fetches every remaining row.
    async fn fetch_all(&mut self) -> Result<ColumnarBatch, DriverError>;

    /// Fetches at most `limit` rows natively.
    ///
    /// # Default Implementation
    /// Returns `Ok(None)`: the driver delivers its result as one batch and
    /// cannot stop early. Callers then fetch everything and truncate.
    async fn fetch_many(&mut self, _limit: usize) -> Result<Option<ColumnarBatch>, DriverError> {
        Ok(None)
    }
}

/// Runs a metadata statement and returns its full result.
///
/// Statements without a result set yield an empty batch.
pub(crate) async fn query_batch(
    session: &dyn DriverSession,
    sql: &str,
) -> Result<ColumnarBatch, DriverError> {
    tracing::trace!("Running metadata query: {}", sql);
    match session.execute(sql).await? {
        Some(mut cursor) => cursor.fetch_all().await,
        None => Ok(ColumnarBatch::default()),
    }
}

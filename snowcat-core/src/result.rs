//! Adapts driver cursors to the host's cursor contract.
//!
//! [`ResultCursor`] maps driver descriptors to named, human-readable column
//! types and enforces the row limit set by the host. When a driver cannot
//! fetch N rows natively (its result arrives as one columnar batch) the
//! cursor fetches everything and truncates: the row count is always
//! `min(limit, total)` even though the transfer is not reduced.

use crate::driver::DriverCursor;
use crate::models::{ColumnDescriptor, ColumnarBatch, TypeTable};
use crate::protocol::Cursor;
use crate::{AdapterError, Result};
use async_trait::async_trait;

/// Host-facing cursor over one driver result set.
pub struct ResultCursor {
    cursor: Box<dyn DriverCursor>,
    columns: Vec<ColumnDescriptor>,
    limit: Option<usize>,
}

impl ResultCursor {
    /// Wraps a driver cursor, resolving type codes through `types`.
    pub fn new(cursor: Box<dyn DriverCursor>, types: &TypeTable) -> Self {
        let columns = cursor
            .columns()
            .iter()
            .map(|c| ColumnDescriptor::new(c.name.clone(), types.label(c.type_code)))
            .collect();

        Self {
            cursor,
            columns,
            limit: None,
        }
    }

    /// The row limit currently bound to this cursor.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    async fn fetch_limited(&mut self, limit: usize) -> Result<ColumnarBatch> {
        if let Some(batch) = self
            .cursor
            .fetch_many(limit)
            .await
            .map_err(AdapterError::query_failed)?
        {
            return Ok(batch);
        }

        tracing::debug!(
            "Driver cannot fetch {} rows natively; fetching full batch and truncating",
            limit
        );
        let mut batch = self
            .cursor
            .fetch_all()
            .await
            .map_err(AdapterError::query_failed)?;
        batch.truncate(limit);
        Ok(batch)
    }
}

impl std::fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("columns", &self.columns)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cursor for ResultCursor {
    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.columns.clone()
    }

    fn set_limit(&mut self, limit: usize) -> &mut dyn Cursor {
        self.limit = Some(limit);
        self
    }

    async fn fetch_all(&mut self) -> Result<ColumnarBatch> {
        let start_time = std::time::Instant::now();

        let mut batch = match self.limit {
            Some(limit) => self.fetch_limited(limit).await?,
            None => self
                .cursor
                .fetch_all()
                .await
                .map_err(AdapterError::query_failed)?,
        };

        // Guard against drivers that ignore the requested count
        if let Some(limit) = self.limit {
            batch.truncate(limit);
        }

        tracing::debug!(
            "Fetched {} rows x {} columns in {:.2}s",
            batch.num_rows(),
            batch.num_columns(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(batch)
    }
}

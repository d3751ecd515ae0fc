//! An open Snowflake session seen through the host's connection contract.

use super::types::SNOWFLAKE_TYPES;
use super::{SnowflakeCatalogBuilder, snowflake_completions};
use crate::catalog::{Catalog, build_catalog};
use crate::driver::DriverSession;
use crate::models::Completion;
use crate::protocol::{Connection, Cursor};
use crate::result::ResultCursor;
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Connection owning one Snowflake driver session.
///
/// The session is shared with every catalog fetcher this connection hands
/// out, so expansions keep working for as long as the catalog lives.
pub struct SnowflakeConnection {
    session: Arc<dyn DriverSession>,
}

impl SnowflakeConnection {
    /// Wraps an open session.
    pub fn new(session: Arc<dyn DriverSession>) -> Self {
        Self { session }
    }
}

impl std::fmt::Debug for SnowflakeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for SnowflakeConnection {
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn Cursor>>> {
        tracing::debug!("Executing statement ({} bytes)", sql.len());

        let cursor = self.session.execute(sql).await.map_err(|e| {
            tracing::debug!("Statement failed: {}", e);
            AdapterError::query_failed(e)
        })?;

        Ok(cursor.map(|c| Box::new(ResultCursor::new(c, &SNOWFLAKE_TYPES)) as Box<dyn Cursor>))
    }

    async fn catalog(&self) -> Result<Catalog> {
        build_catalog(&SnowflakeCatalogBuilder::new(Arc::clone(&self.session))).await
    }

    async fn completions(&self) -> Result<Vec<Completion>> {
        Ok(snowflake_completions())
    }

    async fn close(&self) {
        tracing::debug!("Closing Snowflake session");
        self.session.close().await;
    }
}

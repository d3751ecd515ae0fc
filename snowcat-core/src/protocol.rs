//! The host's adapter contract.
//!
//! A host application discovers an [`Adapter`] through the plugin registry,
//! calls [`Adapter::connect`], and then drives the returned [`Connection`]
//! and its [`Cursor`]s. Only these capability sets are assumed; nothing
//! about the host's internal representation leaks into an adapter.
//!
//! # Threading
//! Every trait is `Send` (connections and adapters also `Sync`) so hosts can
//! run these calls on a background task and keep their UI responsive.

use crate::Result;
use crate::catalog::Catalog;
use crate::config::OptionSpec;
use crate::models::{ColumnDescriptor, ColumnarBatch, Completion};
use async_trait::async_trait;

/// Entry point of one plugin.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Opens a connection.
    ///
    /// # Errors
    /// Returns `Connection` if the session cannot be established, including
    /// missing required options. Failures surface here, never at first
    /// query.
    async fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Options this adapter understands, for building host CLIs.
    fn options(&self) -> &'static [OptionSpec];
}

/// An open connection owning one driver session.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Executes a statement.
    ///
    /// # Returns
    /// `None` for statements without a result set.
    ///
    /// # Errors
    /// Returns `Query` for any driver failure.
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn Cursor>>>;

    /// Enumerates the catalog roots; everything below is loaded lazily.
    ///
    /// # Errors
    /// Returns `CatalogUnavailable` if the root enumeration fails.
    async fn catalog(&self) -> Result<Catalog>;

    /// Keyword and function completions for the editor.
    async fn completions(&self) -> Result<Vec<Completion>>;

    /// Closes the underlying session.
    async fn close(&self) {}
}

/// A result set waiting to be fetched.
#[async_trait]
pub trait Cursor: Send {
    /// Column names and type labels in declared order.
    fn columns(&self) -> Vec<ColumnDescriptor>;

    /// Bounds every later fetch to at most `limit` rows.
    fn set_limit(&mut self, limit: usize) -> &mut dyn Cursor;

    /// Fetches the result, honoring the limit if one is set.
    ///
    /// # Errors
    /// Returns `Query` if the driver fails while fetching.
    async fn fetch_all(&mut self) -> Result<ColumnarBatch>;
}

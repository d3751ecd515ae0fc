//! Top-level catalog enumeration and fetcher wiring.

use super::{Catalog, ChildFetcher, NamespaceNode};
use crate::driver::{DriverSession, query_batch};
use crate::models::ColumnarBatch;
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Enumerates the root level of a data source's namespace.
///
/// Implementations issue exactly one round-trip, drop entities that cannot
/// be queried, and return one node per remaining entity, each wired with a
/// [`ChildFetcher`] for the next level.
#[async_trait]
pub trait CatalogBuilder: Send + Sync {
    /// Builds the root nodes.
    ///
    /// # Errors
    /// Returns the error of the root round-trip; [`build_catalog`] turns it
    /// into `CatalogUnavailable`.
    async fn build_root(&self) -> Result<Vec<NamespaceNode>>;
}

/// Builds a catalog snapshot from a builder.
///
/// # Errors
/// Returns `CatalogUnavailable` if the root enumeration fails. No partial
/// tree is returned.
pub async fn build_catalog(builder: &dyn CatalogBuilder) -> Result<Catalog> {
    let start_time = std::time::Instant::now();

    match builder.build_root().await {
        Ok(roots) => {
            tracing::info!(
                "Loaded {} catalog roots in {:.2}s",
                roots.len(),
                start_time.elapsed().as_secs_f64()
            );
            Ok(Catalog::new(roots))
        }
        Err(e) => {
            tracing::error!("Catalog enumeration failed: {}", e);
            Err(AdapterError::catalog_unavailable(e))
        }
    }
}

/// Creates a fetcher bound to one coordinate and one session.
///
/// The coordinate is moved into the fetcher and cloned per invocation, so
/// fetchers created in a loop each resolve their own parent.
///
/// # Arguments
/// * `coordinate` - Whatever identifies the parent (e.g. database name)
/// * `session` - Open session the fetch runs on
/// * `fetch` - Performs the round-trip for that coordinate
pub fn make_fetcher<C, F, Fut>(
    coordinate: C,
    session: Arc<dyn DriverSession>,
    fetch: F,
) -> ChildFetcher
where
    C: Clone + Send + Sync + 'static,
    F: Fn(C, Arc<dyn DriverSession>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<NamespaceNode>>> + Send + 'static,
{
    ChildFetcher::new(move || fetch(coordinate.clone(), Arc::clone(&session)))
}

/// Runs one listing query on behalf of a node being expanded.
///
/// Driver failures become `Query` errors naming `identifier`.
pub(crate) async fn fetch_listing(
    session: &dyn DriverSession,
    sql: &str,
    identifier: &str,
) -> Result<ColumnarBatch> {
    query_batch(session, sql)
        .await
        .map_err(|e| AdapterError::fetch_failed(identifier, e))
}

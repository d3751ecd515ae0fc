//! Lazily materialized namespace tree (databases, schemas, relations, columns).
//!
//! Warehouses can hold thousands of schemas, so nothing below the root level
//! is fetched until a consumer asks for it. Each [`NamespaceNode`] owns a
//! [`ChildFetcher`] that performs one round-trip on first expansion and
//! memoizes the result on the node itself.
//!
//! # Module Structure
//! - `node`: `NamespaceNode`, `ChildFetcher`, `ChildState`
//! - `builder`: `CatalogBuilder` trait, `build_catalog`, `make_fetcher`
//!
//! # Failure Scoping
//! A failed root enumeration fails the whole catalog. A failed expansion
//! lower down only fails that subtree; siblings that were already resolved
//! stay usable and the failed node can be expanded again later.

mod builder;
mod node;

pub use builder::{CatalogBuilder, build_catalog, make_fetcher};
pub(crate) use builder::fetch_listing;
pub use node::{ChildFetcher, ChildState, NamespaceNode};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// One snapshot of a data source's namespace.
///
/// The whole tree is dropped when the host refreshes the catalog or closes
/// the connection.
#[derive(Debug, Clone)]
pub struct Catalog {
    roots: Vec<Arc<NamespaceNode>>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Wraps root nodes into a snapshot.
    pub fn new(roots: Vec<NamespaceNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
            loaded_at: Utc::now(),
        }
    }

    /// Root nodes in source order.
    pub fn roots(&self) -> &[Arc<NamespaceNode>] {
        &self.roots
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True when the data source exposes no browsable roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// When the root level was enumerated.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Finds a node by identifier among already-loaded nodes.
    ///
    /// Only memoized subtrees are searched; this never performs a
    /// round-trip, so a node below an unexpanded branch is not found.
    /// Reaching a node whose expansion is in flight waits on that node's
    /// lock, so the search can block until the fetch completes.
    pub async fn find_loaded(&self, identifier: &str) -> Option<Arc<NamespaceNode>> {
        let mut queue: VecDeque<Arc<NamespaceNode>> = self.roots.iter().cloned().collect();

        while let Some(node) = queue.pop_front() {
            if node.identifier() == identifier {
                return Some(node);
            }
            queue.extend(node.loaded_children().await);
        }

        None
    }

    /// Expands the tree down to `depth` levels below the roots and returns a
    /// serializable view of it.
    ///
    /// Subtrees whose expansion fails are reported in place with their
    /// error and do not stop their siblings from expanding.
    pub async fn snapshot(&self, depth: usize) -> Vec<NodeSnapshot> {
        let mut snapshots = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            snapshots.push(snapshot_node(Arc::clone(root), depth).await);
        }
        snapshots
    }
}

/// Serializable view of one node and whatever was expanded beneath it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    /// Fully qualified identifier
    pub identifier: String,
    /// Display name
    pub label: String,
    /// Name to insert into SQL text
    pub query_name: String,
    /// Kind or column type label
    pub type_label: String,
    /// Children expanded within the requested depth
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
    /// Message of a failed expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn snapshot_node(node: Arc<NamespaceNode>, depth: usize) -> BoxFuture<'static, NodeSnapshot> {
    Box::pin(async move {
        let mut snapshot = NodeSnapshot {
            identifier: node.identifier().to_string(),
            label: node.display_name().to_string(),
            query_name: node.query_name().to_string(),
            type_label: node.type_label().to_string(),
            children: Vec::new(),
            error: None,
        };

        if depth == 0 || !node.is_expandable() {
            return snapshot;
        }

        match node.children().await {
            Ok(children) => {
                for child in children {
                    snapshot
                        .children
                        .push(snapshot_node(child, depth.saturating_sub(1)).await);
                }
            }
            Err(e) => snapshot.error = Some(e.to_string()),
        }

        snapshot
    })
}

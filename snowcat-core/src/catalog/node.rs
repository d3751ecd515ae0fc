//! Catalog tree nodes with deferred, memoized child resolution.

use crate::Result;
use crate::models::NodeKind;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A zero-argument operation that performs one round-trip and returns the
/// next level of nodes.
///
/// Fetchers are bound to their parent coordinate when created (see
/// [`super::make_fetcher`]) and may be invoked again after a failure.
pub struct ChildFetcher {
    fetch: Box<dyn Fn() -> BoxFuture<'static, Result<Vec<NamespaceNode>>> + Send + Sync>,
}

impl ChildFetcher {
    /// Wraps a closure producing the fetch future.
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<NamespaceNode>>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move || Box::pin(fetch())),
        }
    }

    /// Runs the round-trip.
    pub fn fetch(&self) -> BoxFuture<'static, Result<Vec<NamespaceNode>>> {
        (self.fetch)()
    }
}

impl fmt::Debug for ChildFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChildFetcher")
    }
}

/// Resolution state of a node's children.
#[derive(Debug, Clone)]
pub enum ChildState {
    /// Never fetched, or the last fetch failed
    Unfetched,
    /// Fetched and memoized
    Fetched(Vec<Arc<NamespaceNode>>),
    /// Known to have no children
    Empty,
}

impl ChildState {
    /// Short name for logs and debug output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unfetched => "unfetched",
            Self::Fetched(_) => "fetched",
            Self::Empty => "empty",
        }
    }
}

/// A node in the hierarchical catalog.
///
/// Children are fetched at most once. The first successful call to
/// [`NamespaceNode::children`] stores the result on the node; a failed call
/// leaves the node `Unfetched` so it can be retried.
pub struct NamespaceNode {
    identifier: String,
    display_name: String,
    query_name: String,
    kind: NodeKind,
    type_label: String,
    fetcher: Option<ChildFetcher>,
    state: Mutex<ChildState>,
}

impl NamespaceNode {
    /// Creates a node whose children are produced by `fetcher`.
    pub fn branch(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        kind: NodeKind,
        fetcher: ChildFetcher,
    ) -> Self {
        Self::build(identifier.into(), display_name.into(), kind, Some(fetcher))
    }

    /// Creates a node that has no children.
    pub fn leaf(identifier: impl Into<String>, display_name: impl Into<String>, kind: NodeKind) -> Self {
        Self::build(identifier.into(), display_name.into(), kind, None)
    }

    fn build(
        identifier: String,
        display_name: String,
        kind: NodeKind,
        fetcher: Option<ChildFetcher>,
    ) -> Self {
        let state = if fetcher.is_some() {
            ChildState::Unfetched
        } else {
            ChildState::Empty
        };
        Self {
            query_name: identifier.clone(),
            type_label: kind.label().to_string(),
            identifier,
            display_name,
            kind,
            fetcher,
            state: Mutex::new(state),
        }
    }

    /// Builder method to set the text inserted when the node is picked.
    pub fn with_query_name(mut self, query_name: impl Into<String>) -> Self {
        self.query_name = query_name.into();
        self
    }

    /// Builder method to override the label shown next to the node.
    pub fn with_type_label(mut self, type_label: impl Into<String>) -> Self {
        self.type_label = type_label.into();
        self
    }

    /// Fully-qualified identifier, unique within one catalog snapshot.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Name shown in a tree widget.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Text inserted into the editor.
    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// What the node represents.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Short type label (data type for columns).
    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    /// True when the node owns a fetcher and may have children.
    pub fn is_expandable(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Returns the node's children, fetching them on first access.
    ///
    /// The lock is held across the fetch, so concurrent callers wait for the
    /// in-flight round-trip instead of issuing their own.
    ///
    /// # Errors
    /// Returns the fetcher's error (a `Query` error scoped to this subtree).
    /// The node stays `Unfetched` and a later call retries.
    pub async fn children(&self) -> Result<Vec<Arc<NamespaceNode>>> {
        let mut state = self.state.lock().await;

        match &*state {
            ChildState::Fetched(children) => return Ok(children.clone()),
            ChildState::Empty => return Ok(Vec::new()),
            ChildState::Unfetched => {}
        }

        let Some(fetcher) = &self.fetcher else {
            *state = ChildState::Empty;
            return Ok(Vec::new());
        };

        let start_time = std::time::Instant::now();
        let fetched = match fetcher.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Failed to expand {}: {}", self.identifier, e);
                return Err(e);
            }
        };

        tracing::debug!(
            "Expanded {} ({}) into {} children in {:.2}s",
            self.identifier,
            self.kind,
            fetched.len(),
            start_time.elapsed().as_secs_f64()
        );

        let children: Vec<Arc<NamespaceNode>> = fetched.into_iter().map(Arc::new).collect();
        *state = if children.is_empty() {
            ChildState::Empty
        } else {
            ChildState::Fetched(children.clone())
        };

        Ok(children)
    }

    /// Snapshot of the current child state.
    pub async fn child_state(&self) -> ChildState {
        self.state.lock().await.clone()
    }

    /// Children that are already memoized; never performs a round-trip.
    ///
    /// Waits while an expansion of this node is in flight.
    pub async fn loaded_children(&self) -> Vec<Arc<NamespaceNode>> {
        match &*self.state.lock().await {
            ChildState::Fetched(children) => children.clone(),
            ChildState::Unfetched | ChildState::Empty => Vec::new(),
        }
    }
}

impl fmt::Debug for NamespaceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .state
            .try_lock()
            .map_or("busy", |state| state.label());
        f.debug_struct("NamespaceNode")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("type_label", &self.type_label)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

//! Error types surfaced at the adapter boundary.
//!
//! Every driver-level failure is caught where it crosses into an adapter and
//! re-raised as one of two user-facing kinds: [`AdapterError::Connection`]
//! (a session could not be opened) or [`AdapterError::Query`] (a statement,
//! a fetch, or a lazy catalog expansion failed). The raw driver error is kept
//! only as the `source` so hosts can still walk the chain for diagnostics.
//!
//! # Security
//! Messages carry the driver's message text and a short title. Passwords are
//! never formatted into either.

use crate::driver::DriverError;
use thiserror::Error;

/// Title used when a session cannot be opened.
pub const CONNECTION_ERROR_TITLE: &str = "Could not connect to the warehouse.";

/// Title used when a statement or fetch fails.
pub const QUERY_ERROR_TITLE: &str = "An error occurred while executing your query.";

/// Title used when a catalog node cannot be expanded.
pub const CATALOG_ERROR_TITLE: &str = "Could not load the data catalog.";

/// Main error type for adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A session could not be established (bad credentials, unreachable
    /// host, malformed account identifier, missing required option)
    #[error("{title} {message}")]
    Connection {
        title: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A submitted statement, a result fetch, or a lazy child fetch failed
    #[error("{title} {message}")]
    Query {
        title: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The top-level catalog enumeration failed; no partial tree exists
    #[error("Catalog unavailable: {message}")]
    CatalogUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Host-side misuse: unknown plugin, duplicate registration, logging setup
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results with AdapterError
pub type Result<T> = std::result::Result<T, AdapterError>;

impl AdapterError {
    /// Wraps a driver failure raised while opening a session.
    pub fn connection_failed(error: DriverError) -> Self {
        Self::Connection {
            title: CONNECTION_ERROR_TITLE.to_string(),
            message: error.message().to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a connection error that has no underlying driver error,
    /// e.g. a required option is missing.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            title: CONNECTION_ERROR_TITLE.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a driver failure raised while executing or fetching.
    pub fn query_failed(error: DriverError) -> Self {
        Self::Query {
            title: QUERY_ERROR_TITLE.to_string(),
            message: error.message().to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a query error without an underlying driver error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            title: QUERY_ERROR_TITLE.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a failure raised while expanding one catalog node.
    ///
    /// # Arguments
    /// * `identifier` - Fully-qualified identifier of the node being expanded
    /// * `error` - The underlying driver error
    pub fn fetch_failed(identifier: &str, error: DriverError) -> Self {
        Self::Query {
            title: CATALOG_ERROR_TITLE.to_string(),
            message: format!("Failed to list children of {}: {}", identifier, error.message()),
            source: Some(Box::new(error)),
        }
    }

    /// Converts a failed root enumeration into `CatalogUnavailable`.
    pub fn catalog_unavailable(error: AdapterError) -> Self {
        match error {
            already @ Self::CatalogUnavailable { .. } => already,
            other => Self::CatalogUnavailable {
                message: other.message().to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short human-readable title suitable for a dialog header.
    pub fn title(&self) -> &str {
        match self {
            Self::Connection { title, .. } | Self::Query { title, .. } => title,
            Self::CatalogUnavailable { .. } => CATALOG_ERROR_TITLE,
            Self::Configuration { .. } => "Invalid configuration.",
        }
    }

    /// The underlying message without the title.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Query { message, .. }
            | Self::CatalogUnavailable { message, .. }
            | Self::Configuration { message } => message,
        }
    }

    /// True for `Connection` errors.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// True for `Query` errors, including failed lazy fetches.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }
}

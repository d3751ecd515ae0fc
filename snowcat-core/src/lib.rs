//! Warehouse adapters for pluggable SQL clients.
//!
//! This crate translates a host application's generic adapter contract
//! (connect, execute, browse the catalog, autocomplete) into calls against a
//! database driver session. Its one piece of real machinery is the lazy
//! catalog: databases, schemas, relations, and columns are only fetched when
//! a consumer expands them, and each node remembers what it fetched.
//!
//! # Architecture
//! - `driver`: traits the vendor driver is reached through
//! - `catalog`: lazily expanded, per-node memoized namespace tree
//! - `result`: driver cursor to host cursor adaptation and row limiting
//! - `protocol`: the host-facing `Adapter`/`Connection`/`Cursor` traits
//! - `plugin`: name-keyed adapter registry used for discovery
//! - `sql`: identifier quoting shared by the adapters
//! - `snowflake`, `sqlite`: concrete adapters
//!
//! # Security Guarantees
//! - Passwords are kept in zeroizing containers and never logged
//! - Driver errors never escape raw; hosts see `Connection` or `Query` errors

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod models;
pub mod plugin;
pub mod protocol;
pub mod result;
pub mod snowflake;
pub mod sql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export commonly used types
pub use catalog::{
    Catalog, CatalogBuilder, ChildFetcher, ChildState, NamespaceNode, NodeSnapshot,
    build_catalog, make_fetcher,
};
pub use config::{AdapterOptions, OptionSpec, SessionConfig};
pub use driver::{DriverColumn, DriverCursor, DriverError, DriverSession};
pub use error::{AdapterError, Result};
pub use logging::init_logging;
pub use models::{ColumnDescriptor, ColumnarBatch, Completion, NodeKind, TypeEntry, TypeTable};
pub use plugin::{AdapterFactory, PluginRegistry};
pub use protocol::{Adapter, Connection, Cursor};
pub use result::ResultCursor;

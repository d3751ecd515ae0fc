//! SQLite adapter over `sqlx`.
//!
//! # Module Structure
//! - `connection`: Connection-string validation and the single-connection pool
//! - `session`: `DriverSession`/`DriverCursor` implementation
//! - `catalog`: Lazy catalog via `PRAGMA database_list`, `sqlite_master`,
//!   and `PRAGMA table_info`
//! - `type_mapping`: Declared type to affinity label conversion
//!
//! # Connection Strings
//! The first positional connection string is the main database; the rest
//! are attached under their file stems. With none, an in-memory database is
//! opened.

pub mod catalog;
pub mod connection;
pub mod session;
pub mod type_mapping;


pub use catalog::SqliteCatalogBuilder;
pub use session::{SqliteCursor, SqliteSession};

use crate::catalog::{Catalog, build_catalog};
use crate::config::{AdapterOptions, OptionSpec, SessionConfig};
use crate::driver::DriverSession;
use crate::models::Completion;
use crate::plugin::PluginRegistry;
use crate::protocol::{Adapter, Connection, Cursor};
use crate::result::ResultCursor;
use crate::sql::quote_identifier;
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use type_mapping::SQLITE_TYPES;

/// Name the adapter is registered under.
pub const PLUGIN_NAME: &str = "sqlite-adapter";

/// SQLite takes everything from its connection strings.
pub const SQLITE_OPTIONS: &[OptionSpec] = &[];

const KEYWORD_PRIORITY: i32 = 1000;

const SQLITE_KEYWORDS: &[&str] = &[
    "abort",
    "analyze",
    "attach database",
    "autoincrement",
    "collate",
    "conflict",
    "detach database",
    "deferrable",
    "glob",
    "indexed by",
    "instead of",
    "notnull",
    "on conflict",
    "pragma",
    "raise",
    "reindex",
    "replace",
    "returning",
    "rowid",
    "strict",
    "vacuum",
    "without rowid",
];

/// Registers the SQLite adapter.
///
/// # Errors
/// Returns a configuration error if the name is already taken.
pub fn register(registry: &mut PluginRegistry) -> Result<()> {
    registry.register(
        PLUGIN_NAME,
        SQLITE_OPTIONS,
        Arc::new(|conn_str, options| {
            Ok(Box::new(SqliteAdapter::new(conn_str, options)) as Box<dyn Adapter>)
        }),
    )
}

/// Adapter opening SQLite databases.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    conn_str: Vec<String>,
    session_config: SessionConfig,
}

impl SqliteAdapter {
    /// Creates a new adapter. Connection strings are validated on connect.
    pub fn new(conn_str: Vec<String>, options: AdapterOptions) -> Self {
        if options.username.is_some() || options.account.is_some() {
            tracing::debug!("SQLite ignores warehouse login options");
        }

        Self {
            conn_str,
            session_config: SessionConfig::default(),
        }
    }

    /// Builder method to override timeouts.
    pub fn with_session_config(mut self, session_config: SessionConfig) -> Self {
        self.session_config = session_config;
        self
    }

    fn main_database(&self) -> &str {
        self.conn_str
            .first()
            .map_or(connection::IN_MEMORY, String::as_str)
    }
}

#[async_trait]
impl Adapter for SqliteAdapter {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.session_config
            .validate()
            .map_err(|e| AdapterError::connection(e.message().to_string()))?;
        for conn_str in &self.conn_str {
            connection::validate_sqlite_connection_string(conn_str)?;
        }

        let main = self.main_database();
        tracing::info!(
            "Opening SQLite database{}",
            if connection::is_in_memory(main) { " in memory" } else { "" }
        );

        let pool = connection::create_pool(main, &self.session_config)
            .await
            .map_err(AdapterError::connection_failed)?;
        let session = SqliteSession::new(pool);

        for (index, extra) in self.conn_str.iter().enumerate().skip(1) {
            let Some(path) = connection::database_path(extra) else {
                tracing::warn!("Skipping in-memory database in position {}", index);
                continue;
            };
            let alias = connection::attach_alias(extra, index);
            let statement = format!(
                "ATTACH DATABASE '{}' AS {}",
                path.replace('\'', "''"),
                quote_identifier(&alias)
            );
            session
                .run(&statement)
                .await
                .map_err(AdapterError::connection_failed)?;
            tracing::debug!("Attached {} as {}", path, alias);
        }

        Ok(Box::new(SqliteConnection::new(Arc::new(session))))
    }

    fn options(&self) -> &'static [OptionSpec] {
        SQLITE_OPTIONS
    }
}

/// Connection owning one SQLite session.
pub struct SqliteConnection {
    session: Arc<dyn DriverSession>,
}

impl SqliteConnection {
    /// Wraps an open session.
    pub fn new(session: Arc<dyn DriverSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn execute(&self, sql: &str) -> Result<Option<Box<dyn Cursor>>> {
        let cursor = self
            .session
            .execute(sql)
            .await
            .map_err(AdapterError::query_failed)?;

        Ok(cursor.map(|c| Box::new(ResultCursor::new(c, &SQLITE_TYPES)) as Box<dyn Cursor>))
    }

    async fn catalog(&self) -> Result<Catalog> {
        build_catalog(&SqliteCatalogBuilder::new(Arc::clone(&self.session))).await
    }

    async fn completions(&self) -> Result<Vec<Completion>> {
        Ok(SQLITE_KEYWORDS
            .iter()
            .map(|kw| Completion::keyword(kw, "kw", KEYWORD_PRIORITY))
            .collect())
    }

    async fn close(&self) {
        self.session.close().await;
    }
}

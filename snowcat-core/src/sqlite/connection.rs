//! SQLite connection strings and pool setup.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db`, `sqlite://./relative.db`,
//!   or a bare path ending in `.db`, `.sqlite`, or `.sqlite3`
//! - In-memory: `sqlite::memory:` or `:memory:`
//!
//! The pool always holds exactly one long-lived connection. `ATTACH` and
//! in-memory databases are per-connection in SQLite, so a second connection
//! would see a different database.

use crate::config::SessionConfig;
use crate::driver::DriverError;
use crate::{AdapterError, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use url::Url;

/// Connection string used when the host passes none.
pub const IN_MEMORY: &str = ":memory:";

/// Validates SQLite connection string format.
///
/// # Errors
/// Returns a `Connection` error if the string is neither a `sqlite:` URL,
/// a database file path, nor `:memory:`.
pub fn validate_sqlite_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == IN_MEMORY {
        return Ok(());
    }

    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if is_in_memory(connection_string) {
            return Ok(());
        }

        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(AdapterError::connection(
                    "Connection string must use sqlite:// scheme",
                ));
            }
            return Ok(());
        }

        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(AdapterError::connection(format!(
        "Invalid SQLite connection string '{}': expected sqlite:// URL, file path, or :memory:",
        connection_string
    )))
}

/// Whether the connection string names an in-memory database.
pub fn is_in_memory(connection_string: &str) -> bool {
    connection_string.contains(IN_MEMORY) || connection_string.contains("mode=memory")
}

/// Schema name to attach a database file under: its file stem.
///
/// Falls back to `db{index}` when the path has no usable stem.
pub fn attach_alias(connection_string: &str, index: usize) -> String {
    let path = connection_string
        .strip_prefix("sqlite://")
        .unwrap_or(connection_string);
    let path = path.split('?').next().unwrap_or(path);

    std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("db{}", index), str::to_string)
}

/// File path of a database for `ATTACH`; `None` for in-memory databases.
pub fn database_path(connection_string: &str) -> Option<String> {
    if is_in_memory(connection_string) {
        return None;
    }

    let path = connection_string
        .strip_prefix("sqlite://")
        .unwrap_or(connection_string);
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty()).then(|| path.to_string())
}

/// Normalizes a connection string to SQLite URL format.
pub fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == IN_MEMORY {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}

/// Opens the single-connection pool backing one session.
///
/// # Errors
/// Returns the driver error if the connection string cannot be parsed or
/// the database cannot be opened.
pub(crate) async fn create_pool(
    connection_string: &str,
    session: &SessionConfig,
) -> std::result::Result<SqlitePool, DriverError> {
    let normalized = normalize_connection_string(connection_string);

    let mut options = SqliteConnectOptions::from_str(&normalized)
        .map_err(|e| DriverError::new(format!("Invalid SQLite connection string: {}", e)))?;
    if let Some(timeout) = session.query_timeout {
        options = options.busy_timeout(timeout);
    }

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(session.login_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(super::session::driver_error)
}

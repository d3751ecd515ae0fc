//! Snowflake warehouse adapter.
//!
//! The adapter does not speak Snowflake's wire protocol itself. An embedder
//! supplies a [`SnowflakeConnector`] (a thin wrapper around a vendor driver)
//! and registers the adapter with [`register`]. Everything above the driver
//! session is implemented here: option handling, error translation, the
//! lazy catalog, result type labels, and completions.
//!
//! # Catalog Levels
//! `SHOW DATABASES` → `SHOW SCHEMAS IN DATABASE` → `SHOW TERSE OBJECTS IN
//! SCHEMA` → `SHOW COLUMNS IN TABLE`. Only the first runs when the catalog is
//! built; each lower level runs once, when its parent is first expanded.

mod adapter;
mod catalog;
mod completions;
mod connection;
pub mod sql;
pub mod types;

pub use adapter::SnowflakeAdapter;
pub use catalog::SnowflakeCatalogBuilder;
pub use completions::snowflake_completions;
pub use connection::SnowflakeConnection;

use crate::config::{AdapterOptions, OptionSpec, SessionConfig};
use crate::driver::{DriverError, DriverSession};
use crate::plugin::PluginRegistry;
use crate::protocol::Adapter;
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use zeroize::Zeroizing;

/// Name the adapter is registered under.
pub const PLUGIN_NAME: &str = "snowflake-adapter";

/// Environment variable consulted when no password option is given.
pub const PASSWORD_ENV_VAR: &str = "SNOWSQL_PWD";

const HOST_SUFFIX: &str = "snowflakecomputing.com";

// Organization-account (myorg-myaccount) and legacy locator forms
// (xy12345.us-east-2.aws) both match.
const ACCOUNT_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_-]*(\.[A-Za-z0-9_-]+)*$";

/// Options accepted by the Snowflake adapter, with their short flags.
pub const SNOWFLAKE_OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "username",
        short: Some('u'),
        description: "User name to authenticate as (required).",
    },
    OptionSpec {
        name: "account",
        short: Some('A'),
        description: "Account identifier, e.g. myorg-myaccount (required).",
    },
    OptionSpec {
        name: "password",
        short: Some('p'),
        description: "Password. Falls back to the SNOWSQL_PWD environment variable.",
    },
    OptionSpec {
        name: "hostname",
        short: Some('h'),
        description: "Host name. Defaults to <account>.snowflakecomputing.com.",
    },
    OptionSpec {
        name: "role",
        short: Some('r'),
        description: "Role to assume for the session.",
    },
    OptionSpec {
        name: "warehouse",
        short: Some('w'),
        description: "Virtual warehouse that runs queries.",
    },
    OptionSpec {
        name: "database",
        short: Some('d'),
        description: "Default database for the session.",
    },
    OptionSpec {
        name: "schema",
        short: Some('s'),
        description: "Default schema for the session.",
    },
];

/// Opens authenticated Snowflake sessions.
///
/// Implemented by the embedder on top of a vendor driver. The returned
/// session is shared by the connection and every lazy catalog fetcher.
#[async_trait]
pub trait SnowflakeConnector: Send + Sync {
    /// Opens one session.
    ///
    /// # Errors
    /// Returns the driver's native error; the adapter reports it as a
    /// `Connection` error.
    async fn connect(
        &self,
        params: &SessionParams,
    ) -> std::result::Result<Arc<dyn DriverSession>, DriverError>;
}

/// Everything a connector needs to open a session.
#[derive(Clone)]
pub struct SessionParams {
    /// Account identifier as given
    pub account: String,
    /// User to authenticate as
    pub user: String,
    password: Option<Zeroizing<String>>,
    /// Full `https://` URL of the account endpoint
    pub host: String,
    /// Role to assume
    pub role: Option<String>,
    /// Warehouse that runs queries
    pub warehouse: Option<String>,
    /// Default database, upper-cased
    pub database: Option<String>,
    /// Default schema
    pub schema: Option<String>,
    /// Time allowed for authentication
    pub login_timeout: Duration,
    /// Per-statement timeout, if any
    pub query_timeout: Option<Duration>,
}

impl std::fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionParams")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("host", &self.host)
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("login_timeout", &self.login_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

impl SessionParams {
    /// Resolves session parameters from adapter options.
    ///
    /// The password comes from the `password` option or, failing that, from
    /// `SNOWSQL_PWD`. The hostname defaults to
    /// `<account>.snowflakecomputing.com`.
    ///
    /// # Errors
    /// Returns a `Connection` error when `username` or `account` is missing,
    /// the account identifier is malformed, the hostname is not a valid
    /// host, or a timeout is zero.
    pub fn from_options(options: &AdapterOptions, session: &SessionConfig) -> Result<Self> {
        session
            .validate()
            .map_err(|e| AdapterError::connection(e.message().to_string()))?;

        let user = required(options.username.as_deref(), "username")?;
        let account = required(options.account.as_deref(), "account")?;
        validate_account(&account)?;

        let host = resolve_host(options.hostname.as_deref(), &account)?;

        let password = match options.password() {
            Some(password) => Some(Zeroizing::new(password.to_string())),
            None => std::env::var(PASSWORD_ENV_VAR)
                .ok()
                .filter(|p| !p.is_empty())
                .map(Zeroizing::new),
        };
        if password.is_none() {
            tracing::debug!("No password supplied; relying on the connector's authenticator");
        }

        Ok(Self {
            account,
            user,
            password,
            host,
            role: options.role.clone(),
            warehouse: options.warehouse.clone(),
            database: options.database.as_ref().map(|d| d.to_uppercase()),
            schema: options.schema.clone(),
            login_timeout: session.login_timeout,
            query_timeout: session.query_timeout,
        })
    }

    /// The resolved password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.as_str())
    }
}

fn required(value: Option<&str>, name: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AdapterError::connection(format!(
            "The '{}' option is required",
            name
        ))),
    }
}

/// Account pattern, compiled once per process.
fn account_regex() -> Result<&'static regex::Regex> {
    static PATTERN: OnceLock<std::result::Result<regex::Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| regex::Regex::new(ACCOUNT_PATTERN))
        .as_ref()
        .map_err(|e| AdapterError::configuration(format!("Invalid account pattern: {}", e)))
}

fn validate_account(account: &str) -> Result<()> {
    if !account_regex()?.is_match(account) {
        return Err(AdapterError::connection(format!(
            "Invalid account identifier '{}': use the form myorg-myaccount or a locator such as xy12345.us-east-2",
            account
        )));
    }

    Ok(())
}

fn resolve_host(hostname: Option<&str>, account: &str) -> Result<String> {
    let host = match hostname.map(str::trim).filter(|h| !h.is_empty()) {
        Some(h) => h.to_string(),
        None => format!("{}.{}", account, HOST_SUFFIX),
    };

    let candidate = if host.contains("://") {
        host
    } else {
        format!("https://{}", host)
    };

    let parsed = url::Url::parse(&candidate)
        .map_err(|e| AdapterError::connection(format!("Invalid hostname '{}': {}", candidate, e)))?;
    if parsed.scheme() != "https" || parsed.host_str().is_none() {
        return Err(AdapterError::connection(format!(
            "Invalid hostname '{}': an https host is required",
            candidate
        )));
    }

    Ok(candidate.trim_end_matches('/').to_string())
}

/// Registers the Snowflake adapter with `connector` as its session source.
///
/// # Errors
/// Returns a configuration error if the name is already taken.
pub fn register(
    registry: &mut PluginRegistry,
    connector: Arc<dyn SnowflakeConnector>,
) -> Result<()> {
    registry.register(
        PLUGIN_NAME,
        SNOWFLAKE_OPTIONS,
        Arc::new(move |conn_str, options| {
            Ok(Box::new(SnowflakeAdapter::new(
                conn_str,
                options,
                Arc::clone(&connector),
            )) as Box<dyn Adapter>)
        }),
    )
}

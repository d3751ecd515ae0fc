//! Adapter options and session settings.
//!
//! Hosts hand adapters a bag of named text options. [`AdapterOptions`] is
//! the typed form of that bag; [`OptionSpec`] describes each option so a
//! host can expose it on its own command line.
//!
//! # Security
//! The password is held in a zeroizing container, skipped by serde, and
//! redacted from `Debug` output.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::Zeroizing;

/// Describes one named option an adapter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long option name, also the key in the options bag
    pub name: &'static str,
    /// Single-character short flag
    pub short: Option<char>,
    /// Help text
    pub description: &'static str,
}

/// Typed adapter options. Every field is optional at construction; adapters
/// check required fields when connecting.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// User to authenticate as
    pub username: Option<String>,
    /// Account identifier
    pub account: Option<String>,
    /// Host name overriding the account's default endpoint
    pub hostname: Option<String>,
    /// Role to assume
    pub role: Option<String>,
    /// Warehouse that runs queries
    pub warehouse: Option<String>,
    /// Default database
    pub database: Option<String>,
    /// Default schema
    pub schema: Option<String>,
    #[serde(skip)]
    password: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("username", &self.username)
            .field("account", &self.account)
            .field("hostname", &self.hostname)
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl AdapterOptions {
    /// Builds options from a name/value bag.
    ///
    /// Empty values are treated as absent. Unknown names are logged and
    /// ignored so hosts may pass their full option set.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::default();

        for (name, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match name.as_ref() {
                "username" => options.username = Some(value),
                "account" => options.account = Some(value),
                "hostname" => options.hostname = Some(value),
                "password" => options.password = Some(Zeroizing::new(value)),
                "role" => options.role = Some(value),
                "warehouse" => options.warehouse = Some(value),
                "database" => options.database = Some(value),
                "schema" => options.schema = Some(value),
                other => tracing::warn!("Ignoring unknown adapter option '{}'", other),
            }
        }

        options
    }

    /// Builder method to set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// The explicitly supplied password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.as_str())
    }

    /// Checks if a password was supplied without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

/// Timeouts handed to the driver when a session is opened.
///
/// Catalog expansion has no timeout of its own; it inherits these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long to wait for authentication
    pub login_timeout: Duration,
    /// Per-statement timeout; `None` leaves the server default
    pub query_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_timeout: Duration::from_secs(60),
            query_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Validates session settings.
    ///
    /// # Errors
    /// Returns a configuration error if a timeout is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.login_timeout.is_zero() {
            return Err(crate::AdapterError::configuration(
                "login_timeout must be greater than 0",
            ));
        }

        if let Some(timeout) = self.query_timeout
            && timeout.is_zero()
        {
            return Err(crate::AdapterError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builder method to set the login timeout.
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Builder method to set the statement timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_maps_known_options() {
        let options = AdapterOptions::from_pairs([
            ("username", "analyst"),
            ("account", "myorg-myaccount"),
            ("warehouse", "COMPUTE_WH"),
            ("schema", ""),
            ("colour", "blue"),
        ]);

        assert_eq!(options.username.as_deref(), Some("analyst"));
        assert_eq!(options.account.as_deref(), Some("myorg-myaccount"));
        assert_eq!(options.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert_eq!(options.schema, None);
        assert!(!options.has_password());
    }

    #[test]
    fn test_password_is_redacted() {
        let options = AdapterOptions::from_pairs([("password", "hunter2")]);
        assert_eq!(options.password(), Some("hunter2"));

        let debug = format!("{:?}", options);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));

        let json = serde_json::to_string(&options).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_options_deserialize_without_password() {
        let options: AdapterOptions =
            serde_json::from_str(r#"{"username":"u","account":"a","password":"p"}"#).unwrap();
        assert_eq!(options.username.as_deref(), Some("u"));
        assert!(!options.has_password());
    }

    #[test]
    fn test_session_config_validation() {
        assert!(SessionConfig::default().validate().is_ok());

        let config = SessionConfig::default().with_login_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SessionConfig::default().with_query_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SessionConfig::default().with_query_timeout(Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }
}

//! Snowflake adapter entry point.

use super::{SNOWFLAKE_OPTIONS, SessionParams, SnowflakeConnection, SnowflakeConnector};
use crate::config::{AdapterOptions, OptionSpec, SessionConfig};
use crate::protocol::{Adapter, Connection};
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Adapter that opens Snowflake sessions through a [`SnowflakeConnector`].
///
/// Construction never fails and never touches the network; options are
/// checked in [`Adapter::connect`].
pub struct SnowflakeAdapter {
    conn_str: Vec<String>,
    options: AdapterOptions,
    session_config: SessionConfig,
    connector: Arc<dyn SnowflakeConnector>,
}

impl SnowflakeAdapter {
    /// Creates a new adapter.
    ///
    /// Positional connection strings are accepted for host compatibility
    /// and ignored: Snowflake sessions are described entirely by options.
    pub fn new(
        conn_str: Vec<String>,
        options: AdapterOptions,
        connector: Arc<dyn SnowflakeConnector>,
    ) -> Self {
        if !conn_str.is_empty() {
            tracing::debug!(
                "Ignoring {} positional connection string(s); Snowflake uses named options",
                conn_str.len()
            );
        }

        Self {
            conn_str,
            options,
            session_config: SessionConfig::default(),
            connector,
        }
    }

    /// Builder method to override session timeouts.
    pub fn with_session_config(mut self, session_config: SessionConfig) -> Self {
        self.session_config = session_config;
        self
    }

    /// The options this adapter was created with.
    pub fn adapter_options(&self) -> &AdapterOptions {
        &self.options
    }

    /// Positional connection strings passed by the host.
    pub fn conn_str(&self) -> &[String] {
        &self.conn_str
    }
}

impl std::fmt::Debug for SnowflakeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeAdapter")
            .field("options", &self.options)
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Adapter for SnowflakeAdapter {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let params = SessionParams::from_options(&self.options, &self.session_config)?;

        tracing::info!(
            "Connecting to Snowflake account {} as {}",
            params.account,
            params.user
        );
        let start_time = std::time::Instant::now();

        let session = self.connector.connect(&params).await.map_err(|e| {
            tracing::error!("Snowflake login failed for account {}: {}", params.account, e);
            AdapterError::connection_failed(e)
        })?;

        tracing::info!(
            "Connected to Snowflake in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(Box::new(SnowflakeConnection::new(session)))
    }

    fn options(&self) -> &'static [OptionSpec] {
        SNOWFLAKE_OPTIONS
    }
}

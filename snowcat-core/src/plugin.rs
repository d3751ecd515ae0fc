//! Plugin registration and discovery.
//!
//! Each adapter registers a factory under a fixed plugin name. Hosts look
//! adapters up by that name at startup and never need to know the concrete
//! type behind it.

use crate::config::{AdapterOptions, OptionSpec};
use crate::protocol::Adapter;
use crate::{AdapterError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds an adapter from positional connection strings and named options.
pub type AdapterFactory =
    Arc<dyn Fn(Vec<String>, AdapterOptions) -> Result<Box<dyn Adapter>> + Send + Sync>;

#[derive(Clone)]
struct PluginEntry {
    options: &'static [OptionSpec],
    factory: AdapterFactory,
}

/// Name-keyed set of adapter factories.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, PluginEntry>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every adapter that needs no externally
    /// supplied connector.
    ///
    /// # Errors
    /// Returns a configuration error if two built-in adapters share a name.
    pub fn with_builtin() -> Result<Self> {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "sqlite")]
        crate::sqlite::register(&mut registry)?;

        Ok(registry)
    }

    /// Registers a factory under `name`.
    ///
    /// # Errors
    /// Returns a configuration error if `name` is already registered.
    pub fn register(
        &mut self,
        name: &str,
        options: &'static [OptionSpec],
        factory: AdapterFactory,
    ) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(AdapterError::configuration(format!(
                "Adapter plugin '{}' is already registered",
                name
            )));
        }

        tracing::debug!("Registered adapter plugin '{}'", name);
        self.entries
            .insert(name.to_string(), PluginEntry { options, factory });
        Ok(())
    }

    /// Constructs the adapter registered under `name`.
    ///
    /// # Errors
    /// Returns a configuration error for unknown names, or whatever the
    /// factory reports.
    pub fn create(
        &self,
        name: &str,
        conn_str: Vec<String>,
        options: AdapterOptions,
    ) -> Result<Box<dyn Adapter>> {
        let entry = self.entries.get(name).ok_or_else(|| {
            AdapterError::configuration(format!(
                "No adapter plugin named '{}' (available: {})",
                name,
                self.names().join(", ")
            ))
        })?;

        (entry.factory)(conn_str, options)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered plugin names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Options declared by the plugin registered under `name`.
    pub fn options_for(&self, name: &str) -> Option<&'static [OptionSpec]> {
        self.entries.get(name).map(|e| e.options)
    }
}

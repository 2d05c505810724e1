//! Plugin-based API registry
//!
//! The registry allows record API backends to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dnsrec_core::registry::ApiRegistry;
//! use dnsrec_core::config::ApiConfig;
//!
//! // Create a registry
//! let registry = ApiRegistry::new();
//!
//! // Register backends
//! dnsrec_provider_dreamhost::register(&registry);
//!
//! // Create a backend from config
//! let config = ApiConfig::Dreamhost { api_key: "...".into(), base_url: None };
//! let api = registry.create_api(&config)?;
//! ```

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::traits::{RecordApi, RecordApiFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry for plugin-based record API creation
///
/// The registry maintains a map of API type names to factory objects,
/// allowing dynamic instantiation of backends based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ApiRegistry {
    /// Registered record API factories
    apis: RwLock<HashMap<String, Box<dyn RecordApiFactory>>>,
}

impl ApiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record API factory
    ///
    /// # Parameters
    ///
    /// - `name`: API type name (e.g., "dreamhost")
    /// - `factory`: Factory object for creating backend instances
    pub fn register_api(&self, name: impl Into<String>, factory: Box<dyn RecordApiFactory>) {
        let name = name.into();
        let mut apis = self.apis.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        apis.insert(name, factory);
    }

    /// Create a record API backend from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordApi>)`: Created backend instance
    /// - `Err(Error)`: If the API type is not registered or creation fails
    pub fn create_api(&self, config: &ApiConfig) -> Result<Box<dyn RecordApi>> {
        let api_type = config.type_name();
        let apis = self.apis.read().unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = apis
            .get(api_type)
            .ok_or_else(|| Error::config(format!("Unknown API type: {}", api_type)))?;

        factory.create(config)
    }

    /// List all registered API types
    pub fn list_apis(&self) -> Vec<String> {
        let apis = self.apis.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        apis.keys().cloned().collect()
    }

    /// Check if an API type is registered
    pub fn has_api(&self, name: &str) -> bool {
        let apis = self.apis.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        apis.contains_key(name)
    }
}

//! Configuration types for the dnsrec system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::poller::PollConfig;
use crate::retry::RetryPolicy;

/// Main dnsrec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecConfig {
    /// Upstream API configuration
    pub api: ApiConfig,

    /// Optional retry and convergence timing
    #[serde(default)]
    pub retry: RetryConfig,
}

impl DnsRecConfig {
    /// Create a new configuration for the given API with default timing
    pub fn new(api: ApiConfig) -> Self {
        Self {
            api,
            retry: RetryConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.api.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiConfig {
    /// DreamHost DNS API
    Dreamhost {
        /// DreamHost API key with DNS permissions
        api_key: String,
        /// Override of the API endpoint (tests, proxies)
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ApiConfig {
    /// Validate the API configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ApiConfig::Dreamhost { api_key, base_url } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("DreamHost API key cannot be empty"));
                }
                if let Some(url) = base_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "DreamHost base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            ApiConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom API factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom API config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the API type name
    pub fn type_name(&self) -> &str {
        match self {
            ApiConfig::Dreamhost { .. } => "dreamhost",
            ApiConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Retry and convergence timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Overall budget for retries and for each convergence poll (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between retry attempts and between poll ticks (in seconds)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Lower bound for the wait before a poll tick (in seconds)
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,
}

impl RetryConfig {
    /// Validate the timing
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Retry timeout must be > 0"));
        }
        if self.delay_secs > self.timeout_secs {
            return Err(crate::Error::config(format!(
                "Retry delay ({}s) cannot exceed the retry timeout ({}s)",
                self.delay_secs, self.timeout_secs
            )));
        }
        Ok(())
    }

    /// Retry policy for mutations
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.delay_secs),
        )
    }

    /// Timing for convergence polls
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.delay_secs),
            Duration::from_secs(self.min_delay_secs),
        )
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            delay_secs: default_delay_secs(),
            min_delay_secs: default_min_delay_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_delay_secs() -> u64 {
    5
}

fn default_min_delay_secs() -> u64 {
    1
}

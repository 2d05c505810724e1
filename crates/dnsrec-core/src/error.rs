//! Error types for the dnsrec system
//!
//! This module defines all error types used throughout the crate.
//!
//! Upstream failures keep the original upstream message. Layers above wrap
//! errors with [`Error::context`] instead of replacing them, so the message a
//! caller finally sees always contains the upstream text.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for dnsrec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dnsrec system
#[derive(Error, Debug)]
pub enum Error {
    /// Failure reported by the upstream record API
    #[error("{api} API error: {message}")]
    Upstream {
        /// Name of the API backend (e.g. "dreamhost")
        api: String,
        /// Upstream message, verbatim
        message: String,
    },

    /// An error wrapped with a descriptive prefix
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted
        context: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A convergence poll ran out of time before reaching its target state
    #[error(
        "timeout while waiting for state to become '{target}' (last state: '{last_state}', timeout: {timeout:?})"
    )]
    ConvergenceTimeout {
        /// State the poller was waiting for
        target: &'static str,
        /// State observed by the last completed tick
        last_state: &'static str,
        /// Overall budget that was exhausted
        timeout: Duration,
    },

    /// Upstream accepted a create that was never seen to converge
    #[error("{source} (record ID: {id})")]
    Unconfirmed {
        /// ID of the record upstream accepted
        id: String,
        /// Why confirmation failed
        #[source]
        source: Box<Error>,
    },

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// Record not found
    #[error("DNS record not found: {0}")]
    NotFound(String),

    /// More than one record matched a lookup that needs a single result
    #[error("{0}")]
    Ambiguous(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors (from API backends)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an upstream API error
    pub fn upstream(api: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            api: api.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an ambiguous-lookup error
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::Ambiguous(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Wrap this error with a descriptive prefix
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Mark a confirmation failure for a record upstream already accepted
    pub fn unconfirmed(self, id: impl Into<String>) -> Self {
        Self::Unconfirmed {
            id: id.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any wrapping layers
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } | Error::Unconfirmed { source, .. } = current {
            current = source;
        }
        current
    }

    /// ID of an accepted but unconfirmed record, if this error carries one
    pub fn unconfirmed_id(&self) -> Option<&str> {
        let mut current = self;
        loop {
            match current {
                Error::Unconfirmed { id, .. } => return Some(id.as_str()),
                Error::Context { source, .. } => current = source,
                _ => return None,
            }
        }
    }

    /// Whether this error (or the error it wraps) is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }

    /// Whether this error (or the error it wraps) is a convergence timeout
    pub fn is_convergence_timeout(&self) -> bool {
        matches!(self.root(), Error::ConvergenceTimeout { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Extension for attaching context to a `Result` in one call
pub trait ResultExt<T> {
    /// Wrap the error, if any, with a descriptive prefix
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

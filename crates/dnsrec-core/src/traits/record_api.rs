// # Record API Trait
//
// Defines the three upstream capabilities the core consumes: list every
// record, add one record, remove one record.
//
// ## Implementations
//
// - DreamHost: `dnsrec-provider-dreamhost` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::{RecordApi, RecordInput};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* RecordApi implementation */;
//
//     api.add_record(&RecordInput::new("www.example.com", "A", "192.0.2.1")).await?;
//     let records = api.list_records().await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{Record, RecordInput};

/// Trait for upstream DNS record API backends
///
/// Implementations translate the three operations into calls against a
/// concrete remote API and nothing more.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Responsibilities
///
/// Backends are single-shot: one call, one upstream request (or as few as
/// the remote protocol needs).
///
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint
/// - ✅ Parse responses into [`Record`] values
/// - ✅ Report failures with the upstream message preserved
/// - ❌ Retry or back off (owned by [`crate::retry`])
/// - ❌ Cache listings (owned by [`crate::client::RecordClient`])
/// - ❌ Wait for changes to become visible (owned by [`crate::poller`])
///
/// Transient failures should be reported with messages the retry classifier
/// recognises ("rate limit", "timeout", "service unavailable", ...), see
/// [`crate::retry::is_retryable_error`].
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// List every record visible to the account
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: The complete collection, in upstream order
    /// - `Err(Error)`: If the request failed
    async fn list_records(&self) -> Result<Vec<Record>, crate::Error>;

    /// Add a single record
    ///
    /// Success only means upstream accepted the request; the record may not
    /// be listed yet.
    async fn add_record(&self, input: &RecordInput) -> Result<(), crate::Error>;

    /// Remove a single record
    ///
    /// Success only means upstream accepted the request; the record may
    /// still be listed for a while.
    async fn remove_record(&self, input: &RecordInput) -> Result<(), crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn api_name(&self) -> &'static str;
}

/// Helper trait for constructing record API backends from configuration
pub trait RecordApiFactory: Send + Sync {
    /// Create a RecordApi instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this backend
    ///
    /// # Returns
    ///
    /// A boxed RecordApi trait object
    fn create(
        &self,
        config: &crate::config::ApiConfig,
    ) -> Result<Box<dyn RecordApi>, crate::Error>;
}

//! Cached record client
//!
//! [`RecordClient`] wraps an upstream [`RecordApi`] and owns the
//! [`RecordSetCache`] that serves identity lookups.
//!
//! ```text
//!              add / remove                 list
//! caller ───▶ RecordClient ─────────────▶ RecordApi
//!                  │  ▲ invalidate on success
//!                  ▼  │
//!             RecordSetCache ◀── find_record(use_cache = true)
//! ```
//!
//! Mutations never take the cache lock while talking to upstream: the
//! upstream call happens first and only a successful one clears the slot.

use tracing::{debug, info};

use crate::cache::RecordSetCache;
use crate::error::{Result, ResultExt};
use crate::record::{Record, RecordInput};
use crate::traits::RecordApi;

/// Context attached to errors of the forced upstream listing
pub const REFRESH_ERROR_CONTEXT: &str = "failed to refresh cache";

/// Record client with a read-through cache
///
/// One instance owns one cache; independent clients never share state.
/// The client is `Send + Sync` and is usually shared behind an `Arc`.
pub struct RecordClient {
    /// Upstream API backend
    api: Box<dyn RecordApi>,

    /// Snapshot of the full upstream collection
    cache: RecordSetCache,
}

impl RecordClient {
    /// Create a new client with an empty cache
    pub fn new(api: Box<dyn RecordApi>) -> Self {
        Self {
            api,
            cache: RecordSetCache::new(),
        }
    }

    /// Name of the upstream backend
    pub fn api_name(&self) -> &'static str {
        self.api.api_name()
    }

    /// List every record directly from upstream, bypassing the cache
    pub async fn list_records(&self) -> Result<Vec<Record>> {
        debug!(api = self.api.api_name(), "listing records from upstream");
        self.api.list_records().await
    }

    /// Add a record upstream
    ///
    /// On success the cache is invalidated; on failure it is left untouched.
    pub async fn add_record(&self, input: &RecordInput) -> Result<()> {
        self.api.add_record(input).await?;
        info!(record = %input, "record added upstream");
        self.cache.invalidate().await;
        Ok(())
    }

    /// Remove a record upstream
    ///
    /// On success the cache is invalidated; on failure it is left untouched.
    pub async fn remove_record(&self, input: &RecordInput) -> Result<()> {
        self.api.remove_record(input).await?;
        info!(record = %input, "record removed upstream");
        self.cache.invalidate().await;
        Ok(())
    }

    /// Find the first record with the identity of `input`
    ///
    /// # Parameters
    ///
    /// - `input`: Identity to look for (value compared with trailing-dot tolerance)
    /// - `use_cache`: When `false`, a fresh upstream listing is fetched under
    ///   the cache lock and replaces the snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Record))`: An owned copy of the first match
    /// - `Ok(None)`: No record matched
    /// - `Err(Error)`: The listing failed
    pub async fn find_record(&self, input: &RecordInput, use_cache: bool) -> Result<Option<Record>> {
        let records = if use_cache {
            self.cache.get(|| self.list_records()).await?
        } else {
            self.cache
                .refresh(|| self.list_records())
                .await
                .context(REFRESH_ERROR_CONTEXT)?
        };
        let found = records.into_iter().find(|record| record.matches(input));

        debug!(record = %input, found = found.is_some(), use_cache, "record lookup");
        Ok(found)
    }

    /// Drop the cached snapshot so the next read goes upstream
    pub async fn invalidate_cache(&self) {
        self.cache.invalidate().await;
    }

    /// Access the underlying cache (diagnostics)
    pub fn cache(&self) -> &RecordSetCache {
        &self.cache
    }
}

impl std::fmt::Debug for RecordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordClient")
            .field("api", &self.api.api_name())
            .field("cache", &self.cache)
            .finish()
    }
}

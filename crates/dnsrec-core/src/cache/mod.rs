// # RecordSet Cache
//
// Single-slot read-through cache of the complete upstream record collection.
//
// ## Why one slot
//
// The upstream API only offers a bulk listing, so the cache holds the whole
// collection as one snapshot instead of per-record entries.
//
// ## Concurrency
//
// One async mutex guards the slot and stays locked across the upstream
// fetch. Concurrent readers of an empty slot therefore queue behind the
// first one; when they get the lock the slot is populated and they return
// without fetching again (mutex-based single-flight).
//
// ## Invariants
//
// - A snapshot is installed only after a complete, successful fetch.
// - A failed fetch leaves the slot as it was.
// - Every fetch, forced or not, runs under the lock, so an invalidation
//   always lands after any fetch that started before it.
// - Every read hands out an owned copy.

use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;

/// Context attached to fetch failures surfaced by [`RecordSetCache::get`]
pub const FETCH_ERROR_CONTEXT: &str = "failed to list DNS records";

/// A complete point-in-time copy of the upstream collection
#[derive(Debug, Clone)]
struct Snapshot {
    records: Vec<Record>,
    fetched_at: DateTime<Utc>,
}

/// Mutex-guarded single-slot cache of the full record collection
///
/// # Example
///
/// ```rust,no_run
/// use dnsrec_core::cache::RecordSetCache;
///
/// # async fn demo() -> dnsrec_core::Result<()> {
/// let cache = RecordSetCache::new();
///
/// // First call fetches, later calls are served from the slot
/// let records = cache.get(|| async { Ok(Vec::new()) }).await?;
/// assert!(records.is_empty());
///
/// cache.invalidate().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RecordSetCache {
    slot: Mutex<Option<Snapshot>>,
}

impl RecordSetCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached records, fetching them first if the slot is empty
    ///
    /// The lock is held for the whole call, including `fetch`.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: A copy of the snapshot
    /// - `Err(Error)`: The fetch error, wrapped with [`FETCH_ERROR_CONTEXT`];
    ///   the slot stays empty
    pub async fn get<F, Fut>(&self, fetch: F) -> Result<Vec<Record>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Record>>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(snapshot) = slot.as_ref() {
            debug!(records = snapshot.records.len(), "record cache hit");
            return Ok(snapshot.records.clone());
        }

        debug!("record cache miss, fetching from upstream");
        let records = fetch()
            .await
            .map_err(|e: Error| e.context(FETCH_ERROR_CONTEXT))?;

        let copy = records.clone();
        *slot = Some(Snapshot {
            records,
            fetched_at: Utc::now(),
        });
        Ok(copy)
    }

    /// Fetch unconditionally and install the result
    ///
    /// The lock is held across `fetch`, so an [`invalidate`](Self::invalidate)
    /// issued while the fetch is in flight runs after the install and clears
    /// it. The slot can never hold a listing older than the last
    /// invalidation.
    ///
    /// On failure the slot is left as it was and the error is returned
    /// unwrapped.
    pub async fn refresh<F, Fut>(&self, fetch: F) -> Result<Vec<Record>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Record>>>,
    {
        let mut slot = self.slot.lock().await;

        let records = fetch().await?;
        debug!(records = records.len(), "record cache refreshed");

        let copy = records.clone();
        *slot = Some(Snapshot {
            records,
            fetched_at: Utc::now(),
        });
        Ok(copy)
    }

    /// Clear the slot
    ///
    /// Idempotent; clearing an empty slot is a no-op.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!("record cache invalidated");
        }
    }

    /// Check if the slot currently holds a snapshot
    pub async fn is_populated(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// When the current snapshot was fetched, if there is one
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().await.as_ref().map(|s| s.fetched_at)
    }
}

// # dnsrec-core
//
// Core library for working with remote, eventually-consistent DNS record APIs.
//
// ## Architecture Overview
//
// - **RecordApi**: Trait for the upstream list/add/remove capabilities
// - **RecordSetCache**: Single-slot, mutex-guarded cache of the full record listing
// - **RecordClient**: Upstream API plus cache, with identity lookups
// - **retry_on_error**: Retries mutations that fail with transient errors
// - **Convergence poller**: Waits until upstream reflects an add or a remove
// - **RecordManager**: Create/read/delete lifecycle built from the pieces above
// - **ApiRegistry**: Plugin-based registry for API backends
//
// ## Design Principles
//
// 1. **Fresh after write**: Every successful mutation invalidates the cache
// 2. **Transient vs fatal**: Only failures that look transient are retried
// 3. **Confirmed writes**: Mutations are followed by convergence polling
// 4. **Prompt cancellation**: Every wait honours a `CancellationToken`
// 5. **Library-First**: All core functionality can be used as a library

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod poller;
pub mod query;
pub mod record;
pub mod registry;
pub mod retry;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use cache::RecordSetCache;
pub use client::RecordClient;
pub use config::{ApiConfig, DnsRecConfig, RetryConfig};
pub use error::{Error, Result};
pub use manager::{DeleteOutcome, RecordManager};
pub use poller::{PollConfig, wait_for_record, wait_for_record_deletion};
pub use query::{QueryResult, RecordFilter};
pub use record::{Record, RecordInput, RecordType};
pub use registry::ApiRegistry;
pub use retry::{RetryPolicy, is_retryable_error, retry_on_error};
pub use traits::{RecordApi, RecordApiFactory};
pub use tokio_util::sync::CancellationToken;

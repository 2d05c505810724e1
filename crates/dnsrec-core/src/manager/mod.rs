//! Record lifecycle manager
//!
//! The RecordManager is responsible for:
//! - Validating record inputs before they reach upstream
//! - Running mutations under the retry policy
//! - Confirming mutations with the convergence poller
//! - Serving cached reads and filtered listings
//!
//! ## Architecture
//!
//! ```text
//!                    ┌───────────────┐
//!   create/delete ──▶│ RecordManager │
//!                    └───────────────┘
//!                            │
//!          ┌─────────────────┼──────────────────┐
//!          ▼                 ▼                  ▼
//!  ┌──────────────┐  ┌──────────────┐  ┌─────────────────┐
//!  │ retry_on_    │  │ RecordClient │  │ wait_for_record │
//!  │ error        │─▶│ (+ cache)    │◀─│ (_deletion)     │
//!  └──────────────┘  └──────────────┘  └─────────────────┘
//! ```
//!
//! ## Confirmation Policy
//!
//! A create that cannot be confirmed is an error: the caller cannot assume
//! the record exists. A delete that cannot be confirmed is only a warning,
//! because upstream already accepted the removal.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::RecordClient;
use crate::config::RetryConfig;
use crate::error::Result;
use crate::poller::{PollConfig, wait_for_record, wait_for_record_deletion};
use crate::query::{QueryResult, RecordFilter, filter_records, find_unique};
use crate::record::{Record, RecordInput, RecordType};
use crate::retry::{RetryPolicy, retry_on_error};
use crate::validate::validate_input;

/// Result of a delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Whether the record was observed to disappear
    pub confirmed: bool,
    /// Non-fatal problems worth reporting to the user
    pub warnings: Vec<String>,
}

/// Drives record create/read/delete against a shared [`RecordClient`]
///
/// Cheap to clone; clones share the client and its cache.
#[derive(Debug, Clone)]
pub struct RecordManager {
    /// Cached upstream client
    client: Arc<RecordClient>,

    /// Retry policy for mutations
    retry: RetryPolicy,

    /// Timing of convergence polls
    poll: PollConfig,
}

impl RecordManager {
    /// Create a manager with the default retry and poll timing
    pub fn new(client: Arc<RecordClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            poll: PollConfig::default(),
        }
    }

    /// Create a manager with timing taken from configuration
    pub fn from_config(client: Arc<RecordClient>, config: &RetryConfig) -> Self {
        Self::new(client)
            .with_retry_policy(config.retry_policy())
            .with_poll_config(config.poll_config())
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the poll timing
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// The shared client
    pub fn client(&self) -> &Arc<RecordClient> {
        &self.client
    }

    /// Create a record and wait until upstream lists it
    ///
    /// CNAME values get the trailing dot upstream would add anyway, so the
    /// returned record and its ID match what upstream stores.
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: The record as upstream lists it
    /// - `Err(Error)`: Validation, mutation or confirmation failed. A
    ///   confirmation failure carries the normalized ID, see
    ///   [`Error::unconfirmed_id`](crate::Error::unconfirmed_id).
    pub async fn create(&self, input: RecordInput, cancel: &CancellationToken) -> Result<Record> {
        validate_input(&input)?;
        let input = normalize_for_upstream(input);

        info!(record = %input, "creating record");
        let client = &self.client;
        retry_on_error(&self.retry, cancel, || client.add_record(&input)).await?;

        wait_for_record(client, &input, &self.poll, cancel)
            .await
            .map_err(|e| {
                let id = input.to_id();
                warn!(id = %id, error = %e, "DNS record accepted but not confirmed");
                e.unconfirmed(id)
            })
    }

    /// Read a record by ID from the cached snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Record))`: The record exists
    /// - `Ok(None)`: The record is gone
    /// - `Err(Error)`: The ID is malformed or listing failed
    pub async fn read(&self, id: &str) -> Result<Option<Record>> {
        let input = RecordInput::from_id(id)?;
        self.client.find_record(&input, true).await
    }

    /// Delete a record and try to confirm that it disappeared
    ///
    /// Failing to confirm is reported in [`DeleteOutcome::warnings`];
    /// cancellation is always an error.
    pub async fn delete(
        &self,
        input: &RecordInput,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome> {
        info!(record = %input, "deleting record");
        let client = &self.client;
        retry_on_error(&self.retry, cancel, || client.remove_record(input)).await?;

        match wait_for_record_deletion(client, input, &self.poll, cancel).await {
            Ok(()) => Ok(DeleteOutcome {
                confirmed: true,
                warnings: Vec::new(),
            }),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(record = %input, error = %e, "could not confirm DNS record deletion");
                Ok(DeleteOutcome {
                    confirmed: false,
                    warnings: vec![format!("Could not confirm DNS record deletion: {}", e)],
                })
            }
        }
    }

    /// Delete a record identified by its ID
    pub async fn delete_by_id(&self, id: &str, cancel: &CancellationToken) -> Result<DeleteOutcome> {
        let input = RecordInput::from_id(id)?;
        self.delete(&input, cancel).await
    }

    /// List records matching `filter`, straight from upstream
    pub async fn list_filtered(&self, filter: &RecordFilter) -> Result<QueryResult> {
        let records = self.client.list_records().await?;
        Ok(filter_records(records, filter))
    }

    /// Look up the single record with this name and type, straight from upstream
    ///
    /// Without `value`, several matches are an ambiguity error.
    pub async fn lookup(
        &self,
        name: &str,
        record_type: &RecordType,
        value: Option<&str>,
    ) -> Result<Record> {
        let records = self.client.list_records().await?;
        find_unique(&records, name, record_type, value)
    }
}

/// Add the trailing dot upstream appends to CNAME values
fn normalize_for_upstream(mut input: RecordInput) -> RecordInput {
    if input.record_type == RecordType::Cname && !input.value.ends_with('.') {
        input.value.push('.');
    }
    input
}

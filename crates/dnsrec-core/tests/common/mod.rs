//! Test doubles and common utilities for the contract tests
//!
//! This module provides a scriptable in-memory upstream that counts every
//! call and can fail, lag, or hide records on demand.

#![allow(dead_code)]

use dnsrec_core::error::{Error, Result};
use dnsrec_core::{
    PollConfig, Record, RecordApi, RecordClient, RecordInput, RecordManager, RecordType,
    RetryPolicy,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Shared state behind every clone of a [`MockRecordApi`]
#[derive(Default)]
struct MockState {
    records: Mutex<Vec<Record>>,
    list_calls: AtomicUsize,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    list_failures: Mutex<VecDeque<String>>,
    add_failures: Mutex<VecDeque<String>>,
    remove_failures: Mutex<VecDeque<String>>,
    list_error: Mutex<Option<String>>,
    list_latency: Mutex<Duration>,
    hidden_until: Mutex<Option<Instant>>,
    ignore_mutations: AtomicBool,
    snapshot_on_arrival: AtomicBool,
}

/// An in-memory upstream record API that tracks calls
///
/// Clones share state, so a test can keep one handle while the client owns
/// another.
#[derive(Clone, Default)]
pub struct MockRecordApi {
    inner: Arc<MockState>,
}

impl MockRecordApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that already lists `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        let api = Self::new();
        *api.inner.records.lock().unwrap() = records;
        api
    }

    /// Get the number of times list_records() was called
    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times add_record() was called
    pub fn add_calls(&self) -> usize {
        self.inner.add_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times remove_record() was called
    pub fn remove_calls(&self) -> usize {
        self.inner.remove_calls.load(Ordering::SeqCst)
    }

    /// Records currently stored upstream (visible or not)
    pub fn stored(&self) -> Vec<Record> {
        self.inner.records.lock().unwrap().clone()
    }

    /// Store a record upstream without going through the client
    pub fn insert(&self, record: Record) {
        self.inner.records.lock().unwrap().push(record);
    }

    /// Drop a record upstream without going through the client
    pub fn remove_record_direct(&self, input: &RecordInput) {
        self.inner.records.lock().unwrap().retain(|r| !r.matches(input));
    }

    /// Make the next `times` list calls fail with `message`
    pub fn fail_next_lists(&self, message: &str, times: usize) {
        let mut failures = self.inner.list_failures.lock().unwrap();
        failures.extend(std::iter::repeat_n(message.to_string(), times));
    }

    /// Make the next `times` add calls fail with `message`
    pub fn fail_next_adds(&self, message: &str, times: usize) {
        let mut failures = self.inner.add_failures.lock().unwrap();
        failures.extend(std::iter::repeat_n(message.to_string(), times));
    }

    /// Make the next `times` remove calls fail with `message`
    pub fn fail_next_removes(&self, message: &str, times: usize) {
        let mut failures = self.inner.remove_failures.lock().unwrap();
        failures.extend(std::iter::repeat_n(message.to_string(), times));
    }

    /// Make every list call fail with `message` until cleared with `None`
    pub fn set_list_error(&self, message: Option<&str>) {
        *self.inner.list_error.lock().unwrap() = message.map(str::to_string);
    }

    /// Delay every list call by `latency`
    pub fn set_list_latency(&self, latency: Duration) {
        *self.inner.list_latency.lock().unwrap() = latency;
    }

    /// List nothing for the next `duration` (eventual consistency)
    pub fn hide_records_for(&self, duration: Duration) {
        *self.inner.hidden_until.lock().unwrap() = Some(Instant::now() + duration);
    }

    /// Capture the listing when a list call arrives instead of after its latency
    pub fn snapshot_on_arrival(&self) {
        self.inner.snapshot_on_arrival.store(true, Ordering::SeqCst);
    }

    /// Accept add/remove calls without changing what is listed
    pub fn ignore_mutations(&self) {
        self.inner.ignore_mutations.store(true, Ordering::SeqCst);
    }
}

fn pop_failure(failures: &Mutex<VecDeque<String>>) -> Option<String> {
    failures.lock().unwrap().pop_front()
}

#[async_trait::async_trait]
impl RecordApi for MockRecordApi {
    async fn list_records(&self) -> Result<Vec<Record>> {
        self.inner.list_calls.fetch_add(1, Ordering::SeqCst);

        let captured = self
            .inner
            .snapshot_on_arrival
            .load(Ordering::SeqCst)
            .then(|| self.inner.records.lock().unwrap().clone());

        let latency = *self.inner.list_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = pop_failure(&self.inner.list_failures) {
            return Err(Error::upstream("mock", message));
        }
        if let Some(message) = self.inner.list_error.lock().unwrap().clone() {
            return Err(Error::upstream("mock", message));
        }

        let hidden_until = *self.inner.hidden_until.lock().unwrap();
        if hidden_until.is_some_and(|until| Instant::now() < until) {
            return Ok(Vec::new());
        }

        Ok(captured.unwrap_or_else(|| self.inner.records.lock().unwrap().clone()))
    }

    async fn add_record(&self, input: &RecordInput) -> Result<()> {
        self.inner.add_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = pop_failure(&self.inner.add_failures) {
            return Err(Error::upstream("mock", message));
        }
        if !self.inner.ignore_mutations.load(Ordering::SeqCst) {
            self.inner.records.lock().unwrap().push(record(
                &input.name,
                input.record_type.clone(),
                &input.value,
            ));
        }
        Ok(())
    }

    async fn remove_record(&self, input: &RecordInput) -> Result<()> {
        self.inner.remove_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = pop_failure(&self.inner.remove_failures) {
            return Err(Error::upstream("mock", message));
        }
        if !self.inner.ignore_mutations.load(Ordering::SeqCst) {
            self.inner
                .records
                .lock()
                .unwrap()
                .retain(|r| !r.matches(input));
        }
        Ok(())
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an upstream record with plausible metadata
pub fn record(name: &str, record_type: impl Into<RecordType>, value: &str) -> Record {
    Record {
        name: name.to_string(),
        record_type: record_type.into(),
        value: value.to_string(),
        zone: "example.com".to_string(),
        comment: String::new(),
        account_id: "12345".to_string(),
        editable: true,
    }
}

/// A client over a fresh handle of `api`
pub fn client_for(api: &MockRecordApi) -> Arc<RecordClient> {
    Arc::new(RecordClient::new(Box::new(api.clone())))
}

/// Millisecond-scale retry policy for tests
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(Duration::from_secs(2), Duration::from_millis(10))
}

/// Millisecond-scale poll timing for tests
pub fn fast_poll() -> PollConfig {
    PollConfig::new(
        Duration::from_secs(3),
        Duration::from_millis(10),
        Duration::from_millis(5),
    )
}

/// A manager over `api` with test timing
pub fn fast_manager(api: &MockRecordApi) -> RecordManager {
    RecordManager::new(client_for(api))
        .with_retry_policy(fast_retry())
        .with_poll_config(fast_poll())
}

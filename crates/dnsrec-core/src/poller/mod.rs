//! Convergence poller
//!
//! The upstream API is eventually consistent: a successful add or remove
//! says nothing about when the change becomes visible in listings. The
//! poller re-reads upstream until the record's presence matches what the
//! mutation promised.
//!
//! One generic state machine, [`poll_until`], drives both directions:
//!
//! ```text
//! create:  pending  ──(record found)──▶  available
//! delete:  deleting ──(record gone)───▶  deleted
//! ```
//!
//! Every tick of [`wait_for_record`] and [`wait_for_record_deletion`]
//! invalidates the client cache and performs an uncached lookup, so a stale
//! snapshot can never fake convergence.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::RecordClient;
use crate::error::{Error, Result, ResultExt};
use crate::record::{Record, RecordInput};
use crate::retry::{DEFAULT_DELAY, DEFAULT_MIN_DELAY, DEFAULT_TIMEOUT};

/// Create direction: record not yet visible
pub const STATE_PENDING: &str = "pending";
/// Create direction: record visible
pub const STATE_AVAILABLE: &str = "available";
/// Delete direction: record still visible
pub const STATE_DELETING: &str = "deleting";
/// Delete direction: record gone
pub const STATE_DELETED: &str = "deleted";

/// Timing of a convergence poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Overall budget
    pub timeout: Duration,
    /// Delay before each tick
    pub delay: Duration,
    /// Floor for the delay before each tick
    pub min_wait: Duration,
}

impl PollConfig {
    /// Create a poll configuration
    pub fn new(timeout: Duration, delay: Duration, min_wait: Duration) -> Self {
        Self {
            timeout,
            delay,
            min_wait,
        }
    }

    /// Wait applied before every tick
    pub fn tick_wait(&self) -> Duration {
        self.delay.max(self.min_wait)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_DELAY, DEFAULT_MIN_DELAY)
    }
}

/// The two states of one polling direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State while the poll must continue
    pub pending: &'static str,
    /// State that ends the poll successfully
    pub target: &'static str,
    /// Whether a found payload means the target was reached
    pub target_when_found: bool,
}

/// Wait for a record to appear
pub const CREATE: Transition = Transition {
    pending: STATE_PENDING,
    target: STATE_AVAILABLE,
    target_when_found: true,
};

/// Wait for a record to disappear
pub const DELETE: Transition = Transition {
    pending: STATE_DELETING,
    target: STATE_DELETED,
    target_when_found: false,
};

/// Outcome of a single refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick<T> {
    /// State label of this tick
    pub state: &'static str,
    /// What the refresh found, if anything
    pub payload: Option<T>,
}

impl Transition {
    /// Map a refresh result onto this direction's states
    pub fn classify<T>(&self, found: Option<T>) -> Tick<T> {
        let state = match (found.is_some(), self.target_when_found) {
            (true, true) | (false, false) => self.target,
            _ => self.pending,
        };
        Tick {
            state,
            payload: found,
        }
    }
}

/// Poll `refresh` until it reports the transition's target state
///
/// Before every tick the poller waits [`PollConfig::tick_wait`]. The whole
/// poll, waits and refreshes included, is bounded by `config.timeout`.
///
/// # Returns
///
/// - `Ok(payload)`: Payload of the tick that reached the target
/// - `Err(Error::ConvergenceTimeout)`: The budget ran out first
/// - `Err(Error::Cancelled)`: `cancel` fired
/// - `Err(Error)`: A refresh failed; polling stops at once
pub async fn poll_until<T, F, Fut>(
    config: &PollConfig,
    transition: Transition,
    cancel: &CancellationToken,
    mut refresh: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + config.timeout;
    let timed_out = |last_state: &'static str| Error::ConvergenceTimeout {
        target: transition.target,
        last_state,
        timeout: config.timeout,
    };
    let mut last_state = transition.pending;
    let mut ticks: usize = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep_until(deadline) => return Err(timed_out(last_state)),
            _ = tokio::time::sleep(config.tick_wait()) => {}
        }

        ticks += 1;
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep_until(deadline) => return Err(timed_out(last_state)),
            found = refresh() => found?,
        };

        let tick = transition.classify(found);
        debug!(tick = ticks, state = tick.state, target = transition.target, "convergence tick");

        if tick.state == transition.target {
            return Ok(tick.payload);
        }
        last_state = tick.state;
    }
}

/// One tick of both directions: drop the cache, then look up uncached
async fn refresh_presence(client: &RecordClient, input: &RecordInput) -> Result<Option<Record>> {
    client.invalidate_cache().await;
    client.find_record(input, false).await
}

/// Wait until `input` is visible upstream
///
/// # Returns
///
/// - `Ok(Record)`: The record as upstream lists it
/// - `Err(Error)`: Timeout, cancellation or lookup failure, wrapped with
///   "error waiting for DNS record"
pub async fn wait_for_record(
    client: &RecordClient,
    input: &RecordInput,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Record> {
    let found = poll_until(config, CREATE, cancel, || refresh_presence(client, input))
        .await
        .context("error waiting for DNS record")?;

    let record = found.ok_or_else(|| Error::not_found("DNS record not found after waiting"))?;
    info!(record = %input, "record is visible upstream");
    Ok(record)
}

/// Wait until `input` is no longer visible upstream
///
/// # Returns
///
/// - `Ok(())`: The record is gone
/// - `Err(Error)`: Timeout, cancellation or lookup failure, wrapped with
///   "error waiting for DNS record deletion"
pub async fn wait_for_record_deletion(
    client: &RecordClient,
    input: &RecordInput,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    poll_until(config, DELETE, cancel, || refresh_presence(client, input))
        .await
        .context("error waiting for DNS record deletion")?;

    info!(record = %input, "record is gone upstream");
    Ok(())
}

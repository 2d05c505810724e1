// # DreamHost DNS Record API
//
// This crate provides the DreamHost implementation of `RecordApi` for dnsrec.
//
// ## Responsibilities
//
// - One HTTP request per trait call (list, add, or remove)
// - Translate HTTP and transport failures into messages the core retry
//   classifier recognises (`rate limit`, `bad gateway`, `service unavailable`,
//   `timeout`, `connection refused`)
// - Preserve upstream error text verbatim when DreamHost rejects a command
//
// ## Not Here
//
// - Retries and delays belong to `dnsrec_core::retry`
// - Caching belongs to `dnsrec_core::cache`
// - Convergence checks belong to `dnsrec_core::poller`
//
// ## Security Requirements
//
// - API key NEVER appears in logs, `Debug` output, or error messages
// - Transport errors are stripped of the request URL, which carries the key
//
// ## API Reference
//
// - DreamHost API: https://help.dreamhost.com/hc/en-us/articles/217560167
// - List:   GET `/?key=..&cmd=dns-list_records&format=json`
// - Add:    GET `/?key=..&cmd=dns-add_record&record=..&type=..&value=..&format=json`
// - Remove: GET `/?key=..&cmd=dns-remove_record&record=..&type=..&value=..&format=json`

use async_trait::async_trait;
use dnsrec_core::config::ApiConfig;
use dnsrec_core::traits::{RecordApi, RecordApiFactory};
use dnsrec_core::{ApiRegistry, Error, Record, RecordInput, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// DreamHost API base URL
const DREAMHOST_API_BASE: &str = "https://api.dreamhost.com/";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Name used in upstream error messages and the registry
const API_NAME: &str = "dreamhost";

const CMD_LIST: &str = "dns-list_records";
const CMD_ADD: &str = "dns-add_record";
const CMD_REMOVE: &str = "dns-remove_record";

/// DreamHost DNS record API
///
/// Stateless apart from the HTTP connection pool. The Debug implementation
/// does NOT expose the API key.
pub struct DreamhostApi {
    /// DreamHost API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Endpoint, normally [`DREAMHOST_API_BASE`]
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for DreamhostApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DreamhostApi")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DreamhostApi {
    /// Create a new DreamHost API client
    ///
    /// # Parameters
    ///
    /// - `api_key`: DreamHost API key with the `dns-*` permissions
    /// - `base_url`: Endpoint override; `None` uses the public API
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty key and `Error::Http` if the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("DreamHost API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DREAMHOST_API_BASE.to_string()),
            client,
        })
    }

    /// Run one API command and return the `data` member of a successful reply
    async fn call(&self, cmd: &str, params: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!(cmd, "calling DreamHost API");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("cmd", cmd), ("format", "json")])
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(transport_error)?;
        parse_envelope(&body)
    }

    /// Run a mutating command for `input`
    async fn mutate(&self, cmd: &str, input: &RecordInput) -> Result<()> {
        let params = [
            ("record", input.name.as_str()),
            ("type", input.record_type.as_str()),
            ("value", input.value.as_str()),
        ];
        let data = self.call(cmd, &params).await?;
        tracing::debug!(cmd, record = %input, reply = %data, "DreamHost command accepted");
        Ok(())
    }
}

#[async_trait]
impl RecordApi for DreamhostApi {
    async fn list_records(&self) -> Result<Vec<Record>> {
        let data = self.call(CMD_LIST, &[]).await?;
        let records = parse_records(data)?;
        tracing::debug!(count = records.len(), "listed DreamHost records");
        Ok(records)
    }

    async fn add_record(&self, input: &RecordInput) -> Result<()> {
        tracing::info!(record = %input, "adding DreamHost record");
        self.mutate(CMD_ADD, input).await
    }

    async fn remove_record(&self, input: &RecordInput) -> Result<()> {
        tracing::info!(record = %input, "removing DreamHost record");
        self.mutate(CMD_REMOVE, input).await
    }

    fn api_name(&self) -> &'static str {
        API_NAME
    }
}

/// Reply envelope shared by every command
#[derive(Debug, Deserialize)]
struct Envelope {
    result: String,
    #[serde(default)]
    data: Value,
}

/// One entry of a `dns-list_records` reply
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    zone: String,
    record: String,
    #[serde(rename = "type")]
    record_type: String,
    value: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    editable: String,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Record {
            name: wire.record,
            record_type: wire.record_type.into(),
            value: wire.value,
            zone: wire.zone,
            comment: wire.comment,
            account_id: wire.account_id,
            editable: wire.editable == "1",
        }
    }
}

/// Unwrap a reply envelope, turning `result: error` into an upstream error
fn parse_envelope(body: &str) -> Result<Value> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        Error::upstream(API_NAME, format!("failed to parse response: {}", e))
    })?;

    if envelope.result == "success" {
        return Ok(envelope.data);
    }

    let message = match envelope.data {
        Value::String(text) => text,
        Value::Null => format!("command failed with result '{}'", envelope.result),
        other => other.to_string(),
    };
    Err(Error::upstream(API_NAME, message))
}

fn parse_records(data: Value) -> Result<Vec<Record>> {
    let wire: Vec<WireRecord> = serde_json::from_value(data).map_err(|e| {
        Error::upstream(API_NAME, format!("invalid record listing: {}", e))
    })?;
    Ok(wire.into_iter().map(Record::from).collect())
}

/// Map a non-success HTTP status to an upstream error
fn status_error(status: u16, body: &str) -> Error {
    let message = match status {
        401 | 403 => format!(
            "authentication failed: invalid API key or insufficient permissions (status {})",
            status
        ),
        429 => format!("rate limit exceeded (status {})", status),
        502 => format!("bad gateway (status {})", status),
        503 => format!("service unavailable (status {})", status),
        504 => format!("gateway timeout (status {})", status),
        500..=599 => format!("server error (status {}): {}", status, body),
        _ => format!("request failed (status {}): {}", status, body),
    };
    Error::upstream(API_NAME, message)
}

/// Map a transport failure, dropping the URL so the key cannot leak
fn transport_error(err: reqwest::Error) -> Error {
    let err = err.without_url();
    if err.is_timeout() {
        Error::upstream(API_NAME, format!("request timeout: {}", err))
    } else if err.is_connect() {
        Error::upstream(API_NAME, format!("connection refused: {}", err))
    } else {
        Error::http(format!("HTTP request failed: {}", err))
    }
}

/// Factory for creating DreamHost API clients
pub struct DreamhostFactory;

impl RecordApiFactory for DreamhostFactory {
    fn create(&self, config: &ApiConfig) -> Result<Box<dyn RecordApi>> {
        match config {
            ApiConfig::Dreamhost { api_key, base_url } => {
                if api_key.is_empty() {
                    return Err(Error::config("DreamHost API key is required"));
                }
                Ok(Box::new(DreamhostApi::new(api_key.clone(), base_url.clone())?))
            }
            _ => Err(Error::config("Invalid config for DreamHost API")),
        }
    }
}

/// Register the DreamHost API with a registry
///
/// # Example
///
/// ```rust
/// use dnsrec_core::ApiRegistry;
///
/// let registry = ApiRegistry::new();
/// dnsrec_provider_dreamhost::register(&registry);
/// assert!(registry.has_api("dreamhost"));
/// ```
pub fn register(registry: &ApiRegistry) {
    registry.register_api(API_NAME, Box::new(DreamhostFactory));
}

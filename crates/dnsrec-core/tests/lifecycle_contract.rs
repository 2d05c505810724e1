//! Contract Test: Record Lifecycle
//!
//! This test verifies create, read, and delete end to end against an
//! eventually consistent upstream.
//!
//! Constraints verified:
//! - A created record is confirmed and then served from cache
//! - Invalid input never reaches upstream
//! - A create that cannot be confirmed is an error carrying the record ID
//! - A delete that cannot be confirmed is only a warning
//! - Reads by ID use the cached snapshot
//! - Filtered listings and unique lookups go straight upstream

mod common;

use common::*;
use dnsrec_core::{CancellationToken, RecordFilter, RecordInput, RecordType};
use std::time::Duration;

#[tokio::test]
async fn create_confirms_and_then_serves_from_cache() {
    let api = MockRecordApi::new();
    let manager = fast_manager(&api);
    let cancel = CancellationToken::new();

    let created = manager
        .create(RecordInput::new("example.com", "A", "192.0.2.1"), &cancel)
        .await
        .unwrap();

    assert_eq!(created.name, "example.com");
    assert_eq!(created.record_type, RecordType::A);
    assert_eq!(created.value, "192.0.2.1");
    assert_eq!(api.add_calls(), 1);

    let lists_after_create = api.list_calls();
    assert!(lists_after_create >= 1);

    let input = created.to_input();
    let found = manager.client().find_record(&input, true).await.unwrap();
    assert_eq!(found, Some(created));
    assert_eq!(api.list_calls(), lists_after_create, "confirmed record must be cached");
}

#[tokio::test]
async fn create_survives_transient_failures_and_lag() {
    let api = MockRecordApi::new();
    api.fail_next_adds("too many requests", 2);
    api.hide_records_for(Duration::from_millis(80));
    let manager = fast_manager(&api);

    let created = manager
        .create(
            RecordInput::new("www.example.com", "A", "192.0.2.10"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(created.value, "192.0.2.10");
    assert_eq!(api.add_calls(), 3);
}

#[tokio::test]
async fn create_cname_appends_trailing_dot() {
    let api = MockRecordApi::new();
    let manager = fast_manager(&api);

    let created = manager
        .create(
            RecordInput::new("www.example.com", RecordType::Cname, "example.com"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(created.value, "example.com.");
    assert_eq!(created.to_input().to_id(), "CNAME|www.example.com|example.com.");
    assert_eq!(api.stored()[0].value, "example.com.");
}

#[tokio::test]
async fn invalid_input_never_reaches_upstream() {
    let api = MockRecordApi::new();
    let manager = fast_manager(&api);
    let cancel = CancellationToken::new();

    let bad_ip = manager
        .create(RecordInput::new("example.com", "A", "not-an-ip"), &cancel)
        .await;
    assert!(bad_ip.is_err());

    let bad_name = manager
        .create(RecordInput::new("-bad-.example.com", "A", "192.0.2.1"), &cancel)
        .await;
    assert!(bad_name.is_err());

    let bad_mx = manager
        .create(RecordInput::new("example.com", "MX", "mail.example.com"), &cancel)
        .await;
    assert!(bad_mx.is_err());

    assert_eq!(api.add_calls(), 0);
    assert_eq!(api.list_calls(), 0);
}

#[tokio::test]
async fn unconfirmed_create_is_an_error() {
    let api = MockRecordApi::new();
    api.ignore_mutations();
    let manager = fast_manager(&api).with_poll_config(dnsrec_core::PollConfig::new(
        Duration::from_millis(80),
        Duration::from_millis(10),
        Duration::from_millis(5),
    ));

    let err = manager
        .create(
            RecordInput::new("example.com", "A", "192.0.2.1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(api.add_calls(), 1);
    assert!(err.is_convergence_timeout());
    assert!(err.to_string().starts_with("error waiting for DNS record"));

    // Upstream accepted it, so the caller gets the ID to track or clean up
    assert_eq!(err.unconfirmed_id(), Some("A|example.com|192.0.2.1"));
    assert!(err.to_string().contains("A|example.com|192.0.2.1"));
}

#[tokio::test]
async fn unconfirmed_cname_create_reports_normalized_id() {
    let api = MockRecordApi::new();
    api.ignore_mutations();
    let manager = fast_manager(&api).with_poll_config(dnsrec_core::PollConfig::new(
        Duration::from_millis(60),
        Duration::from_millis(10),
        Duration::from_millis(5),
    ));

    let err = manager
        .create(
            RecordInput::new("www.example.com", "CNAME", "example.com"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.unconfirmed_id(), Some("CNAME|www.example.com|example.com."));
}

#[tokio::test]
async fn rejected_create_carries_no_record_id() {
    let api = MockRecordApi::new();
    api.fail_next_adds("invalid credentials", 1);
    let manager = fast_manager(&api);

    let err = manager
        .create(
            RecordInput::new("example.com", "A", "192.0.2.1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.unconfirmed_id(), None);
    assert!(err.to_string().contains("invalid credentials"));
}

#[tokio::test]
async fn delete_confirms_removal() {
    let api = MockRecordApi::with_records(vec![record("example.com", "A", "192.0.2.1")]);
    let manager = fast_manager(&api);

    let outcome = manager
        .delete_by_id("A|example.com|192.0.2.1", &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.confirmed);
    assert!(outcome.warnings.is_empty());
    assert_eq!(api.remove_calls(), 1);
    assert!(api.stored().is_empty());
}

#[tokio::test]
async fn unconfirmed_delete_is_a_warning() {
    let api = MockRecordApi::with_records(vec![record("example.com", "A", "192.0.2.1")]);
    api.ignore_mutations();
    let manager = fast_manager(&api).with_poll_config(dnsrec_core::PollConfig::new(
        Duration::from_millis(80),
        Duration::from_millis(10),
        Duration::from_millis(5),
    ));

    let outcome = manager
        .delete(
            &RecordInput::new("example.com", "A", "192.0.2.1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!outcome.confirmed);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].starts_with("Could not confirm DNS record deletion"));
}

#[tokio::test]
async fn fatal_remove_failure_is_an_error() {
    let api = MockRecordApi::with_records(vec![record("example.com", "A", "192.0.2.1")]);
    api.fail_next_removes("no such record", 1);
    let manager = fast_manager(&api);

    let err = manager
        .delete_by_id("A|example.com|192.0.2.1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("no such record"));
    assert_eq!(api.remove_calls(), 1);
    assert_eq!(api.stored().len(), 1);
}

#[tokio::test]
async fn cancelled_delete_is_an_error() {
    let api = MockRecordApi::with_records(vec![record("example.com", "A", "192.0.2.1")]);
    api.ignore_mutations();
    let manager = fast_manager(&api).with_poll_config(dnsrec_core::PollConfig::new(
        Duration::from_secs(60),
        Duration::from_millis(10),
        Duration::from_millis(5),
    ));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = manager
        .delete(&RecordInput::new("example.com", "A", "192.0.2.1"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn read_by_id_uses_cache() {
    let api = MockRecordApi::with_records(vec![
        record("example.com", "A", "192.0.2.1"),
        record("example.com", "MX", "10 mail.example.com"),
    ]);
    let manager = fast_manager(&api);

    let a = manager.read("A|example.com|192.0.2.1").await.unwrap();
    let mx = manager.read("MX|example.com|10 mail.example.com").await.unwrap();
    let gone = manager.read("A|example.com|192.0.2.99").await.unwrap();

    assert!(a.is_some());
    assert!(mx.is_some());
    assert!(gone.is_none());
    assert_eq!(api.list_calls(), 1);

    assert!(manager.read("not-an-id").await.is_err());
}

#[tokio::test]
async fn filtered_listing_and_lookup_go_upstream() {
    let api = MockRecordApi::with_records(vec![
        record("example.com", "A", "192.0.2.1"),
        record("example.com", "A", "192.0.2.2"),
        record("www.example.com", "CNAME", "example.com."),
    ]);
    let manager = fast_manager(&api);

    let result = manager
        .list_filtered(&RecordFilter::new().with_record_type("A"))
        .await
        .unwrap();
    assert_eq!(result.records.len(), 2);

    let result = manager
        .list_filtered(&RecordFilter::new().with_name("www"))
        .await
        .unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(api.list_calls(), 2);

    let err = manager
        .lookup("example.com", &RecordType::A, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("multiple DNS records found for example.com"));

    let found = manager
        .lookup("example.com", &RecordType::A, Some("192.0.2.2"))
        .await
        .unwrap();
    assert_eq!(found.value, "192.0.2.2");
    assert_eq!(api.list_calls(), 4);
}

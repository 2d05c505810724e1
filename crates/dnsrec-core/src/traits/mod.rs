//! Core traits for the dnsrec system
//!
//! This module defines the abstract interfaces that backends must follow.
//!
//! - [`RecordApi`]: List, add and remove records on a remote DNS API

pub mod record_api;

pub use record_api::{RecordApi, RecordApiFactory};

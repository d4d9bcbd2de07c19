//! # Data Transfer Objects (DTOs)
//!
//! Types exchanged between the wallet connector and the UI layers that
//! render it (Leptos components, plain JavaScript hosts).
//!
//! - [`wallet`] - connection snapshots, outcomes and error kinds
//!
//! Everything here crosses the JS boundary as JSON: camelCase field names,
//! `None` fields omitted where the UI treats absence and `null` alike.

pub mod wallet;

pub use wallet::*;

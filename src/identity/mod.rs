//! Google Identity Services integration.
//!
//! `bridge` and `retry` are browser-independent and unit tested; `gsi` holds
//! the DOM glue and only builds with the `csr` feature.

pub mod bridge;
#[cfg(feature = "csr")]
pub mod gsi;
pub mod retry;

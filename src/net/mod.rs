//! Networking modules for the remote accounts API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` wraps JSON requests and error normalization, `types` defines the
//! request/response schema, and `backend` / `mock_backend` are the two
//! account backends the auth service can run against.

pub mod api;
pub mod backend;
pub mod mock_backend;
pub mod types;

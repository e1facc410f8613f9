//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `auth` is the session snapshot components render from, `session` is the
//! observable store that owns and persists it, and `auth_service` is the
//! facade pages call to log in, register, and log out.

pub mod auth;
pub mod auth_service;
pub mod session;

//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns its form state and validation and talks to the session
//! through the `AuthService` in context; navigation after sign-in is driven
//! by the shared auth state signal.

pub mod login;
pub mod profile;
pub mod register;

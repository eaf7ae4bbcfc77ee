//! Middleware for observability.
//!
//! Authentication middleware lives with the auth core in `crate::auth`.

pub mod logging;

pub use logging::request_logging;

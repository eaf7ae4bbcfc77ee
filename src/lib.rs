//! Alumni API Library
//!
//! Exposes the auth core, resource stores and router for the binary and the
//! integration tests.

pub mod alumni;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod jobs;
pub mod middleware;
pub mod pagination;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::ApiError;

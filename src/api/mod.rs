//! HTTP API
//! Mission: Route requests to the auth core and the resource stores

pub mod alumni;
pub mod files;
pub mod jobs;
pub mod routes;

use crate::alumni::AlumniStore;
use crate::auth::{AuthService, JwtHandler};
use crate::files::FileStore;
use crate::jobs::JobStore;
use axum::{extract::FromRef, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use routes::create_router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub alumni: Arc<AlumniStore>,
    pub jobs: Arc<JobStore>,
    pub files: Arc<FileStore>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        alumni: Arc<AlumniStore>,
        jobs: Arc<JobStore>,
        files: Arc<FileStore>,
    ) -> Self {
        Self {
            auth,
            alumni,
            jobs,
            files,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<JwtHandler> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.jwt().clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

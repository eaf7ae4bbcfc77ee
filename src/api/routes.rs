//! Router assembly
//!
//! Public: health, login, self-service registration. Everything else sits
//! behind `auth_middleware`; admin-only methods add `admin_only` on top.

use crate::api::{alumni, files, health_check, jobs, AppState};
use crate::auth::{admin_only, api as auth_api, auth_middleware};
use crate::files::MAX_UPLOAD_BYTES;
use crate::middleware::request_logging;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Restrict a method router to admins
fn admin(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(admin_only))
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let jwt_handler = state.auth.jwt().clone();

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(auth_api::login))
        .route("/api/register", post(auth_api::register));

    let protected_routes = Router::new()
        // Accounts
        .route("/api/me", get(auth_api::get_current_user))
        .route("/api/register-admin", admin(post(auth_api::register_admin)))
        .route("/api/users", admin(get(auth_api::list_users)))
        .route("/api/users/:id/alumni", admin(put(alumni::link_user_alumni)))
        // Alumni
        .route(
            "/api/alumni",
            get(alumni::list_alumni).merge(admin(post(alumni::create_alumni))),
        )
        .route("/api/alumni/cohort/:year", get(alumni::get_cohort))
        .route(
            "/api/alumni/:id",
            get(alumni::get_alumni)
                .merge(admin(put(alumni::update_alumni)))
                .merge(admin(delete(alumni::delete_alumni))),
        )
        .route("/api/alumni/:id/jobs", get(alumni::get_alumni_with_jobs))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::list_jobs).merge(admin(post(jobs::create_job))),
        )
        .route("/api/jobs/trash", get(jobs::list_trash))
        .route("/api/jobs/alumni/:alumni_id", get(jobs::list_jobs_by_alumni))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::trash_job),
        )
        .route("/api/jobs/:id/restore", put(jobs::restore_job))
        .route(
            "/api/jobs/:id/permanent",
            delete(jobs::delete_job_permanently),
        )
        // Files; the body limit leaves room for multipart framing
        .route(
            "/api/files/upload",
            post(files::upload_file)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/api/files", get(files::list_files))
        .route(
            "/api/files/:id",
            get(files::get_file).delete(files::delete_file),
        )
        .route_layer(middleware::from_fn_with_state(
            jwt_handler,
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

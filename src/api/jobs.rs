//! Job API Endpoints
//!
//! Mutations on an existing job are open to admins and to the account linked
//! to the job's alumni record. Everyone else gets 403.

use crate::api::AppState;
use crate::auth::models::{Claims, UserRole};
use crate::error::{ApiError, ValidJson, ValidPath};
use crate::jobs::{Job, JobInput, UnknownAlumni, JOB_SORTABLE};
use crate::pagination::{ListParams, ListQuery, Paginated};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct JobList {
    pub data: Vec<Job>,
    pub total: usize,
}

impl From<Vec<Job>> for JobList {
    fn from(data: Vec<Job>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

fn job_not_found() -> ApiError {
    ApiError::not_found("Job not found")
}

fn unknown_alumni() -> ApiError {
    ApiError::invalid_payload("alumni_id does not reference an existing alumni")
}

fn map_store_error(err: anyhow::Error) -> ApiError {
    if err.is::<UnknownAlumni>() {
        unknown_alumni()
    } else {
        ApiError::Internal(err)
    }
}

fn checked_input(input: JobInput) -> Result<JobInput, ApiError> {
    let input = input.normalized();
    input.validate().map_err(ApiError::InvalidPayload)?;
    Ok(input)
}

/// Alumni record linked to the caller's account, if any
fn linked_alumni(state: &AppState, claims: &Claims) -> Result<Option<i64>, ApiError> {
    Ok(state
        .auth
        .store()
        .find_by_id(&claims.sub)?
        .and_then(|user| user.alumni_id))
}

fn ensure_owner(state: &AppState, claims: &Claims, alumni_id: i64) -> Result<(), ApiError> {
    match claims.role {
        UserRole::Admin => Ok(()),
        UserRole::User => match linked_alumni(state, claims)? {
            Some(own) if own == alumni_id => Ok(()),
            _ => {
                debug!(
                    "{} ({}) does not own jobs of alumni {}",
                    claims.username, claims.sub, alumni_id
                );
                Err(ApiError::Forbidden)
            }
        },
    }
}

fn find_active(state: &AppState, id: i64) -> Result<Job, ApiError> {
    state
        .jobs
        .get(id)?
        .filter(|job| !job.is_trashed())
        .ok_or_else(job_not_found)
}

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Job>>, ApiError> {
    let params = ListParams::from_query(&query, &JOB_SORTABLE);
    let (jobs, total) = state.jobs.list_active(&params)?;
    Ok(Json(Paginated::new(jobs, total, &params)))
}

/// GET /api/jobs/trash
/// Admins see the whole trash, users only jobs of their own alumni record.
pub async fn list_trash(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<JobList>, ApiError> {
    let jobs = match claims.role {
        UserRole::Admin => state.jobs.list_trashed(None)?,
        UserRole::User => match linked_alumni(&state, &claims)? {
            Some(alumni_id) => state.jobs.list_trashed(Some(alumni_id))?,
            None => Vec::new(),
        },
    };
    Ok(Json(JobList::from(jobs)))
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(find_active(&state, id)?))
}

/// GET /api/jobs/alumni/:alumni_id
pub async fn list_jobs_by_alumni(
    State(state): State<AppState>,
    ValidPath(alumni_id): ValidPath<i64>,
) -> Result<Json<JobList>, ApiError> {
    if state.alumni.get(alumni_id)?.is_none() {
        return Err(ApiError::not_found("Alumni not found"));
    }
    Ok(Json(JobList::from(state.jobs.list_by_alumni(alumni_id)?)))
}

/// POST /api/jobs (Admin only)
pub async fn create_job(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<JobInput>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let input = checked_input(input)?;
    if state.alumni.get(input.alumni_id)?.is_none() {
        return Err(unknown_alumni());
    }
    let job = state.jobs.create(&input).map_err(map_store_error)?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(input): ValidJson<JobInput>,
) -> Result<Json<Job>, ApiError> {
    let input = checked_input(input)?;
    let job = find_active(&state, id)?;

    ensure_owner(&state, &claims, job.alumni_id)?;
    // users cannot hand a job over to another alumni record
    if input.alumni_id != job.alumni_id {
        ensure_owner(&state, &claims, input.alumni_id)?;
    }

    state
        .jobs
        .update(id, &input)
        .map_err(map_store_error)?
        .map(Json)
        .ok_or_else(job_not_found)
}

/// DELETE /api/jobs/:id
pub async fn trash_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let job = find_active(&state, id)?;
    ensure_owner(&state, &claims, job.alumni_id)?;

    if !state.jobs.soft_delete(id, &claims.sub)? {
        return Err(job_not_found());
    }
    Ok(Json(json!({ "message": "Job moved to trash", "id": id })))
}

/// PUT /api/jobs/:id/restore
pub async fn restore_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Job>, ApiError> {
    let job = state
        .jobs
        .get(id)?
        .filter(Job::is_trashed)
        .ok_or_else(|| ApiError::not_found("Job not found in trash"))?;
    ensure_owner(&state, &claims, job.alumni_id)?;

    if !state.jobs.restore(id)? {
        return Err(ApiError::not_found("Job not found in trash"));
    }
    Ok(Json(find_active(&state, id)?))
}

/// DELETE /api/jobs/:id/permanent
pub async fn delete_job_permanently(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let job = state.jobs.get(id)?.ok_or_else(job_not_found)?;
    ensure_owner(&state, &claims, job.alumni_id)?;

    if !state.jobs.hard_delete(id)? {
        return Err(job_not_found());
    }
    Ok(Json(json!({ "message": "Job permanently deleted", "id": id })))
}

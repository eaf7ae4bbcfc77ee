//! Alumni API Endpoints
//! Reads are open to any authenticated account; writes are admin only.

use crate::alumni::{
    models::{AlumniWithJobs, CohortSummary},
    Alumni, AlumniInput, AlumniStore, DuplicateAlumni, ALUMNI_SORTABLE,
};
use crate::api::AppState;
use crate::auth::models::{Claims, LinkAlumniRequest, UserResponse};
use crate::error::{ApiError, ValidJson, ValidPath};
use crate::pagination::{ListParams, ListQuery, Paginated};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

fn alumni_not_found() -> ApiError {
    ApiError::not_found("Alumni not found")
}

fn map_store_error(err: anyhow::Error) -> ApiError {
    if err.is::<DuplicateAlumni>() {
        ApiError::Conflict("nim or email already used by another alumni".to_string())
    } else {
        ApiError::Internal(err)
    }
}

fn checked_input(input: AlumniInput) -> Result<AlumniInput, ApiError> {
    let input = input.normalized();
    input.validate().map_err(ApiError::InvalidPayload)?;
    Ok(input)
}

fn find(store: &AlumniStore, id: i64) -> Result<Alumni, ApiError> {
    store.get(id)?.ok_or_else(alumni_not_found)
}

/// GET /api/alumni
pub async fn list_alumni(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Alumni>>, ApiError> {
    let params = ListParams::from_query(&query, &ALUMNI_SORTABLE);
    let (alumni, total) = state.alumni.list(&params)?;
    Ok(Json(Paginated::new(alumni, total, &params)))
}

/// GET /api/alumni/:id
pub async fn get_alumni(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Alumni>, ApiError> {
    Ok(Json(find(&state.alumni, id)?))
}

/// GET /api/alumni/:id/jobs
pub async fn get_alumni_with_jobs(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<AlumniWithJobs>, ApiError> {
    let alumni = find(&state.alumni, id)?;
    let jobs = state.jobs.list_by_alumni(id)?;
    Ok(Json(AlumniWithJobs { alumni, jobs }))
}

/// GET /api/alumni/cohort/:year
pub async fn get_cohort(
    State(state): State<AppState>,
    ValidPath(year): ValidPath<i32>,
) -> Result<Json<CohortSummary>, ApiError> {
    let alumni = state.alumni.list_by_cohort(year)?;
    Ok(Json(CohortSummary {
        cohort_year: year,
        total: alumni.len(),
        alumni,
    }))
}

/// POST /api/alumni (Admin only)
pub async fn create_alumni(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<AlumniInput>,
) -> Result<(StatusCode, Json<Alumni>), ApiError> {
    let input = checked_input(input)?;
    let alumni = state.alumni.create(&input).map_err(map_store_error)?;
    Ok((StatusCode::CREATED, Json(alumni)))
}

/// PUT /api/alumni/:id (Admin only)
pub async fn update_alumni(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(input): ValidJson<AlumniInput>,
) -> Result<Json<Alumni>, ApiError> {
    let input = checked_input(input)?;
    state
        .alumni
        .update(id, &input)
        .map_err(map_store_error)?
        .map(Json)
        .ok_or_else(alumni_not_found)
}

/// DELETE /api/alumni/:id (Admin only)
pub async fn delete_alumni(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.alumni.delete(id)? {
        return Err(alumni_not_found());
    }
    Ok(Json(json!({ "message": "Alumni deleted", "id": id })))
}

/// PUT /api/users/:id/alumni (admin)
///
/// The only way an account gains ownership of an alumni record's jobs.
pub async fn link_user_alumni(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(user_id): ValidPath<String>,
    ValidJson(req): ValidJson<LinkAlumniRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(alumni_id) = req.alumni_id {
        if state.alumni.get(alumni_id)?.is_none() {
            return Err(ApiError::invalid_payload(
                "alumni_id does not reference an existing alumni",
            ));
        }
    }

    let user = state.auth.link_alumni(&user_id, req.alumni_id, &claims)?;
    Ok(Json(user))
}

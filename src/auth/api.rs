//! Authentication API Endpoints
//! Mission: Provide login, registration and user management endpoints

use crate::auth::{
    models::{Claims, CurrentUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    service::AuthService,
    user_store::USER_SORTABLE,
};
use crate::error::{ApiError, ValidJson};
use crate::pagination::{ListParams, ListQuery, Paginated};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(auth): State<Arc<AuthService>>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(auth.login(payload).await?))
}

/// Self-service registration - POST /api/register
pub async fn register(
    State(auth): State<Arc<AuthService>>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = auth.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Create an admin account - POST /api/register-admin (Admin only)
pub async fn register_admin(
    State(auth): State<Arc<AuthService>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = auth.register_admin(payload, &claims).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Get current user info - GET /api/me
/// Built from the token claims alone, no store lookup
pub async fn get_current_user(Extension(claims): Extension<Claims>) -> Json<CurrentUser> {
    Json(CurrentUser::from(&claims))
}

/// List users - GET /api/users (Admin only)
pub async fn list_users(
    State(auth): State<Arc<AuthService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    let params = ListParams::from_query(&query, &USER_SORTABLE);
    let (users, total) = auth.store().list_users(&params)?;

    let page = Paginated::new(users, total, &params).map(|u| UserResponse::from_user(&u));
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;

    #[tokio::test]
    async fn test_current_user_from_claims() {
        let claims = Claims {
            sub: "9".to_string(),
            username: "carol".to_string(),
            role: UserRole::User,
            iat: 100,
            exp: 200,
        };

        let Json(me) = get_current_user(Extension(claims)).await;
        assert_eq!(me.id, "9");
        assert_eq!(me.username, "carol");
        assert_eq!(me.role, UserRole::User);
        assert_eq!(me.expires_at, 200);
    }
}

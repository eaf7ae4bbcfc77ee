//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role checks

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, UserRole},
};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates `Authorization: Bearer <token>`
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        debug!("Rejected {}: missing bearer token", req.uri().path());
        return Err(ApiError::Unauthenticated);
    };

    // The cause stays in the logs; clients only learn to re-authenticate
    let claims = jwt_handler.validate_token(bearer.token()).map_err(|e| {
        debug!("Rejected {}: {}", req.uri().path(), e);
        ApiError::Unauthenticated
    })?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Admin gate. Must sit inside `auth_middleware`; without claims it answers
/// 401, never 403.
pub async fn admin_only(req: Request, next: Next) -> Result<Response, ApiError> {
    let claims = extract_claims(&req).ok_or(ApiError::Unauthenticated)?;

    match claims.role {
        UserRole::Admin => {}
        UserRole::User => {
            debug!(
                "Forbidden {} for {} ({})",
                req.uri().path(),
                claims.username,
                claims.sub
            );
            return Err(ApiError::Forbidden);
        }
    }

    Ok(next.run(req).await)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

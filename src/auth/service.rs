//! Authentication Flow
//! Mission: Turn credentials into session tokens without leaking which part failed

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, LoginRequest, LoginResponse, NewUser, RegisterRequest, UserResponse, UserRole},
    password::PasswordHasher,
    user_store::{DuplicateUser, UserStore},
};
use crate::config::BootstrapAdmin;
use crate::error::ApiError;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

pub const REGISTRATION_CONFLICT: &str = "username or email already registered";

/// Verified against when the identifier is unknown, so both failure paths
/// cost one bcrypt round.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtHandler>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Blocking task failed")
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt: Arc<JwtHandler>,
        hasher: PasswordHasher,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            jwt,
            hasher,
            dummy_hash,
        })
    }

    pub fn jwt(&self) -> &Arc<JwtHandler> {
        &self.jwt
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    async fn verify_password(&self, password: String, password_hash: String) -> Result<bool> {
        let hasher = self.hasher;
        run_blocking(move || hasher.verify(&password, &password_hash)).await
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let identifier = req.username.trim().to_string();
        if identifier.is_empty() || req.password.trim().is_empty() {
            return Err(ApiError::invalid_payload(
                "username and password are required",
            ));
        }

        info!("🔐 Login attempt: {}", identifier);

        let user = match self.store.find_by_identifier(&identifier) {
            Ok(user) => user,
            Err(e) => {
                warn!("User lookup failed for {}: {:#}", identifier, e);
                None
            }
        };

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let valid = self.verify_password(req.password, stored_hash).await?;

        let user = match user {
            Some(user) if valid => user,
            _ => {
                warn!("❌ Failed login attempt: {}", identifier);
                return Err(ApiError::Unauthorized);
            }
        };

        let (token, expires_in) = self.jwt.generate_token(&user)?;

        info!(
            "✅ Login successful: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(LoginResponse {
            user: UserResponse::from_user(&user),
            token,
            expires_in,
        })
    }

    /// Self-service registration; can only ever create unlinked `user` accounts
    pub async fn register_user(&self, req: RegisterRequest) -> Result<UserResponse, ApiError> {
        if let Some(alumni_id) = req.alumni_id {
            warn!(
                "Rejected self-service link of {} to alumni {}",
                req.username.trim(),
                alumni_id
            );
            return Err(ApiError::Forbidden);
        }

        match req.role {
            Some(UserRole::Admin) => {
                warn!(
                    "Rejected self-service admin registration for {}",
                    req.username.trim()
                );
                Err(ApiError::Forbidden)
            }
            Some(UserRole::User) | None => self.register(req, UserRole::User).await,
        }
    }

    /// Admin account creation; the caller must already be an admin
    pub async fn register_admin(
        &self,
        req: RegisterRequest,
        caller: &Claims,
    ) -> Result<UserResponse, ApiError> {
        match caller.role {
            UserRole::Admin => {}
            UserRole::User => return Err(ApiError::Forbidden),
        }

        let created = self.register(req, UserRole::Admin).await?;
        info!(
            "👑 Admin {} created by {} ({})",
            created.username, caller.username, caller.sub
        );
        Ok(created)
    }

    async fn register(&self, req: RegisterRequest, role: UserRole) -> Result<UserResponse, ApiError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_string();

        if username.is_empty() || email.is_empty() || req.password.trim().is_empty() {
            return Err(ApiError::invalid_payload(
                "username, email and password are required",
            ));
        }
        if !email.contains('@') {
            return Err(ApiError::invalid_payload("email is not valid"));
        }
        // Login matches either column, so the namespaces must not overlap
        if username.contains('@') {
            return Err(ApiError::invalid_payload("username must not contain '@'"));
        }

        if self.store.exists_by_username_or_email(&username, &email)? {
            info!("Registration conflict for {} / {}", username, email);
            return Err(ApiError::Conflict(REGISTRATION_CONFLICT.to_string()));
        }

        let hasher = self.hasher;
        let password = req.password;
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        let user = self
            .store
            .create_user(NewUser {
                username,
                email,
                password_hash,
                role,
                alumni_id: None,
            })
            .map_err(|e| {
                if e.is::<DuplicateUser>() {
                    ApiError::Conflict(REGISTRATION_CONFLICT.to_string())
                } else {
                    ApiError::Internal(e)
                }
            })?;

        Ok(UserResponse::from_user(&user))
    }

    /// Point an account at an alumni record, or clear the link with `None`.
    /// The caller checks that the alumni record exists.
    pub fn link_alumni(
        &self,
        user_id: &str,
        alumni_id: Option<i64>,
        caller: &Claims,
    ) -> Result<UserResponse, ApiError> {
        match caller.role {
            UserRole::Admin => {}
            UserRole::User => return Err(ApiError::Forbidden),
        }

        let user = self
            .store
            .set_alumni_id(user_id, alumni_id)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        info!(
            "🔗 {} linked to alumni {:?} by {}",
            user.username, alumni_id, caller.username
        );
        Ok(UserResponse::from_user(&user))
    }

    /// Create the configured admin account when the store has none
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<bool> {
        if self.store.count_admins()? > 0 {
            return Ok(false);
        }

        let req = RegisterRequest {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            alumni_id: None,
            role: Some(UserRole::Admin),
        };

        match self.register(req, UserRole::Admin).await {
            Ok(user) => {
                info!("🔐 Bootstrap admin user created (username: {})", user.username);
                warn!("⚠️  Rotate ADMIN_PASSWORD once a personal admin account exists");
                Ok(true)
            }
            Err(ApiError::Internal(e)) => Err(e),
            Err(e) => anyhow::bail!("Failed to create bootstrap admin: {:?}", e),
        }
    }
}

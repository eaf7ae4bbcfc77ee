//! Process configuration
//!
//! Loaded once at startup from the environment (after `.env`) and command-line
//! flags, then passed by reference. Nothing here is mutated afterwards.

use crate::auth::password::DEFAULT_BCRYPT_COST;
use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "alumni-api")]
#[command(about = "Alumni records API with JWT authentication")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "APP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "alumni.db")]
    pub database_path: String,

    /// Directory where uploaded files are written
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: String,

    /// HMAC secret used to sign tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime in hours
    #[arg(long, env = "JWT_TTL_HOURS", default_value_t = 24,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub jwt_ttl_hours: i64,

    /// bcrypt cost factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    pub bcrypt_cost: u32,

    /// Username of the admin account created when no admin exists
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// Settings consumed by the token handler and the password hasher.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, ttl_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: chrono::Duration::hours(ttl_hours),
            bcrypt_cost,
        }
    }
}

/// Credentials for the first admin account.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.upload_dir.trim().is_empty() {
            bail!("UPLOAD_DIR must not be empty");
        }

        let admin_fields = [
            self.admin_username.is_some(),
            self.admin_email.is_some(),
            self.admin_password.is_some(),
        ];
        if admin_fields.iter().any(|set| *set) && !admin_fields.iter().all(|set| *set) {
            bail!("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together");
        }

        Ok(())
    }

    pub fn auth(&self) -> AuthConfig {
        AuthConfig::new(self.jwt_secret.clone(), self.jwt_ttl_hours, self.bcrypt_cost)
    }

    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        Some(BootstrapAdmin {
            username: self.admin_username.clone()?,
            email: self.admin_email.clone()?,
            password: self.admin_password.clone()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

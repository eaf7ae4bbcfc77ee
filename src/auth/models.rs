//! Authentication Models
//! Mission: Define user credentials, roles and token claims

use serde::{Deserialize, Serialize};

/// Stored user credential.
///
/// `id` is always the string form of the store-native identifier (an SQLite
/// rowid or a generated UUID), so tokens issued from any store look the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub alumni_id: Option<i64>,
    pub created_at: String,
}

/// User roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Admin, // Full access, including account and alumni management
    #[serde(rename = "user")]
    User, // Read access plus jobs of the linked alumni record
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // subject (user id, string form)
    pub username: String,
    pub role: UserRole,
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expiration (unix seconds)
}

/// Fields needed to persist a new credential.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub alumni_id: Option<i64>,
}

/// Login request body. `username` may also carry the email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_in: usize, // seconds until expiration
}

/// Registration request body (self-service and admin creation).
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Refused on self-service registration. Links are set by an admin.
    pub alumni_id: Option<i64>,
    pub role: Option<UserRole>,
}

/// Body of `PUT /api/users/:id/alumni`; `null` clears the link.
#[derive(Debug, Deserialize)]
pub struct LinkAlumniRequest {
    pub alumni_id: Option<i64>,
}

/// User response (sanitized)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub alumni_id: Option<i64>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            alumni_id: user.alumni_id,
            created_at: user.created_at.clone(),
        }
    }
}

/// Identity returned by `GET /api/me`, built from token claims only.
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub expires_at: i64,
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            username: claims.username.clone(),
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_serialization() {
        let admin = UserRole::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let user: UserRole = serde_json::from_str(r#""user""#).unwrap();
        assert_eq!(user, UserRole::User);

        // Unknown roles never deserialize
        assert!(serde_json::from_str::<UserRole>(r#""superuser""#).is_err());
    }

    #[test]
    fn test_user_role_string_conversion() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");

        assert_eq!(UserRole::from_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("USER"), Some(UserRole::User));
        assert_eq!(UserRole::from_str("trader"), None);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: "7".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: UserRole::User,
            alumni_id: Some(3),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], "7");

        let response = serde_json::to_value(UserResponse::from_user(&user)).unwrap();
        assert!(response.get("password_hash").is_none());
        assert_eq!(response["role"], "user");
    }
}

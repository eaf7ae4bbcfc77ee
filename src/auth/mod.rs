//! Authentication Module
//! Mission: Credential verification, JWT sessions and role-based access control

pub mod api;
pub mod jwt;
pub mod memory_store;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod user_store;

pub use jwt::{JwtHandler, TokenError};
pub use memory_store::MemoryUserStore;
pub use middleware::{admin_only, auth_middleware};
pub use password::PasswordHasher;
pub use service::AuthService;
pub use user_store::{SqliteUserStore, UserStore};

#![allow(dead_code)]

use alumni_api::{
    alumni::AlumniStore,
    api::{create_router, AppState},
    auth::{password::MIN_BCRYPT_COST, AuthService, JwtHandler, MemoryUserStore, PasswordHasher},
    config::{AuthConfig, BootstrapAdmin},
    db::Database,
    files::FileStore,
    jobs::JobStore,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_PASSWORD: &str = "admin-pass-123";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub auth: Arc<AuthService>,
    pub files: Arc<FileStore>,
    /// Upload directory; removed when the app is dropped
    pub uploads: TempDir,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(JWT_SECRET, 1, MIN_BCRYPT_COST)
}

pub async fn test_app() -> TestApp {
    let config = auth_config();
    let users = Arc::new(MemoryUserStore::new());
    let jwt = Arc::new(JwtHandler::new(&config).unwrap());
    let hasher = PasswordHasher::new(config.bcrypt_cost).unwrap();
    let auth = Arc::new(AuthService::new(users.clone(), jwt, hasher).unwrap());

    auth.ensure_admin(&BootstrapAdmin {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    })
    .await
    .unwrap();

    let db = Database::open_in_memory().unwrap();
    let uploads = TempDir::new().unwrap();
    let files = Arc::new(FileStore::new(db.clone(), uploads.path()));
    let state = AppState::new(
        auth.clone(),
        Arc::new(AlumniStore::new(db.clone())),
        Arc::new(JobStore::new(db)),
        files.clone(),
    );

    TestApp {
        router: create_router(state),
        users,
        auth,
        files,
        uploads,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(value) => {
                let json = value.to_string().into_bytes();
                self.send_raw(method, uri, token, Some("application/json"), json)
                    .await
            }
            None => self.send_raw(method, uri, token, None, Vec::new()).await,
        }
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let body = Body::from(body);

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn token(&self, username: &str, password: &str) -> String {
        let (status, body) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token("admin", ADMIN_PASSWORD).await
    }

    /// Register a `user` account, let the admin link it to `alumni_id`,
    /// and return its token
    pub async fn user_token(&self, username: &str, alumni_id: Option<i64>) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "user-pass-123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        if let Some(alumni_id) = alumni_id {
            let user_id = body["user"]["id"].as_str().unwrap().to_string();
            let admin = self.admin_token().await;
            let (status, body) = self
                .send(
                    Method::PUT,
                    &format!("/api/users/{}/alumni", user_id),
                    Some(admin.as_str()),
                    Some(json!({ "alumni_id": alumni_id })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "link failed: {}", body);
        }

        self.token(username, "user-pass-123").await
    }
}

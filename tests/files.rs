//! Attachment upload, listing, lookup and deletion through the router.

mod common;

use alumni_api::files::MAX_UPLOAD_BYTES;
use axum::http::{Method, StatusCode};
use common::{test_app, TestApp};
use serde_json::Value;

const BOUNDARY: &str = "alumni-test-boundary";

fn multipart(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: &TestApp,
    token: Option<&str>,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, Value) {
    let content = format!("multipart/form-data; boundary={BOUNDARY}");
    app.send_raw(
        Method::POST,
        "/api/files/upload",
        token,
        Some(content.as_str()),
        multipart("file", file_name, content_type, bytes),
    )
    .await
}

#[tokio::test]
async fn upload_requires_authentication() {
    let app = test_app().await;
    let (status, _) = upload(&app, None, "cv.pdf", "application/pdf", b"%PDF").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/api/files", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_list_get_and_delete() {
    let app = test_app().await;
    let token = app.user_token("vina", None).await;

    let (status, body) = upload(
        &app,
        Some(token.as_str()),
        "cv.pdf",
        "application/pdf",
        b"%PDF-1.7",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["original_name"], "cv.pdf");
    assert_eq!(body["file_type"], "application/pdf");
    assert_eq!(body["file_size"], 8);
    assert!(body.get("file_path").is_none());

    let file_name = body["file_name"].as_str().unwrap().to_string();
    assert!(file_name.ends_with(".pdf"));
    assert_ne!(file_name, "cv.pdf");
    let on_disk = app.uploads.path().join(&file_name);
    assert_eq!(std::fs::read(&on_disk).unwrap(), b"%PDF-1.7");

    let id = body["id"].as_i64().unwrap();

    let (status, list) = app.send(Method::GET, "/api/files", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["id"], id);

    let (status, file) = app
        .send(Method::GET, &format!("/api/files/{}", id), Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(file["file_name"], file_name.as_str());

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/files/{}", id), Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!on_disk.exists());

    let (status, body) = app
        .send(Method::GET, &format!("/api/files/{}", id), Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn upload_rejects_disallowed_types() {
    let app = test_app().await;
    let token = app.user_token("wawan", None).await;

    for content_type in ["image/gif", "text/html", "application/octet-stream"] {
        let (status, body) =
            upload(&app, Some(token.as_str()), "x.bin", content_type, b"data").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", content_type);
        assert_eq!(body["error"], "File type not allowed");
    }

    for (name, content_type) in [
        ("a.jpg", "image/jpg"),
        ("b.jpeg", "image/jpeg"),
        ("c.png", "image/png"),
    ] {
        let (status, _) = upload(&app, Some(token.as_str()), name, content_type, b"img").await;
        assert_eq!(status, StatusCode::CREATED, "{}", content_type);
    }

    let (_, list) = app.send(Method::GET, "/api/files", Some(token.as_str()), None).await;
    assert_eq!(list["total"], 3);
}

#[tokio::test]
async fn upload_enforces_size_cap() {
    let app = test_app().await;
    let token = app.user_token("yuni", None).await;

    let too_big = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let (status, body) = upload(
        &app,
        Some(token.as_str()),
        "big.pdf",
        "application/pdf",
        &too_big,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File size exceeds 10MB");

    let exact = vec![0u8; MAX_UPLOAD_BYTES];
    let (status, body) = upload(
        &app,
        Some(token.as_str()),
        "max.pdf",
        "application/pdf",
        &exact,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["file_size"], MAX_UPLOAD_BYTES);

    assert_eq!(app.files.list().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = test_app().await;
    let token = app.user_token("zaki", None).await;
    let content = format!("multipart/form-data; boundary={BOUNDARY}");

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/api/files/upload",
            Some(token.as_str()),
            Some(content.as_str()),
            multipart("avatar", "a.png", "image/png", b"img"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let (status, _) = app
        .send_raw(
            Method::POST,
            "/api/files/upload",
            Some(token.as_str()),
            Some("application/json"),
            b"{}".to_vec(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_uploader_or_admin_deletes() {
    let app = test_app().await;
    let owner = app.user_token("ayla", None).await;
    let other = app.user_token("bima", None).await;
    let admin = app.admin_token().await;

    let (_, first) = upload(&app, Some(owner.as_str()), "a.png", "image/png", b"a").await;
    let (_, second) = upload(&app, Some(owner.as_str()), "b.png", "image/png", b"b").await;
    let first = first["id"].as_i64().unwrap();
    let second = second["id"].as_i64().unwrap();

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/files/{}", first), Some(other.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/files/{}", first), Some(owner.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/files/{}", second), Some(admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, "/api/files/999", Some(admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

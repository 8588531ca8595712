mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "StudyHub API");
    assert!(body["endpoints"]["ia"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/perfil", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let mut other = app.config.clone();
    other.security.jwt_secret = "some-other-secret".to_string();
    let forged = TestApp::with_config(other).token(Uuid::new_v4());

    let request = Request::get("/api/perfil")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())?;
    let (status, _, _) = app.raw(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn first_profile_access_creates_a_free_student() -> Result<()> {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let (status, body) = app.get("/api/perfil", Some(user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.to_string());
    assert_eq!(body["plano"], "gratuito");
    assert_eq!(body["papel"], "aluno");

    // Second access reads the same row
    let (_, again) = app.get("/api/perfil", Some(user)).await;
    assert_eq!(again["created_at"], body["created_at"]);

    let tables = app.store.snapshot().await;
    assert_eq!(tables.profiles.len(), 1);
    assert_eq!(tables.user_stats.len(), 1);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let request = Request::post("/api/respostas")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(Uuid::new_v4())))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, _, bytes) = app.raw(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_get_the_error_envelope() -> Result<()> {
    let mut config = studyhub_api::config::AppConfig::development();
    config.server.max_request_size_bytes = 16;
    let app = TestApp::with_config(config);
    let token = app.token(Uuid::new_v4());

    let request = Request::post("/api/questoes/hash")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!("{{\"texto\": \"{}\"}}", "a".repeat(64))))?;
    let (status, _, bytes) = app.raw(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let multipart = format!(
        "--limite\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"a.webm\"\r\n\r\n{}\r\n--limite--\r\n",
        "x".repeat(256)
    );
    let request = Request::post("/api/ia/transcricao")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=limite")
        .body(Body::from(multipart))?;
    let (status, _, bytes) = app.raw(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], false);
    Ok(())
}

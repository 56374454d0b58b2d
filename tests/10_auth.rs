mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{error_code, register, send, test_app};

#[tokio::test]
async fn register_returns_session_without_password_hash() -> Result<()> {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "reader@example.com", "password": "Passw0rd!", "displayName": "Reader" })),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["user"]["email"], json!("reader@example.com"));
    assert!(body["data"]["user"].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn login_roundtrip() -> Result<()> {
    let app = test_app();
    register(&app, "reader@example.com").await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "reader@example.com", "password": "Passw0rd!" })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<()> {
    let app = test_app();
    register(&app, "reader@example.com").await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "Reader@Example.com", "password": "Passw0rd!" })),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let app = test_app();
    register(&app, "reader@example.com").await?;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "reader@example.com", "password": "nope-nope" })),
    )
    .await?;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "nope-nope" })),
    )
    .await?;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    Ok(())
}

#[tokio::test]
async fn register_collects_all_violations_at_once() -> Result<()> {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "short" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_INPUT");
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2);
    let fields: Vec<&str> =
        violations.iter().map(|v| v["field"].as_str().unwrap()).collect();
    assert!(fields.contains(&"body.email"));
    assert!(fields.contains(&"body.password"));
    Ok(())
}

#[tokio::test]
async fn whoami_distinguishes_auth_failures() -> Result<()> {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/auth/whoami", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHENTICATED");

    let (status, body) =
        send(&app, Method::GET, "/api/auth/whoami", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "TOKEN_INVALID");

    let token = register(&app, "reader@example.com").await?;
    let (status, body) =
        send(&app, Method::GET, "/api/auth/whoami", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("reader@example.com"));
    Ok(())
}

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("ok"));
    Ok(())
}

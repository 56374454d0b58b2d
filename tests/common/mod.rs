#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use shelf_api::config::AppConfig;
use shelf_api::database::memory::MemoryStore;
use shelf_api::router::app;
use shelf_api::state::{AppState, Stores};

/// A full application over the in-memory store, exercised request by
/// request without binding a socket.
pub fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let stores =
        Stores { users: store.clone(), authors: store.clone(), books: store };
    app(AppState::build(AppConfig::development(), stores))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value =
        if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Register an account and return its bearer token.
pub async fn register(app: &Router, email: &str) -> Result<String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "Passw0rd!" })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
    Ok(body["data"]["token"].as_str().expect("token in register response").to_string())
}

/// Create an author, returning its JSON representation.
pub async fn create_author(
    app: &Router,
    token: &str,
    name: &str,
    bio: Option<&str>,
) -> Result<Value> {
    let mut payload = json!({ "name": name });
    if let Some(bio) = bio {
        payload["bio"] = json!(bio);
    }
    let (status, body) =
        send(app, Method::POST, "/api/authors", Some(token), Some(payload)).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create author failed: {} {}", status, body);
    Ok(body["data"].clone())
}

pub async fn create_book(
    app: &Router,
    token: &str,
    title: &str,
    isbn: Option<&str>,
    author_ids: &[&str],
) -> Result<Value> {
    let mut payload = json!({ "title": title, "authorIds": author_ids });
    if let Some(isbn) = isbn {
        payload["isbn"] = json!(isbn);
    }
    let (status, body) =
        send(app, Method::POST, "/api/books", Some(token), Some(payload)).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create book failed: {} {}", status, body);
    Ok(body["data"].clone())
}

pub fn id_of(resource: &Value) -> String {
    resource["id"].as_str().expect("resource id").to_string()
}

pub fn error_code(body: &Value) -> &str {
    body["code"].as_str().unwrap_or("")
}

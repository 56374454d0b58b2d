mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{create_author, error_code, register, send, test_app};

async fn list(app: &axum::Router, token: &str, query: &str) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, &format!("/api/authors{}", query), Some(token), None).await
}

#[tokio::test]
async fn lists_are_scoped_to_the_caller() -> Result<()> {
    let app = test_app();
    let mine = register(&app, "mine@example.com").await?;
    let theirs = register(&app, "theirs@example.com").await?;

    create_author(&app, &mine, "George Orwell", None).await?;
    create_author(&app, &mine, "Aldous Huxley", None).await?;
    create_author(&app, &theirs, "Ursula K. Le Guin", None).await?;

    let (status, body) = list(&app, &mine, "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["totalItems"], json!(2));

    let (_, body) = list(&app, &theirs, "").await?;
    assert_eq!(body["data"]["meta"]["totalItems"], json!(1));
    Ok(())
}

#[tokio::test]
async fn total_pages_is_the_ceiling_of_total_over_limit() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;
    for name in ["A", "B", "C"] {
        create_author(&app, &token, name, None).await?;
    }

    let (_, body) = list(&app, &token, "?limit=2&page=1").await?;
    let meta = &body["data"]["meta"];
    assert_eq!(meta["totalItems"], json!(3));
    assert_eq!(meta["totalPages"], json!(2));
    assert_eq!(meta["itemCount"], json!(2));
    assert_eq!(meta["currentPage"], json!(1));

    let (_, body) = list(&app, &token, "?limit=2&page=2").await?;
    assert_eq!(body["data"]["meta"]["itemCount"], json!(1));

    // Pages past the end are empty, not an error.
    let (status, body) = list(&app, &token, "?limit=2&page=9").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["itemCount"], json!(0));
    Ok(())
}

#[tokio::test]
async fn sort_by_allow_listed_field() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;
    create_author(&app, &token, "Zadie Smith", None).await?;
    create_author(&app, &token, "Aldous Huxley", None).await?;

    let (_, body) = list(&app, &token, "?sortBy=name:asc").await?;
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Aldous Huxley", "Zadie Smith"]);

    let (_, body) = list(&app, &token, "?sortBy=name:desc").await?;
    assert_eq!(body["data"]["items"][0]["name"], json!("Zadie Smith"));
    Ok(())
}

#[tokio::test]
async fn unknown_sort_falls_back_silently() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;
    create_author(&app, &token, "George Orwell", None).await?;

    // Neither an unknown field nor a bad direction is an error.
    for query in ["?sortBy=passwordHash:asc", "?sortBy=name:sideways", "?sortBy="] {
        let (status, body) = list(&app, &token, query).await?;
        assert_eq!(status, StatusCode::OK, "query {}", query);
        assert_eq!(body["data"]["meta"]["totalItems"], json!(1));
    }
    Ok(())
}

#[tokio::test]
async fn search_matches_name_or_bio_case_insensitively() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;
    create_author(&app, &token, "George Orwell", Some("Dystopias, mostly")).await?;
    create_author(&app, &token, "Jane Austen", Some("Regency novels")).await?;

    let (_, body) = list(&app, &token, "?search=ORWELL").await?;
    assert_eq!(body["data"]["meta"]["totalItems"], json!(1));
    assert_eq!(body["data"]["items"][0]["name"], json!("George Orwell"));

    // Bio column participates in the OR match.
    let (_, body) = list(&app, &token, "?search=dystopia").await?;
    assert_eq!(body["data"]["meta"]["totalItems"], json!(1));

    let (_, body) = list(&app, &token, "?search=zzz").await?;
    assert_eq!(body["data"]["meta"]["totalItems"], json!(0));
    Ok(())
}

#[tokio::test]
async fn limit_is_capped_at_the_configured_maximum() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;
    create_author(&app, &token, "George Orwell", None).await?;

    let (status, body) = list(&app, &token, "?limit=100000").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["itemsPerPage"], json!(100));
    Ok(())
}

#[tokio::test]
async fn non_positive_page_is_a_field_error() -> Result<()> {
    let app = test_app();
    let token = register(&app, "reader@example.com").await?;

    let (status, body) = list(&app, &token, "?page=0").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_INPUT");
    assert_eq!(body["violations"][0]["field"], json!("query.page"));
    Ok(())
}

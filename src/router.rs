//! Route table. Public routes first, then the `/api` tree behind the
//! authentication middleware.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .merge(api_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        .route("/api/authors", get(handlers::authors::list).post(handlers::authors::create))
        .route(
            "/api/authors/:id",
            get(handlers::authors::get)
                .patch(handlers::authors::update)
                .delete(handlers::authors::delete),
        )
        .route(
            "/api/authors/:id/favorite",
            post(handlers::favorites::add_author).delete(handlers::favorites::remove_author),
        )
        .route("/api/books", get(handlers::books::list).post(handlers::books::create))
        .route(
            "/api/books/:id",
            get(handlers::books::get)
                .patch(handlers::books::update)
                .delete(handlers::books::delete),
        )
        .route(
            "/api/books/:id/favorite",
            post(handlers::favorites::add_book).delete(handlers::favorites::remove_book),
        )
        .route("/api/favorites/authors", get(handlers::favorites::list_authors))
        .route("/api/favorites/books", get(handlers::favorites::list_books))
        .layer(from_fn_with_state(state, require_auth))
}

async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "data": {
            "name": "Shelf API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/register, /auth/login (public), /api/auth/whoami",
                "authors": "/api/authors[/:id]",
                "books": "/api/books[/:id]",
                "favorites": "/api/{authors,books}/:id/favorite, /api/favorites/{authors,books}",
                "health": "/health (public)"
            }
        }
    }))
}

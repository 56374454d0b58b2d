use std::sync::Arc;

use shelf_api::config::AppConfig;
use shelf_api::database::memory::MemoryStore;
use shelf_api::database::postgres::PgStore;
use shelf_api::router::app;
use shelf_api::state::{AppState, Stores};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("starting shelf-api in {:?} mode", config.environment);

    let stores = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = Arc::new(
                PgStore::connect(&url).await.unwrap_or_else(|e| panic!("database connect: {}", e)),
            );
            Stores { users: store.clone(), authors: store.clone(), books: store }
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using volatile in-memory store");
            let store = Arc::new(MemoryStore::new());
            Stores { users: store.clone(), authors: store.clone(), books: store }
        }
    };

    let state = AppState::build(config, stores);

    // Allow tests or deployments to override port via env
    let port = std::env::var("SHELF_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.expect("server");
}

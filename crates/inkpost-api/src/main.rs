// Inkpost API server

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use inkpost_api::{auth::AuthConfig, build_router, config::ServerConfig, AppState};
use inkpost_storage::StorageBackend;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpost_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("inkpost-api starting...");

    let config = ServerConfig::from_env();

    // Initialize storage
    let db = match &config.database_url {
        Some(url) => {
            let backend = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            backend.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Connected to database");
            backend
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (dev mode)");
            StorageBackend::in_memory()
        }
    };

    let auth_config = AuthConfig::from_env(config.is_dev_mode());
    let state = AppState::new(db, auth_config);

    let cors_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    let mut app = build_router(state);

    // Add CORS layer only if origins are configured
    if !cors_origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        );
    }

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

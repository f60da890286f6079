//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{HeaderName, Method, header},
};
use kernel::error::app_error::AppError;
use nsfw::{InMemoryNsfwRepository, NsfwConfig, StubClassifier, nsfw_router};
use platform::client::USER_ID_HEADER;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 31113;
const DEFAULT_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,nsfw=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Gate configuration
    let nsfw_config = NsfwConfig::from_env();
    tracing::info!(
        max_image_size_mb = nsfw_config.max_image_size_mb,
        confidence_threshold = nsfw_config.confidence_threshold,
        rate_limit_max_requests = nsfw_config.rate_limit_max_requests,
        rate_limit_window_secs = nsfw_config.rate_limit_window.as_secs(),
        enforce_max_dimension = nsfw_config.enforce_max_dimension,
        "Image validation gate configured"
    );

    let nsfw_store = InMemoryNsfwRepository::from_config(&nsfw_config);

    // Periodic cleanup: drop expired rate limit windows
    let sweep_secs = env::var("RATE_LIMIT_SWEEP_SECS")
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_SWEEP_SECS);
    let store_for_sweep = nsfw_store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_secs));
        loop {
            interval.tick().await;
            let removed = store_for_sweep.sweep_rate_limits().await;
            if removed > 0 {
                tracing::info!(
                    windows_removed = removed,
                    "Rate limit cleanup completed"
                );
            }
        }
    });

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ]))
        .expose_headers([header::RETRY_AFTER])
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/nsfw-check",
            nsfw_router(nsfw_store, Arc::new(StubClassifier::default()), nsfw_config),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}

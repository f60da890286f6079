//! Gate Router

use crate::application::config::NsfwConfig;
use crate::domain::classifier::ContentClassifier;
use crate::domain::repository::{AuditLogRepository, RateLimitRepository};
use crate::error::NsfwError;
use crate::infra::memory::InMemoryNsfwRepository;
use crate::presentation::handlers::{self, NsfwAppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kernel::error::app_error::AppError;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Create the gate router with the in-memory repository
pub fn nsfw_router(
    repo: InMemoryNsfwRepository,
    classifier: Arc<dyn ContentClassifier>,
    config: NsfwConfig,
) -> Router {
    nsfw_router_generic(repo, classifier, config)
}

/// Create a generic gate router for any repository implementation
pub fn nsfw_router_generic<R>(
    repo: R,
    classifier: Arc<dyn ContentClassifier>,
    config: NsfwConfig,
) -> Router
where
    R: AuditLogRepository + RateLimitRepository + Clone + Send + Sync + 'static,
{
    let body_limit = config.request_body_limit_bytes();
    let state = NsfwAppState {
        repo: Arc::new(repo),
        classifier,
        config: Arc::new(config),
    };

    Router::new()
        .route("/", post(handlers::check_image::<R>))
        .route("/stats", get(handlers::stats::<R>))
        .route("/audit-logs", get(handlers::audit_logs::<R>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Image check handler panicked");
    AppError::from(NsfwError::Internal("handler panicked".to_string())).into_response()
}

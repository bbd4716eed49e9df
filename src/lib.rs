pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod sanitize;
pub mod state;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::ApiError;
use crate::handlers::{
    chat_handler, chat_stream_handler, config_handler, health_handler, metrics_handler, not_found,
};
use crate::state::AppState;

// creating the router with routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let development = state.development;
    let routes = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", post(chat_stream_handler))
        .route("/api/config", get(config_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    apply_middleware(routes, development)
}

// 404 fallback, panic capture, tracing and CORS for every route in `router`
pub fn apply_middleware(router: Router, development: bool) -> Router {
    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, development),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, development: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()));
    error!(panic = detail.as_deref().unwrap_or("<non-string payload>"), "Handler panicked");

    let message = match detail {
        Some(detail) if development => detail,
        _ => "An unexpected error occurred".to_string(),
    };
    ApiError::Internal(message).into_response()
}

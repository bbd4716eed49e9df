use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::MAX_MESSAGE_LENGTH;
use crate::error::ApiError;
use crate::handlers::ClientId;
use crate::metrics::{
    RATE_LIMIT_CLIENTS, RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_FAILURES,
};
use crate::models::{ChatRequest, ChatResponse, unix_timestamp};
use crate::sanitize;
use crate::state::AppState;

// Rate limit check function
fn check_rate_limit(state: &AppState, client: &str) -> Result<(), ApiError> {
    let admitted = state.rate_limiter.admit(client);
    RATE_LIMIT_CLIENTS.set(state.rate_limiter.tracked_clients() as f64);
    if admitted {
        return Ok(());
    }

    RATE_LIMITED.inc();
    warn!(client, "Rate limit exceeded");
    Err(ApiError::RateLimitExceeded {
        max_requests: state.rate_limiter.max_requests(),
        window_secs: state.rate_limiter.window().as_secs(),
    })
}

// Pull `message` out of the raw body, trimmed and within length
fn parse_message(body: &[u8]) -> Result<String, ApiError> {
    let message = serde_json::from_slice::<ChatRequest>(body)
        .ok()
        .and_then(|req| req.message)
        .ok_or_else(ApiError::missing_message)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::empty_message());
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::message_too_long());
    }

    Ok(message.to_string())
}

async fn process_chat(state: &AppState, client: &str, body: &[u8]) -> Result<ChatResponse, ApiError> {
    REQUEST_TOTAL.inc();
    check_rate_limit(state, client)?;

    let start_time = Instant::now();
    let message = parse_message(body)?;
    let upstream = state.upstream.as_ref().ok_or(ApiError::Configuration)?;

    let preview: String = message.chars().take(50).collect();
    info!(client, "Processing message: {}...", preview);

    let generated = upstream.generate(&message).await.inspect_err(|e| {
        UPSTREAM_FAILURES.inc();
        warn!(client, error = %e, "Chat request failed upstream");
    })?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    info!(client, "Response generated successfully");

    Ok(ChatResponse {
        response: sanitize::clean(&generated),
        timestamp: unix_timestamp(),
        streaming: None,
    })
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ClientId(client): ClientId,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    process_chat(&state, &client, &body).await.map(Json)
}

// Same contract as chat_handler; the reply is delivered whole and marked as such
pub async fn chat_stream_handler(
    State(state): State<Arc<AppState>>,
    ClientId(client): ClientId,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut response = process_chat(&state, &client, &body).await?;
    response.streaming = Some(false);
    Ok(Json(response))
}

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::config::MAX_MESSAGE_LENGTH;
use crate::models::{ConfigResponse, Features, RateLimitInfo};
use crate::state::AppState;

// Limits and feature flags for front-end clients
pub async fn config_handler(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        max_message_length: MAX_MESSAGE_LENGTH,
        rate_limit: RateLimitInfo {
            requests: state.rate_limiter.max_requests(),
            window: state.rate_limiter.window().as_secs(),
        },
        features: Features::default(),
    })
}

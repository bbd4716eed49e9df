use axum::{Json, extract::State};
use std::sync::Arc;

use crate::models::{HealthResponse, unix_timestamp};
use crate::state::AppState;

// health handler, never rate limited
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: unix_timestamp(),
        api_configured: state.api_configured(),
    })
}

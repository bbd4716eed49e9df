mod chat;
mod config;
mod health;
mod metrics;

pub use chat::{chat_handler, chat_stream_handler};
pub use config::config_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::error::ApiError;

// Rate-limit key: peer IP, "unknown" without connect info
pub struct ClientId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(id))
    }
}

// fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

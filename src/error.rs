use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

// upstream client failures
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Invalid request. Please check your message.")]
    InvalidRequest,

    #[error("Invalid API key configuration.")]
    Unauthorized,

    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitedUpstream,

    #[error("API Error: {message}")]
    Upstream { status: u16, message: String },

    #[error("No response generated")]
    EmptyGeneration,

    #[error("Network error. Please check your connection.")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("Maximum retry attempts exceeded")]
    RetriesExhausted,
}

// handler errors, rendered as {error, message}
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        error: &'static str,
        message: &'static str,
    },

    #[error("Maximum {max_requests} requests per {window_secs} seconds")]
    RateLimitExceeded {
        max_requests: usize,
        window_secs: u64,
    },

    #[error("API key not configured")]
    Configuration,

    #[error(transparent)]
    Upstream(#[from] GenerateError),

    #[error("The requested endpoint does not exist")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_message() -> Self {
        Self::Validation {
            error: "Invalid request",
            message: "Missing message field",
        }
    }

    pub fn empty_message() -> Self {
        Self::Validation {
            error: "Invalid request",
            message: "Message cannot be empty",
        }
    }

    pub fn message_too_long() -> Self {
        Self::Validation {
            error: "Message too long",
            message: "Please keep messages under 1000 characters",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Configuration | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Validation { error, .. } => *error,
            Self::RateLimitExceeded { .. } => "Rate limit exceeded",
            Self::Configuration => "Configuration error",
            Self::NotFound => "Not found",
            Self::Upstream(_) | Self::Internal(_) => "Internal server error",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.label(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

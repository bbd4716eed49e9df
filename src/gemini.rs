use anyhow::Context;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::GenerateError;
use crate::metrics::{UPSTREAM_ATTEMPTS, UPSTREAM_RETRIES};
use crate::models::{GeneratePayload, GenerateResult, UpstreamErrorBody};

// base_delay * 2^attempt, attempt zero-indexed
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

// Why a single attempt failed; only Overloaded and Network are retried
enum AttemptError {
    Fatal(GenerateError),
    Overloaded,
    Network(reqwest::Error),
}

// Gemini generateContent client; retries 503s and network errors
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    policy: RetryPolicy,
}

impl GeminiClient {
    // The key travels as a query parameter, so it is baked into the endpoint once
    pub fn new(
        http: reqwest::Client,
        api_url: &str,
        api_key: &str,
        policy: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse_with_params(api_url, &[("key", api_key)])
            .with_context(|| format!("invalid upstream url {api_url}"))?;
        Ok(Self {
            http,
            endpoint,
            policy,
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let payload = GeneratePayload::new(prompt);
        let total = self.policy.total_attempts();

        for attempt in 0..total {
            UPSTREAM_ATTEMPTS.inc();

            let failure = match self.send_once(&payload).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::Fatal(fatal)) => {
                    error!(error = %fatal, attempt, "Upstream request failed");
                    return Err(fatal);
                }
                Err(failure) => failure,
            };

            if attempt + 1 >= total {
                return Err(match failure {
                    AttemptError::Network(source) => {
                        error!(error = %source, attempts = total, "Upstream unreachable");
                        GenerateError::Network { source }
                    }
                    _ => {
                        error!(attempts = total, "Upstream still overloaded");
                        GenerateError::RetriesExhausted
                    }
                });
            }

            let delay = self.policy.delay_for(attempt);
            match &failure {
                AttemptError::Network(e) => warn!(
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    attempt = attempt + 1,
                    max_retries = self.policy.max_retries,
                    "Network error, retrying"
                ),
                _ => warn!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = attempt + 1,
                    max_retries = self.policy.max_retries,
                    "Upstream overloaded (503), retrying"
                ),
            }
            UPSTREAM_RETRIES.inc();
            tokio::time::sleep(delay).await;
        }

        Err(GenerateError::RetriesExhausted)
    }

    async fn send_once(&self, payload: &GeneratePayload) -> Result<String, AttemptError> {
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(AttemptError::Network)?;

        let status = res.status();
        debug!(status = status.as_u16(), "Upstream responded");

        match status {
            StatusCode::OK => {
                // a timeout or reset mid-body is a network failure, not an empty reply
                let bytes = res.bytes().await.map_err(AttemptError::Network)?;
                serde_json::from_slice::<GenerateResult>(&bytes)
                    .ok()
                    .and_then(GenerateResult::first_text)
                    .ok_or(AttemptError::Fatal(GenerateError::EmptyGeneration))
            }
            StatusCode::SERVICE_UNAVAILABLE => Err(AttemptError::Overloaded),
            StatusCode::BAD_REQUEST => Err(AttemptError::Fatal(GenerateError::InvalidRequest)),
            StatusCode::UNAUTHORIZED => Err(AttemptError::Fatal(GenerateError::Unauthorized)),
            StatusCode::TOO_MANY_REQUESTS => Err(AttemptError::Fatal(GenerateError::RateLimitedUpstream)),
            other => {
                let message = res
                    .json::<UpstreamErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.error.message)
                    .unwrap_or_else(|| format!("HTTP {}", other.as_u16()));
                Err(AttemptError::Fatal(GenerateError::Upstream {
                    status: other.as_u16(),
                    message,
                }))
            }
        }
    }
}

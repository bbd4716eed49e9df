use std::time::Duration;

use crate::config::Args;
use crate::gemini::{GeminiClient, RetryPolicy};
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub upstream: Option<GeminiClient>, // None when no usable API key is configured
    pub rate_limiter: RateLimiter,
    pub development: bool,
}

impl AppState {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let rate_window = Duration::from_secs(args.rate_window);
        Self::with_rate_limiter(args, RateLimiter::new(args.rate_limit, rate_window))
    }

    pub fn with_rate_limiter(args: &Args, rate_limiter: RateLimiter) -> anyhow::Result<Self> {
        let upstream = match args.api_key.as_deref() {
            Some(key) if args.api_configured() => {
                let http = reqwest::Client::builder()
                    .timeout(Duration::from_secs(args.request_timeout))
                    .build()?;
                let policy = RetryPolicy {
                    max_retries: args.max_retries,
                    base_delay: Duration::from_millis(args.retry_base_delay_ms),
                };
                Some(GeminiClient::new(http, &args.api_url, key, policy)?)
            }
            _ => None,
        };

        Ok(Self {
            upstream,
            rate_limiter,
            development: args.is_development(),
        })
    }

    pub fn api_configured(&self) -> bool {
        self.upstream.is_some()
    }
}

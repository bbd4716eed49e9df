use clap::Parser;

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";

// Value shipped in sample .env files; treated the same as no key at all
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

pub const MAX_MESSAGE_LENGTH: usize = 1000;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-relay")]
#[command(about = "Rate limited chat relay in front of the Gemini API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // Gemini API key, passed upstream as ?key=
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Generation endpoint
    #[arg(long, env = "GEMINI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    // Rate limit max requests per window (per client)
    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value_t = 60)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Retries after the first upstream attempt
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    // Backoff base, doubled on every retry
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value_t = 1000)]
    pub retry_base_delay_ms: u64,

    // Upstream request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    // "development" exposes panic details in 500 bodies
    #[arg(long, env = "APP_ENV", default_value = "production")]
    pub environment: String,
}

impl Args {
    pub fn api_configured(&self) -> bool {
        matches!(
            self.api_key.as_deref(),
            Some(key) if !key.is_empty() && key != PLACEHOLDER_API_KEY
        )
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            port: 5000,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            rate_limit: 60,
            rate_window: 60,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            request_timeout: 30,
            environment: "production".to_string(),
        }
    }
}

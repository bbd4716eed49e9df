use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("relay_chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("relay_rate_limited_total", "Chat requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ATTEMPTS: Counter =
        register_counter!("relay_upstream_attempts_total", "Upstream generate calls, retries included").unwrap();
    pub static ref UPSTREAM_RETRIES: Counter =
        register_counter!("relay_upstream_retries_total", "Upstream calls retried after backoff").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("relay_upstream_failures_total", "Chat requests that ended in an upstream error").unwrap();
    pub static ref RATE_LIMIT_CLIENTS: Gauge =
        register_gauge!("relay_rate_limit_clients", "Clients tracked by the rate limiter").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "relay_request_latency_seconds",
        "Chat request latency in seconds"
    )
    .unwrap();
}

// Render everything in the default registry in text exposition format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

use serde::{Deserialize, Serialize};

// Inbound chat body. `message` stays optional so a missing field is a 400, not a rejection
#[derive(Deserialize, Debug, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

// Chat reply; `streaming` is only set by the stream endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: f64,
    pub api_configured: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConfigResponse {
    pub max_message_length: usize,
    pub rate_limit: RateLimitInfo,
    pub features: Features,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RateLimitInfo {
    pub requests: usize,
    pub window: u64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Features {
    pub streaming: bool,
    pub file_upload: bool,
    pub image_generation: bool,
}

// Gemini generateContent request format
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GeneratePayload {
    pub fn new(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

// Gemini generateContent response format (only the parts we read)
#[derive(Deserialize, Debug, Default)]
pub struct GenerateResult {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResult {
    // Text of the first part of the first candidate, if there is any
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
    pub content: Option<Content>,
}

// Gemini error body: {"error": {"message": "..."}}
#[derive(Deserialize, Debug)]
pub struct UpstreamErrorBody {
    pub error: UpstreamErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct UpstreamErrorDetail {
    pub message: Option<String>,
}

pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

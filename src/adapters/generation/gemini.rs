//! Gemini `generateContent` adapter.
//!
//! The API key travels in the `x-goog-api-key` header and never appears in
//! the request URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::errors::{GenerationError, RagResult};
use crate::domain::models::GenerationConfig;
use crate::domain::ports::GenerationProvider;
use crate::infrastructure::logging::scrub_secrets;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generation provider backed by the Gemini `generateContent` API.
pub struct GeminiGenerationProvider {
    config: GenerationConfig,
    api_key: String,
    client: Client,
    request_timeout: Duration,
}

impl GeminiGenerationProvider {
    /// Build a provider. The API key comes from the config or `GEMINI_API_KEY`.
    pub fn new(config: GenerationConfig, request_timeout: Duration) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Configuration(format!(
                    "Gemini API key not set. Set {API_KEY_ENV} or configure generation.api_key."
                ))
            })?;

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GenerationError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key,
            client,
            request_timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.request_timeout)
                } else {
                    GenerationError::Transport(scrub_secrets(&e.to_string()))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(scrub_secrets(&e.to_string())))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .filter(|message| !message.is_empty())
                .unwrap_or(text);
            let message = scrub_secrets(&message);
            warn!(status = status.as_u16(), error = %message, "Generation request failed");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        extract_text(&text)
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a success body.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let block_reason = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone());

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| match block_reason {
            Some(reason) => GenerationError::MalformedResponse(format!("prompt blocked: {reason}")),
            None => GenerationError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string()),
        })
}

#[async_trait]
impl GenerationProvider for GeminiGenerationProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> RagResult<String> {
        debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "Requesting generation");
        Ok(self.send(prompt).await?)
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

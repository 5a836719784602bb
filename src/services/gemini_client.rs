//! Google Generative Language API client (API key based).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::DispatchError;
use crate::services::dispatcher::TextGenerator;

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
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
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, DispatchError> {
        Self::new(
            config.api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, parts: &[String]) -> Result<String, DispatchError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: parts
                    .iter()
                    .map(|text| RequestPart { text: text.as_str() })
                    .collect(),
            }],
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "generateContent returned"
        );

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &text, retry_after));
        }

        let payload: GenerateContentResponse = response.json().await?;
        response_text(payload)
    }
}

fn response_text(payload: GenerateContentResponse) -> Result<String, DispatchError> {
    if let Some(reason) = payload.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(DispatchError::InvalidResponse(format!("prompt blocked: {}", reason)));
    }

    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| DispatchError::InvalidResponse("no candidates returned".to_string()))?;

    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if texts.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(DispatchError::InvalidResponse(format!(
            "candidate has no text (finish reason: {})",
            reason
        )));
    }

    Ok(texts.concat())
}

/// Maps a non-success HTTP status and body to a dispatch error.
///
/// The API answers an unknown key with 400 and an `API_KEY_INVALID` reason,
/// which is an authentication failure rather than a bad request.
pub fn classify_failure(status: u16, body: &str, retry_after: Option<Duration>) -> DispatchError {
    let message = error_message(body);
    match status {
        429 => DispatchError::RateLimited { retry_after },
        401 | 403 => DispatchError::Unauthorized { status, message },
        400 if body.contains("API_KEY_INVALID") => DispatchError::Unauthorized { status, message },
        408 | 500..=599 => DispatchError::Unavailable { status, message },
        _ => DispatchError::InvalidRequest { status, message },
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

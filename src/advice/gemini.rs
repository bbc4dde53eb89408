//! Google Gemini `generateContent` client.

use serde::{Deserialize, Serialize};

use super::AdviceService;
use crate::config::AdviceConfig;
use crate::error::AdviceError;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub(crate) struct GeminiClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub(crate) fn new(config: &AdviceConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(config.timeout())
            .build()
            .new_agent();
        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: config.api_key(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl AdviceService for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdviceError::MissingApiKey(self.api_key_env.clone()))?;

        let body = request_body(prompt)?;
        tracing::debug!(model = %self.model, "POST generateContent");
        let mut response = self
            .agent
            .post(&self.url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .send(body)?;
        let text = response.body_mut().read_to_string()?;
        Ok(extract_text(&text)?)
    }
}

pub(crate) fn request_body(prompt: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
    })
}

/// Concatenate the text parts of the first candidate. Missing pieces yield `""`.
pub(crate) fn extract_text(body: &str) -> Result<String, serde_json::Error> {
    let data: GenerateContentResponse = serde_json::from_str(body)?;
    Ok(data
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .map(|parts| parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default())
}

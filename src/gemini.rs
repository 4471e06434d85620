//! Client for Google's Gemini `generateContent` API.
//!
//! The fixed system instruction rides along on every request; the session
//! loop only ever supplies the newest user message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::constants;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited by the Gemini API")]
    RateLimited,

    #[error("reply blocked by the content filter")]
    ContentFiltered,

    #[error("model returned no reply text")]
    EmptyReply,

    #[error("failed to parse Gemini response: {0}")]
    InvalidResponse(String),
}

/// Seam between the chat session and the remote model, so the session loop
/// and its tests never touch the network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.api_base, self.model, method, self.api_key
        )
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_content(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: constants::SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "Gemini API request failed");
            if status.as_u16() == 429 {
                return Err(GenerateError::RateLimited);
            }
            return Err(GenerateError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        reply_text(api_response)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.generate_content(prompt).await
    }
}

/// Pull the reply text out of a parsed response, trimmed.
fn reply_text(response: GenerateContentResponse) -> Result<String, GenerateError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerateError::EmptyReply)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(GenerateError::ContentFiltered);
    }

    let text = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerateError::EmptyReply);
    }
    Ok(text.to_string())
}

// Structures matching the Gemini v1beta generateContent endpoint.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_and_trims_candidate_text() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"  Hi "},{"text":"there\n"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(reply_text(response).unwrap(), "Hi there");
    }

    #[test]
    fn no_candidates_is_an_empty_reply() {
        let response = parse(r#"{"candidates":[]}"#);
        assert!(matches!(reply_text(response), Err(GenerateError::EmptyReply)));
    }

    #[test]
    fn whitespace_only_text_is_an_empty_reply() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]},"finishReason":"STOP"}]}"#,
        );
        assert!(matches!(reply_text(response), Err(GenerateError::EmptyReply)));
    }

    #[test]
    fn safety_finish_reason_is_content_filtered() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            reply_text(response),
            Err(GenerateError::ContentFiltered)
        ));
    }

    #[test]
    fn request_body_uses_gemini_field_names() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: "be brief".to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: "Hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
    }
}

//! Gemini HTTP client with rate limiting

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationSettings, Part};
use crate::providers::{invalid_response, send_json, RequestThrottle};
use crate::{ChatModel, CompletionRequest};
use async_trait::async_trait;
use mindcanvas_core::{CanvasResult, ChatRole};
use reqwest::Client;

const PROVIDER: &str = "gemini";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    throttle: RequestThrottle,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    /// * `api_key` - Google AI Studio API key
    /// * `model` - Model name (e.g., "gemini-2.0-flash-exp")
    /// * `requests_per_minute` - Maximum requests per minute
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: model.into(),
            throttle: RequestThrottle::new(requests_per_minute),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Map a neutral request onto Gemini's wire shape. The assistant role is "model".
    pub fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: request.system.as_ref().map(|system| Content {
                role: None,
                parts: vec![Part {
                    text: system.clone(),
                }],
            }),
            generation_config: GenerationSettings {
                temperature: request.temperature,
            },
        }
    }

    /// Text of the first candidate, parts joined.
    pub fn extract_text(response: GenerateContentResponse) -> CanvasResult<String> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| invalid_response(PROVIDER, "No candidate in response"))?;

        Ok(content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn provider_id(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> CanvasResult<String> {
        let _permit = self.throttle.acquire(PROVIDER).await?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let builder = self.client.post(&url).header("x-goog-api-key", &self.api_key);
        let response: GenerateContentResponse =
            send_json(PROVIDER, builder, &Self::build_request(&request)).await?;

        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                provider = PROVIDER,
                model = %self.model,
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                "Gemini completion finished"
            );
        }

        Self::extract_text(response)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::ChatTurn;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            system: Some("be nice".to_string()),
            turns: vec![ChatTurn::user("q1"), ChatTurn::assistant("a1"), ChatTurn::user("q2")],
            temperature: 0.7,
        }
    }

    #[test]
    fn test_build_request_maps_roles_and_system() {
        let body = serde_json::to_value(GeminiClient::build_request(&sample_request())).unwrap();
        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be nice");
        assert!(body["systemInstruction"].get("role").is_none());
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_build_request_omits_missing_system() {
        let request = CompletionRequest {
            system: None,
            ..sample_request()
        };
        let body = serde_json::to_value(GeminiClient::build_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "🌿 "}, {"text": "Leaves"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response).unwrap(), "🌿 Leaves");
    }

    #[test]
    fn test_extract_text_without_candidates_is_invalid() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(GeminiClient::extract_text(response).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiClient::new("secret-key", DEFAULT_GEMINI_MODEL, 60);
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}

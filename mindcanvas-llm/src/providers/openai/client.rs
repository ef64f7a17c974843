//! OpenAI HTTP client with rate limiting

use super::types::{CompletionRequest as ChatCompletionRequest, CompletionResponse, Message};
use crate::providers::{invalid_response, send_json, RequestThrottle};
use crate::{ChatModel, CompletionRequest};
use async_trait::async_trait;
use mindcanvas_core::CanvasResult;
use reqwest::Client;

const PROVIDER: &str = "openai";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions client.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    throttle: RequestThrottle,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (e.g., "gpt-4o-mini", "gpt-4o")
    /// * `requests_per_minute` - Maximum requests per minute
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
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

    /// System instruction first, then the turns in order.
    pub fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if let Some(system) = &request.system {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.turns.iter().map(|turn| Message {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(request.temperature),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    fn provider_id(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> CanvasResult<String> {
        let _permit = self.throttle.acquire(PROVIDER).await?;

        let url = format!("{}/chat/completions", self.base_url);
        let builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let response: CompletionResponse =
            send_json(PROVIDER, builder, &self.build_request(&request)).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                provider = PROVIDER,
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "OpenAI completion finished"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| invalid_response(PROVIDER, "No completion in response"))
    }
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

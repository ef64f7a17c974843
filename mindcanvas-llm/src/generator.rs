//! Shared prompting and fallback behavior for every provider.

use crate::prompts::{
    fallback_finalization, finalization_prompt, parse_finalization, title_prompt,
    CHAT_SYSTEM_PROMPT, CHAT_TEMPERATURE, FALLBACK_CHAT_RESPONSE, FALLBACK_TITLE,
    FINALIZATION_TEMPERATURE, TITLE_TEMPERATURE,
};
use crate::{ChatModel, CompletionRequest, GenerationService};
use async_trait::async_trait;
use mindcanvas_core::{CanvasError, CanvasResult, ChatTurn, Finalization, LlmError};
use std::time::Duration;

/// Turns a raw [`ChatModel`] into a [`GenerationService`].
///
/// Each operation makes exactly one completion call. Errors, timeouts and
/// empty completions are logged and replaced by fixed fallback values.
pub struct PromptedGenerator<M> {
    model: M,
    timeout: Option<Duration>,
}

impl<M: ChatModel> PromptedGenerator<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            timeout: None,
        }
    }

    /// Bound every completion call. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> CanvasResult<String> {
        let provider = self.model.provider_id();
        let pending = self.model.complete(request);

        let text = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                CanvasError::from(LlmError::Timeout {
                    provider: provider.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                })
            })??,
            None => pending.await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: provider.to_string(),
                reason: "empty completion".to_string(),
            }
            .into());
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl<M: ChatModel> GenerationService for PromptedGenerator<M> {
    fn provider_id(&self) -> &str {
        self.model.provider_id()
    }

    async fn generate_title(&self, text: &str) -> String {
        let request = CompletionRequest {
            system: None,
            turns: vec![ChatTurn::user(title_prompt(text))],
            temperature: TITLE_TEMPERATURE,
        };

        match self.complete(request).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!(
                    provider = self.model.provider_id(),
                    error = %e,
                    "Title generation failed, using fallback"
                );
                FALLBACK_TITLE.to_string()
            }
        }
    }

    async fn generate_chat_response(&self, message: &str, history: Option<&[ChatTurn]>) -> String {
        let mut turns: Vec<ChatTurn> = history.map(<[ChatTurn]>::to_vec).unwrap_or_default();
        turns.push(ChatTurn::user(message));

        let request = CompletionRequest {
            system: Some(CHAT_SYSTEM_PROMPT.to_string()),
            turns,
            temperature: CHAT_TEMPERATURE,
        };

        match self.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    provider = self.model.provider_id(),
                    error = %e,
                    "Chat generation failed, using fallback"
                );
                FALLBACK_CHAT_RESPONSE.to_string()
            }
        }
    }

    async fn generate_finalization(&self, history: &[ChatTurn]) -> Finalization {
        let request = CompletionRequest {
            system: None,
            turns: vec![ChatTurn::user(finalization_prompt(history))],
            temperature: FINALIZATION_TEMPERATURE,
        };

        match self.complete(request).await {
            Ok(raw) => parse_finalization(&raw),
            Err(e) => {
                tracing::warn!(
                    provider = self.model.provider_id(),
                    error = %e,
                    "Finalization failed, using fallback"
                );
                fallback_finalization()
            }
        }
    }
}

impl<M: ChatModel> std::fmt::Debug for PromptedGenerator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptedGenerator")
            .field("provider", &self.model.provider_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}

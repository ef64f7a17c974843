//! MindCanvas LLM - Generation Service
//!
//! Provider-agnostic contract for the three generation operations every block
//! operation depends on: titles, chat replies, and finalization.
//!
//! Layering:
//! - [`ChatModel`] is the raw completion seam. Provider clients (Gemini, OpenAI)
//!   implement it and may fail.
//! - [`PromptedGenerator`] owns the prompt templates, the optional timeout and the
//!   fallback values. It turns any `ChatModel` into a [`GenerationService`].
//! - [`GenerationService`] never fails: callers always receive a usable value.

pub mod config;
pub mod generator;
pub mod prompts;
pub mod providers;

pub use config::{build_generation_service, GenerationConfig, ProviderKind};
pub use generator::PromptedGenerator;
pub use prompts::{parse_finalization, render_conversation};
pub use providers::{GeminiClient, OpenAIClient};

use async_trait::async_trait;
use mindcanvas_core::{CanvasResult, ChatTurn, Finalization};
use std::sync::Arc;

// ============================================================================
// COMPLETION SEAM
// ============================================================================

/// A single completion request in provider-neutral form.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction placed ahead of the conversation, sent once per call.
    pub system: Option<String>,
    /// Ordered turns; the last one is the prompt being answered.
    pub turns: Vec<ChatTurn>,
    pub temperature: f32,
}

/// Raw access to a language model.
///
/// Implementations differ only in how they reach a model. Errors are returned
/// as `CanvasError::Llm` and are absorbed by [`PromptedGenerator`].
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Short provider identifier used in logs and errors (e.g. "gemini").
    fn provider_id(&self) -> &str;

    /// Produce the model's reply text for a request.
    async fn complete(&self, request: CompletionRequest) -> CanvasResult<String>;
}

#[async_trait]
impl<M: ChatModel + ?Sized> ChatModel for Arc<M> {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    async fn complete(&self, request: CompletionRequest) -> CanvasResult<String> {
        (**self).complete(request).await
    }
}

// ============================================================================
// GENERATION SERVICE CONTRACT
// ============================================================================

/// The title / chat / finalization contract satisfied by every backend.
///
/// None of these operations fail. On any internal error an implementation
/// logs the failure and returns a deterministic fallback value. There is no
/// retry policy: one attempt per call.
#[async_trait]
pub trait GenerationService: Send + Sync {
    fn provider_id(&self) -> &str;

    /// A 3-5 word label prefixed with a single emoji.
    async fn generate_title(&self, text: &str) -> String;

    /// A markdown reply. `history` is replayed in order before `message`.
    async fn generate_chat_response(&self, message: &str, history: Option<&[ChatTurn]>) -> String;

    /// A short summary plus a study-note rewrite of the whole history.
    async fn generate_finalization(&self, history: &[ChatTurn]) -> Finalization;
}

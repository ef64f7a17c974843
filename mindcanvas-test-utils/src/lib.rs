//! MindCanvas Test Utilities
//!
//! Shared test infrastructure for the MindCanvas workspace:
//! - Scripted and failing generation backends
//! - Proptest generators for block forests
//! - Fixtures for common document shapes

// Re-export storage doubles from their source crate
pub use mindcanvas_storage::InMemoryRepository;

pub use mindcanvas_core::{
    Block, BlockId, BlockLink, CanvasError, ChatRole, ChatTurn, Finalization, LlmError, Map, MapId,
    Message, UserDocument,
};

use async_trait::async_trait;
use mindcanvas_core::CanvasResult;
use mindcanvas_llm::{ChatModel, CompletionRequest, GenerationService, PromptedGenerator};
use std::sync::{Arc, Mutex};

pub use generators::arb_block_forest;

// ============================================================================
// GENERATION DOUBLES
// ============================================================================

/// One recorded call to a [`ScriptedGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationCall {
    Title(String),
    Chat {
        message: String,
        history: Vec<ChatTurn>,
    },
    Finalization(Vec<ChatTurn>),
}

/// Deterministic [`GenerationService`] that records every call.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    title: String,
    reply_prefix: String,
    finalization: Finalization,
    calls: Arc<Mutex<Vec<GenerationCall>>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            title: "🧪 Test Topic".to_string(),
            reply_prefix: "Reply to: ".to_string(),
            finalization: Finalization::new(
                "A short test summary.",
                "# Test Note\n\n- point one\n- point two",
            ),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Chat replies are `{prefix}{message}`.
    pub fn with_reply_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reply_prefix = prefix.into();
        self
    }

    pub fn with_finalization(mut self, finalization: Finalization) -> Self {
        self.finalization = finalization;
        self
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: GenerationCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    async fn generate_title(&self, text: &str) -> String {
        self.record(GenerationCall::Title(text.to_string()));
        self.title.clone()
    }

    async fn generate_chat_response(&self, message: &str, history: Option<&[ChatTurn]>) -> String {
        self.record(GenerationCall::Chat {
            message: message.to_string(),
            history: history.map(<[ChatTurn]>::to_vec).unwrap_or_default(),
        });
        format!("{}{}", self.reply_prefix, message)
    }

    async fn generate_finalization(&self, history: &[ChatTurn]) -> Finalization {
        self.record(GenerationCall::Finalization(history.to_vec()));
        self.finalization.clone()
    }
}

/// [`ChatModel`] whose every completion fails, for exercising fallbacks.
#[derive(Debug, Clone, Default)]
pub struct FailingChatModel;

#[async_trait]
impl ChatModel for FailingChatModel {
    fn provider_id(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: CompletionRequest) -> CanvasResult<String> {
        Err(LlmError::RequestFailed {
            provider: "failing".to_string(),
            status: 503,
            message: "model unavailable".to_string(),
        }
        .into())
    }
}

/// A full generation service built on [`FailingChatModel`]: every call falls back.
pub fn failing_generator() -> PromptedGenerator<FailingChatModel> {
    PromptedGenerator::new(FailingChatModel)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for MindCanvas data.

    use super::*;
    use mindcanvas_core::new_entity_id;
    use proptest::prelude::*;
    use proptest::sample::Index;

    /// A forest of 1..=`max_blocks` blocks in one map, in shuffled storage order.
    /// Every parent reference points at another block of the forest.
    pub fn arb_block_forest(max_blocks: usize) -> impl Strategy<Value = Vec<Block>> {
        prop::collection::vec(any::<Option<Index>>(), 1..=max_blocks.max(1))
            .prop_map(|parents| {
                let map_id = new_entity_id();
                let mut blocks: Vec<Block> = Vec::with_capacity(parents.len());
                for (i, parent) in parents.into_iter().enumerate() {
                    let parent_block_id = match parent {
                        Some(index) if i > 0 => Some(blocks[index.index(i)].block_id),
                        _ => None,
                    };
                    blocks.push(Block::new(map_id, "prop-user", parent_block_id, format!("block {}", i)));
                }
                blocks
            })
            .prop_shuffle()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built documents for common scenarios.

    use super::*;

    pub const TEST_USER: &str = "test-user";

    /// Ids in [`sample_tree`].
    #[derive(Debug, Clone, Copy)]
    pub struct SampleTree {
        pub map_id: MapId,
        pub root: BlockId,
        pub child: BlockId,
        pub grandchild: BlockId,
        pub sibling_root: BlockId,
    }

    /// One map holding `root -> child -> grandchild` plus an unrelated root,
    /// each block with a user/assistant exchange, and links for the children.
    pub fn sample_tree(user_id: &str) -> (UserDocument, SampleTree) {
        let mut document = UserDocument::empty(user_id);
        let map = Map::new(user_id, "🌿 Photosynthesis");
        let root = Block::new(map.map_id, user_id, None, "🟢 Chlorophyll");
        let child = Block::new(map.map_id, user_id, Some(root.block_id), "💚 Why Green");
        let grandchild = Block::new(map.map_id, user_id, Some(child.block_id), "🌈 Light Spectrum");
        let sibling_root = Block::new(map.map_id, user_id, None, "☀️ Light Reactions");

        let ids = SampleTree {
            map_id: map.map_id,
            root: root.block_id,
            child: child.block_id,
            grandchild: grandchild.block_id,
            sibling_root: sibling_root.block_id,
        };

        for block in [&root, &child, &grandchild, &sibling_root] {
            document
                .messages
                .push(Message::new(block.block_id, ChatRole::User, format!("About {}", block.title)));
            document
                .messages
                .push(Message::new(block.block_id, ChatRole::Assistant, "Here is an answer."));
        }
        document.block_links.push(link(&child, "chlorophyll"));
        document.block_links.push(link(&grandchild, "green"));

        document.maps.push(map);
        document.blocks.extend([root, child, grandchild, sibling_root]);
        (document, ids)
    }

    fn link(block: &Block, highlighted: &str) -> BlockLink {
        BlockLink {
            block_id: block.block_id,
            parent_block_id: block.parent_block_id.unwrap_or(block.block_id),
            highlighted_text: highlighted.to_string(),
            context_range: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_llm::prompts::{FALLBACK_CHAT_RESPONSE, FALLBACK_TITLE};

    #[tokio::test]
    async fn test_scripted_generator_records_calls() {
        let generator = ScriptedGenerator::new().with_title("🌿 Leaves");
        assert_eq!(generator.generate_title("plants").await, "🌿 Leaves");
        assert_eq!(
            generator.generate_chat_response("hi", None).await,
            "Reply to: hi"
        );
        assert_eq!(generator.calls().len(), 2);
        assert_eq!(generator.calls()[0], GenerationCall::Title("plants".to_string()));
    }

    #[tokio::test]
    async fn test_failing_generator_falls_back() {
        let generator = failing_generator();
        assert_eq!(generator.generate_title("x").await, FALLBACK_TITLE);
        assert_eq!(generator.generate_chat_response("x", None).await, FALLBACK_CHAT_RESPONSE);
    }

    #[test]
    fn test_sample_tree_shape() {
        let (doc, ids) = fixtures::sample_tree(fixtures::TEST_USER);
        assert_eq!(doc.blocks.len(), 4);
        assert_eq!(doc.messages.len(), 8);
        assert_eq!(doc.block_links.len(), 2);
        assert!(doc.blocks.iter().all(|b| b.map_id == ids.map_id));
    }
}

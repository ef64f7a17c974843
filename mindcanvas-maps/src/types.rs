//! Operation inputs and results.
//!
//! Results serialize in camelCase so transports can return them as-is.

use mindcanvas_core::{iso8601, BlockId, MapId, Message, MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// Input for creating a block. `parent_block_id = None` makes a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBlock {
    pub map_id: MapId,
    pub message: String,
    pub parent_block_id: Option<BlockId>,
    pub highlighted_text: Option<String>,
    pub context_range: Option<String>,
}

impl NewBlock {
    pub fn root(map_id: MapId, message: impl Into<String>) -> Self {
        Self {
            map_id,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn child(
        map_id: MapId,
        parent_block_id: BlockId,
        highlighted_text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            map_id,
            message: message.into(),
            parent_block_id: Some(parent_block_id),
            highlighted_text: Some(highlighted_text.into()),
            context_range: None,
        }
    }

    pub fn with_context_range(mut self, context_range: impl Into<String>) -> Self {
        self.context_range = Some(context_range.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCreated {
    pub map_id: MapId,
    pub title: String,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDeleted {
    pub deleted_map_id: MapId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCreated {
    pub block_id: BlockId,
    pub title: String,
    pub response: String,
    /// Timestamp of the assistant message.
    #[serde(with = "iso8601")]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSent {
    /// Id of the assistant message.
    pub message_id: MessageId,
    pub response: String,
    #[serde(with = "iso8601")]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFinalized {
    pub summary: String,
    pub reformatted_content: String,
    pub is_finalized: bool,
    #[serde(with = "iso8601")]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReopened {
    pub block_id: BlockId,
    pub is_finalized: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksDeleted {
    pub deleted_block_ids: Vec<BlockId>,
}

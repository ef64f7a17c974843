//! Core entity structures
//!
//! Field names serialize in camelCase and must stay stable: stored user
//! documents are read back with exactly these names.

use crate::{iso8601, new_entity_id, now, BlockId, ChatRole, MapId, MessageId, Timestamp, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// Map - top-level container for one topic, holding a forest of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    pub map_id: MapId,
    pub user_id: UserId,
    pub title: String,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
}

impl Map {
    pub fn new(user_id: impl Into<UserId>, title: impl Into<String>) -> Self {
        let created_at = now();
        Self {
            map_id: new_entity_id(),
            user_id: user_id.into(),
            title: title.into(),
            created_at,
            updated_at: created_at,
        }
    }
}

/// Block - a single branch of conversation inside a map.
///
/// Blocks with `parent_block_id == None` are roots. Ownership by a map is a
/// foreign key, not containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_id: BlockId,
    pub map_id: MapId,
    pub user_id: UserId,
    #[serde(default)]
    pub parent_block_id: Option<BlockId>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub reformatted_content: Option<String>,
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
}

impl Block {
    pub fn new(
        map_id: MapId,
        user_id: impl Into<UserId>,
        parent_block_id: Option<BlockId>,
        title: impl Into<String>,
    ) -> Self {
        let created_at = now();
        Self {
            block_id: new_entity_id(),
            map_id,
            user_id: user_id.into(),
            parent_block_id,
            title: title.into(),
            summary: None,
            reformatted_content: None,
            is_finalized: false,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_block_id.is_none()
    }

    pub fn touch(&mut self) {
        self.updated_at = now();
    }
}

/// Message - one turn of a block's conversation. Order is append order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    pub block_id: BlockId,
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "iso8601")]
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(block_id: BlockId, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            message_id: new_entity_id(),
            block_id,
            role,
            content: content.into(),
            timestamp: now(),
        }
    }
}

/// BlockLink - provenance of a child block: the excerpt of the parent it
/// branched from. At most one per non-root block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLink {
    pub block_id: BlockId,
    pub parent_block_id: BlockId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub highlighted_text: String,
    #[serde(default)]
    pub context_range: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// All data for one user: four flat collections linked by foreign keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub maps: Vec<Map>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub block_links: Vec<BlockLink>,
}

impl UserDocument {
    /// Empty document, the valid initial state for a user never seen before.
    pub fn empty(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
            && self.blocks.is_empty()
            && self.messages.is_empty()
            && self.block_links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    #[test]
    fn test_block_serializes_camel_case_with_nulls() {
        let block = Block::new(new_entity_id(), "u1", None, "🌱 Plants");
        let value = serde_json::to_value(&block).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "blockId",
            "mapId",
            "userId",
            "parentBlockId",
            "title",
            "summary",
            "reformattedContent",
            "isFinalized",
            "createdAt",
            "updatedAt",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert!(obj["parentBlockId"].is_null());
        assert!(obj["summary"].is_null());
        assert_eq!(obj["isFinalized"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_document_uses_block_links_key() {
        let doc = UserDocument::empty("u1");
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("blockLinks").is_some());
        assert_eq!(value["userId"], "u1");
    }

    #[test]
    fn test_document_missing_collections_default_empty() {
        let doc: UserDocument = serde_json::from_str(r#"{"userId": "u1"}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.user_id, "u1");
    }

    #[test]
    fn test_block_link_null_highlight_reads_as_empty() {
        let raw = format!(
            r#"{{"blockId": "{}", "parentBlockId": "{}", "highlightedText": null, "contextRange": null}}"#,
            new_entity_id(),
            new_entity_id()
        );
        let link: BlockLink = serde_json::from_str(&raw).unwrap();
        assert_eq!(link.highlighted_text, "");
        assert!(link.context_range.is_none());
    }

    #[test]
    fn test_stored_naive_timestamps_are_accepted() {
        let raw = format!(
            r#"{{"mapId": "{}", "userId": "u1", "title": "📝 New Topic",
                "createdAt": "2024-05-01T08:00:00.000001",
                "updatedAt": "2024-05-01T09:00:00"}}"#,
            new_entity_id()
        );
        let map: Map = serde_json::from_str(&raw).unwrap();
        assert!(map.updated_at > map.created_at);
    }

    #[test]
    fn test_new_block_is_unfinalized_root() {
        let block = Block::new(new_entity_id(), "u1", None, "t");
        assert!(block.is_root());
        assert!(!block.is_finalized);
        assert_eq!(block.created_at, block.updated_at);
    }
}

//! Read-side views of maps and blocks.
//!
//! A block's summary is visible once it is finalized. Its reformatted note is
//! visible only when it is finalized and a root; child notes stay hidden.

use mindcanvas_core::{iso8601, Block, BlockId, Map, MapId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub block_id: BlockId,
    pub title: String,
    pub parent_block_id: Option<BlockId>,
    pub is_finalized: bool,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reformatted_content: Option<String>,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        let summary = block.is_finalized.then(|| block.summary.clone()).flatten();
        let reformatted_content = (block.is_finalized && block.is_root())
            .then(|| block.reformatted_content.clone())
            .flatten();

        Self {
            block_id: block.block_id,
            title: block.title.clone(),
            parent_block_id: block.parent_block_id,
            is_finalized: block.is_finalized,
            created_at: block.created_at,
            updated_at: block.updated_at,
            summary,
            reformatted_content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub map_id: MapId,
    pub title: String,
    pub blocks: Vec<BlockView>,
}

impl MapView {
    /// Project `map` with the blocks that name it, in stored order.
    pub fn project<'a>(map: &Map, blocks: impl IntoIterator<Item = &'a Block>) -> Self {
        Self {
            map_id: map.map_id,
            title: map.title.clone(),
            blocks: blocks
                .into_iter()
                .filter(|b| b.map_id == map.map_id)
                .map(BlockView::from)
                .collect(),
        }
    }
}

/// One row of the map listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapListing {
    pub map_id: MapId,
    pub title: String,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub last_modified: Timestamp,
}

impl From<&Map> for MapListing {
    fn from(map: &Map) -> Self {
        Self {
            map_id: map.map_id,
            title: map.title.clone(),
            created_at: map.created_at,
            last_modified: map.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::new_entity_id;

    fn finalized(mut block: Block) -> Block {
        block.summary = Some("short".to_string());
        block.reformatted_content = Some("# Note".to_string());
        block.is_finalized = true;
        block
    }

    #[test]
    fn test_unfinalized_blocks_hide_both_fields() {
        let map = new_entity_id();
        let root = Block::new(map, "u1", None, "r");
        let child = Block::new(map, "u1", Some(root.block_id), "c");
        for block in [&root, &child] {
            let value = serde_json::to_value(BlockView::from(block)).unwrap();
            assert!(value.get("summary").is_none());
            assert!(value.get("reformattedContent").is_none());
        }
    }

    #[test]
    fn test_finalized_root_shows_note() {
        let root = finalized(Block::new(new_entity_id(), "u1", None, "r"));
        let view = BlockView::from(&root);
        assert_eq!(view.summary.as_deref(), Some("short"));
        assert_eq!(view.reformatted_content.as_deref(), Some("# Note"));
    }

    #[test]
    fn test_finalized_child_hides_note() {
        let child = finalized(Block::new(new_entity_id(), "u1", Some(new_entity_id()), "c"));
        let value = serde_json::to_value(BlockView::from(&child)).unwrap();
        assert_eq!(value["summary"], "short");
        assert!(value.get("reformattedContent").is_none());
        assert!(value["parentBlockId"].is_string());
    }

    #[test]
    fn test_map_view_only_includes_own_blocks() {
        let map = Map::new("u1", "m");
        let mine = Block::new(map.map_id, "u1", None, "mine");
        let theirs = Block::new(new_entity_id(), "u1", None, "theirs");
        let view = MapView::project(&map, [&mine, &theirs]);
        assert_eq!(view.blocks.len(), 1);
        assert_eq!(view.blocks[0].title, "mine");
    }

    #[test]
    fn test_listing_uses_last_modified() {
        let map = Map::new("u1", "m");
        let value = serde_json::to_value(MapListing::from(&map)).unwrap();
        assert!(value.get("lastModified").is_some());
        assert!(value.get("updatedAt").is_none());
    }
}

//! Block forest traversal and cascade deletes.
//!
//! Parent links are assumed to form a forest but that is never trusted:
//! every walk tracks visited ids and terminates on cycles or self-parents.

use mindcanvas_core::{Block, BlockId, ChatTurn, MapId, UserDocument};
use std::collections::{HashMap, HashSet, VecDeque};

/// Children of each block id, in stored order. Built once per traversal.
pub fn children_index(blocks: &[Block]) -> HashMap<BlockId, Vec<BlockId>> {
    let mut index: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
    for block in blocks {
        if let Some(parent) = block.parent_block_id {
            index.entry(parent).or_default().push(block.block_id);
        }
    }
    index
}

/// Transitive children of `root`, breadth first. `root` itself is excluded.
pub fn descendants(blocks: &[Block], root: BlockId) -> Vec<BlockId> {
    let index = children_index(blocks);
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        let Some(children) = index.get(&current) else {
            continue;
        };
        for &child in children {
            if visited.insert(child) {
                found.push(child);
                queue.push_back(child);
            }
        }
    }
    found
}

/// `root` followed by all of its descendants.
pub fn deletion_order(blocks: &[Block], root: BlockId) -> Vec<BlockId> {
    let mut ids = vec![root];
    ids.extend(descendants(blocks, root));
    ids
}

/// Counts of what a cascade removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub blocks: usize,
    pub messages: usize,
    pub links: usize,
}

/// Drop every block, message and link whose block id is in `ids`.
pub fn remove_blocks(document: &mut UserDocument, ids: &HashSet<BlockId>) -> Removed {
    let before = (
        document.blocks.len(),
        document.messages.len(),
        document.block_links.len(),
    );

    document.blocks.retain(|b| !ids.contains(&b.block_id));
    document.messages.retain(|m| !ids.contains(&m.block_id));
    document.block_links.retain(|l| !ids.contains(&l.block_id));

    Removed {
        blocks: before.0 - document.blocks.len(),
        messages: before.1 - document.messages.len(),
        links: before.2 - document.block_links.len(),
    }
}

/// Remove `block_id` and its whole subtree. Returns the ids that were targeted,
/// `block_id` first. The map is left alone.
pub fn cascade_delete_block(document: &mut UserDocument, block_id: BlockId) -> (Vec<BlockId>, Removed) {
    let ids = deletion_order(&document.blocks, block_id);
    let set: HashSet<BlockId> = ids.iter().copied().collect();
    let removed = remove_blocks(document, &set);
    (ids, removed)
}

/// Remove the map and every block that names it, with their messages and links.
pub fn cascade_delete_map(document: &mut UserDocument, map_id: MapId) -> Removed {
    document.maps.retain(|m| m.map_id != map_id);
    let ids: HashSet<BlockId> = document
        .blocks
        .iter()
        .filter(|b| b.map_id == map_id)
        .map(|b| b.block_id)
        .collect();
    remove_blocks(document, &ids)
}

pub fn find_block(document: &UserDocument, block_id: BlockId) -> Option<&Block> {
    document.blocks.iter().find(|b| b.block_id == block_id)
}

pub fn find_block_mut(document: &mut UserDocument, block_id: BlockId) -> Option<&mut Block> {
    document.blocks.iter_mut().find(|b| b.block_id == block_id)
}

/// The block's conversation in append order.
pub fn block_history(document: &UserDocument, block_id: BlockId) -> Vec<ChatTurn> {
    document
        .messages
        .iter()
        .filter(|m| m.block_id == block_id)
        .map(ChatTurn::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::{new_entity_id, BlockLink, ChatRole, Map, Message};

    fn block(map: MapId, parent: Option<BlockId>) -> Block {
        Block::new(map, "u1", parent, "t")
    }

    #[test]
    fn test_descendants_of_leaf_is_empty() {
        let map = new_entity_id();
        let root = block(map, None);
        let id = root.block_id;
        assert!(descendants(&[root], id).is_empty());
    }

    #[test]
    fn test_descendants_breadth_first() {
        let map = new_entity_id();
        let root = block(map, None);
        let a = block(map, Some(root.block_id));
        let b = block(map, Some(root.block_id));
        let a1 = block(map, Some(a.block_id));
        let expected = vec![a.block_id, b.block_id, a1.block_id];
        let root_id = root.block_id;
        let blocks = vec![root, a1, a, b];

        assert_eq!(descendants(&blocks, root_id), expected);
    }

    #[test]
    fn test_cycle_terminates() {
        let map = new_entity_id();
        let mut a = block(map, None);
        let b = block(map, Some(a.block_id));
        a.parent_block_id = Some(b.block_id);
        let a_id = a.block_id;
        let b_id = b.block_id;

        let found = descendants(&[a, b], a_id);
        assert_eq!(found, vec![b_id]);
    }

    #[test]
    fn test_self_parent_terminates() {
        let map = new_entity_id();
        let mut a = block(map, None);
        a.parent_block_id = Some(a.block_id);
        let id = a.block_id;
        assert!(descendants(&[a], id).is_empty());
    }

    #[test]
    fn test_cascade_delete_block_keeps_unrelated() {
        let map = new_entity_id();
        let root = block(map, None);
        let child = block(map, Some(root.block_id));
        let other = block(map, None);

        let mut doc = UserDocument::empty("u1");
        doc.maps.push(Map::new("u1", "m"));
        for b in [&root, &child, &other] {
            doc.messages.push(Message::new(b.block_id, ChatRole::User, "q"));
            doc.messages.push(Message::new(b.block_id, ChatRole::Assistant, "a"));
        }
        doc.block_links.push(BlockLink {
            block_id: child.block_id,
            parent_block_id: root.block_id,
            highlighted_text: "x".to_string(),
            context_range: None,
        });
        let (root_id, child_id, other_id) = (root.block_id, child.block_id, other.block_id);
        doc.blocks.extend([root, child, other]);

        let (ids, removed) = cascade_delete_block(&mut doc, root_id);
        assert_eq!(ids, vec![root_id, child_id]);
        assert_eq!(
            removed,
            Removed {
                blocks: 2,
                messages: 4,
                links: 1
            }
        );
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].block_id, other_id);
        assert!(doc.messages.iter().all(|m| m.block_id == other_id));
        assert_eq!(doc.maps.len(), 1);
    }

    #[test]
    fn test_cascade_delete_missing_block_reports_request() {
        let mut doc = UserDocument::empty("u1");
        let ghost = new_entity_id();
        let (ids, removed) = cascade_delete_block(&mut doc, ghost);
        assert_eq!(ids, vec![ghost]);
        assert_eq!(removed, Removed::default());
    }

    #[test]
    fn test_cascade_delete_map_spares_other_maps() {
        let mut doc = UserDocument::empty("u1");
        let doomed = Map::new("u1", "doomed");
        let kept = Map::new("u1", "kept");
        let b1 = block(doomed.map_id, None);
        let b2 = block(kept.map_id, None);
        doc.messages.push(Message::new(b1.block_id, ChatRole::User, "q"));
        doc.messages.push(Message::new(b2.block_id, ChatRole::User, "q"));
        let (doomed_id, kept_id) = (doomed.map_id, kept.map_id);
        doc.maps.extend([doomed, kept]);
        doc.blocks.extend([b1, b2]);

        let removed = cascade_delete_map(&mut doc, doomed_id);
        assert_eq!(removed.blocks, 1);
        assert_eq!(removed.messages, 1);
        assert_eq!(doc.maps.len(), 1);
        assert_eq!(doc.maps[0].map_id, kept_id);
        assert!(doc.blocks.iter().all(|b| b.map_id == kept_id));
    }

    #[test]
    fn test_block_history_preserves_append_order() {
        let mut doc = UserDocument::empty("u1");
        let id = new_entity_id();
        let other = new_entity_id();
        doc.messages.push(Message::new(id, ChatRole::User, "1"));
        doc.messages.push(Message::new(other, ChatRole::User, "x"));
        doc.messages.push(Message::new(id, ChatRole::Assistant, "2"));
        doc.messages.push(Message::new(id, ChatRole::User, "3"));

        let contents: Vec<String> = block_history(&doc, id).into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["1", "2", "3"]);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use mindcanvas_core::{ChatRole, Message};
    use mindcanvas_test_utils::arb_block_forest;
    use proptest::prelude::*;

    /// Reference answer: repeatedly absorb blocks whose parent is already in the set.
    fn closure(blocks: &[Block], root: BlockId) -> HashSet<BlockId> {
        let mut set = HashSet::from([root]);
        loop {
            let before = set.len();
            for b in blocks {
                if let Some(p) = b.parent_block_id {
                    if set.contains(&p) {
                        set.insert(b.block_id);
                    }
                }
            }
            if set.len() == before {
                return set;
            }
        }
    }

    proptest! {
        #[test]
        fn prop_delete_removes_exactly_subtree(
            (blocks, pick) in arb_block_forest(24).prop_flat_map(|blocks| {
                let len = blocks.len();
                (Just(blocks), 0..len)
            })
        ) {
            let target = blocks[pick].block_id;
            let expected = closure(&blocks, target);

            let mut doc = UserDocument::empty("u1");
            for b in &blocks {
                doc.messages.push(Message::new(b.block_id, ChatRole::User, "q"));
            }
            doc.blocks = blocks.clone();

            let (ids, removed) = cascade_delete_block(&mut doc, target);
            let id_set: HashSet<BlockId> = ids.iter().copied().collect();

            prop_assert_eq!(ids.len(), id_set.len());
            prop_assert_eq!(&id_set, &expected);
            prop_assert_eq!(removed.blocks, expected.len());
            prop_assert_eq!(doc.blocks.len(), blocks.len() - expected.len());
            prop_assert!(doc.blocks.iter().all(|b| !expected.contains(&b.block_id)));
            prop_assert!(doc.messages.iter().all(|m| !expected.contains(&m.block_id)));
            prop_assert_eq!(doc.messages.len(), doc.blocks.len());
        }

        #[test]
        fn prop_descendants_never_contain_root(
            (blocks, pick) in arb_block_forest(24).prop_flat_map(|blocks| {
                let len = blocks.len();
                (Just(blocks), 0..len)
            })
        ) {
            let root = blocks[pick].block_id;
            let found = descendants(&blocks, root);
            prop_assert!(!found.contains(&root));
            let unique: HashSet<BlockId> = found.iter().copied().collect();
            prop_assert_eq!(unique.len(), found.len());
        }
    }
}

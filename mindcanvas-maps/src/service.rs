//! Map and block operations over a user's document.
//!
//! Every operation is one unit of work: load the document, call the generation
//! service for any text it needs, mutate, save once. Nothing is persisted if an
//! operation fails before its save.
//!
//! Without [`UserLocks`] two requests for the same user can interleave around
//! the generation call and the later save wins. With locks, the whole unit of
//! work runs under a per-user mutex.

use crate::context::build_block_context;
use crate::projection::{MapListing, MapView};
use crate::tree::{block_history, cascade_delete_block, cascade_delete_map, find_block, find_block_mut};
use crate::types::{
    BlockCreated, BlockFinalized, BlockReopened, BlocksDeleted, MapCreated, MapDeleted, MessageSent,
    NewBlock,
};
use mindcanvas_core::{
    Block, BlockId, BlockLink, CanvasError, CanvasResult, ChatRole, EntityType, Map, MapId,
    Message, UserDocument,
};
use mindcanvas_llm::GenerationService;
use mindcanvas_storage::{DocumentRepository, UserGuard, UserLocks};
use std::sync::Arc;

/// Implements every map and block operation for any repository and backend.
#[derive(Clone)]
pub struct MapService {
    repo: Arc<dyn DocumentRepository>,
    generator: Arc<dyn GenerationService>,
    locks: Option<UserLocks>,
}

impl MapService {
    pub fn new(repo: Arc<dyn DocumentRepository>, generator: Arc<dyn GenerationService>) -> Self {
        Self {
            repo,
            generator,
            locks: None,
        }
    }

    /// Serialize same-user operations.
    pub fn with_user_locks(mut self, locks: UserLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn provider_id(&self) -> &str {
        self.generator.provider_id()
    }

    async fn load(&self, user_id: &str) -> CanvasResult<UserDocument> {
        self.repo.load(user_id).await
    }

    async fn save(&self, user_id: &str, document: &UserDocument) -> CanvasResult<()> {
        self.repo.save(user_id, document).await
    }

    // ========================================================================
    // MAPS
    // ========================================================================

    /// Create a map titled from the initiating message.
    pub async fn create_map(&self, user_id: &str, message: &str) -> CanvasResult<MapCreated> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;

        let title = self.generator.generate_title(message).await;
        let map = Map::new(user_id, title);
        let created = MapCreated {
            map_id: map.map_id,
            title: map.title.clone(),
            created_at: map.created_at,
        };

        document.maps.push(map);
        self.save(user_id, &document).await?;

        tracing::info!(user_id, map_id = %created.map_id, "Created map");
        Ok(created)
    }

    /// All of the user's maps, in creation order.
    pub async fn list_maps(&self, user_id: &str) -> CanvasResult<Vec<MapListing>> {
        let document = self.load(user_id).await?;
        Ok(document.maps.iter().map(MapListing::from).collect())
    }

    pub async fn get_map(&self, user_id: &str, map_id: MapId) -> CanvasResult<MapView> {
        let document = self.load(user_id).await?;
        let map = document
            .maps
            .iter()
            .find(|m| m.map_id == map_id)
            .ok_or_else(|| CanvasError::not_found(EntityType::Map, map_id))?;
        Ok(MapView::project(map, &document.blocks))
    }

    /// Remove the map and everything hanging off it. Unknown ids are a no-op.
    pub async fn delete_map(&self, user_id: &str, map_id: MapId) -> CanvasResult<MapDeleted> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;

        let removed = cascade_delete_map(&mut document, map_id);
        self.save(user_id, &document).await?;

        tracing::info!(
            user_id,
            map_id = %map_id,
            blocks = removed.blocks,
            messages = removed.messages,
            links = removed.links,
            "Deleted map"
        );
        Ok(MapDeleted {
            deleted_map_id: map_id,
        })
    }

    // ========================================================================
    // BLOCKS
    // ========================================================================

    /// Create a block with its first exchange. A parented block also gets a
    /// link recording the highlighted excerpt.
    pub async fn create_block(&self, user_id: &str, request: NewBlock) -> CanvasResult<BlockCreated> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;

        let context = match request.parent_block_id {
            Some(parent_id) => {
                let parent = find_block(&document, parent_id)
                    .ok_or_else(|| CanvasError::not_found(EntityType::Block, parent_id))?;
                build_block_context(
                    parent.summary.as_deref(),
                    request.highlighted_text.as_deref().unwrap_or_default(),
                    request.context_range.as_deref(),
                    &request.message,
                )
            }
            None => request.message.clone(),
        };

        let response = self.generator.generate_chat_response(&context, None).await;
        let title = self.generator.generate_title(&request.message).await;

        let block = Block::new(request.map_id, user_id, request.parent_block_id, title);
        let block_id = block.block_id;
        if let Some(parent_block_id) = request.parent_block_id {
            document.block_links.push(BlockLink {
                block_id,
                parent_block_id,
                highlighted_text: request.highlighted_text.unwrap_or_default(),
                context_range: request.context_range,
            });
        }

        let question = Message::new(block_id, ChatRole::User, request.message);
        let answer = Message::new(block_id, ChatRole::Assistant, response);
        let created = BlockCreated {
            block_id,
            title: block.title.clone(),
            response: answer.content.clone(),
            timestamp: answer.timestamp,
        };

        document.blocks.push(block);
        document.messages.push(question);
        document.messages.push(answer);
        self.save(user_id, &document).await?;

        tracing::info!(
            user_id,
            map_id = %request.map_id,
            block_id = %block_id,
            parent_block_id = ?request.parent_block_id,
            "Created block"
        );
        Ok(created)
    }

    /// Continue a block's conversation with its full history as context.
    pub async fn send_message(
        &self,
        user_id: &str,
        block_id: BlockId,
        message: &str,
    ) -> CanvasResult<MessageSent> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;
        ensure_block(&document, block_id)?;

        let history = block_history(&document, block_id);
        let response = self
            .generator
            .generate_chat_response(message, Some(&history))
            .await;

        let question = Message::new(block_id, ChatRole::User, message);
        let answer = Message::new(block_id, ChatRole::Assistant, response);
        let sent = MessageSent {
            message_id: answer.message_id,
            response: answer.content.clone(),
            timestamp: answer.timestamp,
        };

        document.messages.push(question);
        document.messages.push(answer);
        if let Some(block) = find_block_mut(&mut document, block_id) {
            block.touch();
        }
        self.save(user_id, &document).await?;

        tracing::debug!(user_id, block_id = %block_id, turns = history.len() + 2, "Appended exchange");
        Ok(sent)
    }

    /// Summarize and rewrite the block's conversation. Messages are kept.
    pub async fn finalize_block(&self, user_id: &str, block_id: BlockId) -> CanvasResult<BlockFinalized> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;
        ensure_block(&document, block_id)?;

        let history = block_history(&document, block_id);
        let finalization = self.generator.generate_finalization(&history).await;

        let block = find_block_mut(&mut document, block_id)
            .ok_or_else(|| CanvasError::not_found(EntityType::Block, block_id))?;
        block.summary = Some(finalization.summary.clone());
        block.reformatted_content = Some(finalization.reformatted_content.clone());
        block.is_finalized = true;
        block.touch();
        let timestamp = block.updated_at;

        self.save(user_id, &document).await?;

        tracing::info!(user_id, block_id = %block_id, "Finalized block");
        Ok(BlockFinalized {
            summary: finalization.summary,
            reformatted_content: finalization.reformatted_content,
            is_finalized: true,
            timestamp,
        })
    }

    /// Undo finalization. The conversation is returned untouched.
    pub async fn reopen_block(&self, user_id: &str, block_id: BlockId) -> CanvasResult<BlockReopened> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;

        let block = find_block_mut(&mut document, block_id)
            .ok_or_else(|| CanvasError::not_found(EntityType::Block, block_id))?;
        block.is_finalized = false;
        block.summary = None;
        block.reformatted_content = None;
        block.touch();

        self.save(user_id, &document).await?;

        tracing::info!(user_id, block_id = %block_id, "Reopened block");
        Ok(BlockReopened {
            block_id,
            is_finalized: false,
            messages: messages_of(&document, block_id),
        })
    }

    /// Remove the block and its subtree. The owning map stays.
    pub async fn delete_block(&self, user_id: &str, block_id: BlockId) -> CanvasResult<BlocksDeleted> {
        let _guard = self.lock(user_id).await;
        let mut document = self.load(user_id).await?;

        let (deleted_block_ids, removed) = cascade_delete_block(&mut document, block_id);
        self.save(user_id, &document).await?;

        tracing::info!(
            user_id,
            block_id = %block_id,
            blocks = removed.blocks,
            messages = removed.messages,
            links = removed.links,
            "Deleted block subtree"
        );
        Ok(BlocksDeleted { deleted_block_ids })
    }

    /// The block's messages in conversation order.
    pub async fn block_messages(&self, user_id: &str, block_id: BlockId) -> CanvasResult<Vec<Message>> {
        let document = self.load(user_id).await?;
        ensure_block(&document, block_id)?;
        Ok(messages_of(&document, block_id))
    }

    async fn lock(&self, user_id: &str) -> Option<UserGuard> {
        match &self.locks {
            Some(locks) => Some(locks.lock(user_id).await),
            None => None,
        }
    }
}

impl std::fmt::Debug for MapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapService")
            .field("provider", &self.generator.provider_id())
            .field("serialize_user_writes", &self.locks.is_some())
            .finish()
    }
}

fn ensure_block(document: &UserDocument, block_id: BlockId) -> CanvasResult<()> {
    find_block(document, block_id)
        .map(|_| ())
        .ok_or_else(|| CanvasError::not_found(EntityType::Block, block_id))
}

fn messages_of(document: &UserDocument, block_id: BlockId) -> Vec<Message> {
    document
        .messages
        .iter()
        .filter(|m| m.block_id == block_id)
        .cloned()
        .collect()
}

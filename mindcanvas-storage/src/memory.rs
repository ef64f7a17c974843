//! In-memory repository for tests and local development.

use crate::{validate_user_id, DocumentRepository};
use async_trait::async_trait;
use mindcanvas_core::{CanvasResult, StorageError, UserDocument, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Documents held in a map keyed by user id. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<RwLock<HashMap<UserId, UserDocument>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing the save counter.
    pub fn insert(&self, document: UserDocument) -> CanvasResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        documents.insert(document.user_id.clone(), document);
        Ok(())
    }

    /// Current stored copy, if any.
    pub fn snapshot(&self, user_id: &str) -> CanvasResult<Option<UserDocument>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(documents.get(user_id).cloned())
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn load(&self, user_id: &str) -> CanvasResult<UserDocument> {
        validate_user_id(user_id)?;
        Ok(self
            .snapshot(user_id)?
            .unwrap_or_else(|| UserDocument::empty(user_id)))
    }

    async fn save(&self, user_id: &str, document: &UserDocument) -> CanvasResult<()> {
        validate_user_id(user_id)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        documents.insert(user_id.to_string(), document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

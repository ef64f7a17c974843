//! One pretty-printed JSON file per user under a data directory.

use crate::{validate_user_id, DocumentRepository};
use async_trait::async_trait;
use mindcanvas_core::{CanvasResult, StorageError, UserDocument};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed repository: `{data_dir}/{user_id}.json`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    data_dir: PathBuf,
}

impl JsonFileRepository {
    /// Open a repository rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> CanvasResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| io_error(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the user's document. Rejects ids that would escape the data dir.
    pub fn user_path(&self, user_id: &str) -> CanvasResult<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.data_dir.join(format!("{}.json", user_id)))
    }

    /// Delete every stored user document. Returns how many were removed.
    pub async fn purge_all(&self) -> CanvasResult<usize> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| io_error(&self.data_dir, e))?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.data_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| io_error(&path, e))?;
            removed += 1;
        }

        tracing::info!(data_dir = %self.data_dir.display(), removed, "Purged user documents");
        Ok(removed)
    }
}

#[async_trait]
impl DocumentRepository for JsonFileRepository {
    async fn load(&self, user_id: &str) -> CanvasResult<UserDocument> {
        let path = self.user_path(user_id)?;

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(user_id, "No stored document, starting empty");
                return Ok(UserDocument::empty(user_id));
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let mut document: UserDocument =
            serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization {
                reason: format!("{}: {}", path.display(), e),
            })?;
        if document.user_id.is_empty() {
            document.user_id = user_id.to_string();
        }
        Ok(document)
    }

    async fn save(&self, user_id: &str, document: &UserDocument) -> CanvasResult<()> {
        let path = self.user_path(user_id)?;
        let body = serde_json::to_vec_pretty(document).map_err(|e| StorageError::Serialization {
            reason: e.to_string(),
        })?;

        let bytes = body.len();
        let dir = self.data_dir.clone();
        tokio::task::spawn_blocking(move || atomic_write(&dir, &path, &body))
            .await
            .map_err(|e| StorageError::Io {
                path: self.data_dir.display().to_string(),
                reason: format!("write task failed: {}", e),
            })??;

        tracing::debug!(user_id, bytes, "Saved user document");
        Ok(())
    }
}

/// Write `data` to a fresh temp file in `dir`, then rename it over `path`.
/// Concurrent writers each get their own temp file; the last rename wins.
fn atomic_write(dir: &Path, path: &Path, data: &[u8]) -> CanvasResult<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(".mindcanvas-")
        .suffix(".json.tmp")
        .tempfile_in(dir)
        .map_err(|e| io_error(dir, e))?;
    temp.write_all(data).map_err(|e| io_error(temp.path(), e))?;
    temp.as_file().sync_all().map_err(|e| io_error(temp.path(), e))?;
    temp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> mindcanvas_core::CanvasError {
    StorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

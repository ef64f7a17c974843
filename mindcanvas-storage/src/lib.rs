//! MindCanvas Storage - Per-user Document Repository
//!
//! Every request is one unit of work: load the user's whole document, mutate it
//! in memory, save it back. There is no versioning and no partial update; the
//! last save for a user wins. [`UserLocks`] can serialize same-user work when
//! that is not acceptable.

pub mod config;
pub mod json_file;
pub mod locks;
pub mod memory;

pub use config::StorageConfig;
pub use json_file::JsonFileRepository;
pub use locks::{UserGuard, UserLocks};
pub use memory::InMemoryRepository;

use async_trait::async_trait;
use mindcanvas_core::{CanvasResult, ConfigError, UserDocument};

/// Load/save contract for user documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Return the user's document, or an empty one if none exists yet.
    async fn load(&self, user_id: &str) -> CanvasResult<UserDocument>;

    /// Persist the complete document, replacing whatever was stored before.
    async fn save(&self, user_id: &str, document: &UserDocument) -> CanvasResult<()>;
}

/// User ids are storage partition keys and end up in file names.
pub fn validate_user_id(user_id: &str) -> Result<(), ConfigError> {
    let reason = if user_id.trim().is_empty() {
        Some("user id must not be empty")
    } else if user_id.contains(['/', '\\', '\0']) {
        Some("user id must not contain path separators")
    } else if user_id.contains("..") {
        Some("user id must not contain '..'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidValue {
            field: "userId".to_string(),
            value: user_id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_are_accepted() {
        assert!(validate_user_id("user-123").is_ok());
        assert!(validate_user_id("google-oauth2|10987").is_ok());
        assert!(validate_user_id("a.b@example.com").is_ok());
    }

    #[test]
    fn test_path_like_ids_are_rejected() {
        for bad in ["", "   ", "../etc", "a/b", "a\\b", "..", "x..y"] {
            assert!(validate_user_id(bad).is_err(), "accepted {:?}", bad);
        }
    }
}

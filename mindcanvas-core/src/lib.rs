//! MindCanvas Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! Tree maintenance and generation live in `mindcanvas-maps` and `mindcanvas-llm`.

pub mod entities;
pub mod error;
pub mod identity;
pub mod llm;

pub use entities::{Block, BlockLink, Map, Message, UserDocument};
pub use error::{
    CanvasError, CanvasResult, ConfigError, DomainError, EntityType, LlmError, StorageError,
};
pub use identity::{iso8601, new_entity_id, now, BlockId, EntityId, MapId, MessageId, Timestamp, UserId};
pub use llm::{ChatRole, ChatTurn, Finalization};

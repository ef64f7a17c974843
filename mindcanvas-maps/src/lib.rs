//! MindCanvas Maps - Map and Block Domain Logic
//!
//! Tree maintenance over a user's document (descendant walks, cascade
//! deletes), prompt context assembly for branched blocks, read projections,
//! and [`MapService`], which runs each operation as a single
//! load/generate/mutate/save unit of work.
//!
//! The only caller-visible failure is `DomainError::NotFound`. Generation
//! never fails here: the injected `GenerationService` always returns a value.

pub mod context;
pub mod projection;
pub mod service;
pub mod tree;
pub mod types;

pub use context::build_block_context;
pub use projection::{BlockView, MapListing, MapView};
pub use service::MapService;
pub use tree::{cascade_delete_block, cascade_delete_map, descendants, Removed};
pub use types::{
    BlockCreated, BlockFinalized, BlockReopened, BlocksDeleted, MapCreated, MapDeleted, MessageSent,
    NewBlock,
};

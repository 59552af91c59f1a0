//! Public types for the EngramDB unified API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Public API types - these are what users should use
// ============================================================================

// Core value and identifier types
pub use engram_core::{JsonValue, MemoryId, RelationId};

// Memory records and enums
pub use engram_core::{
    Direction, EphemeralEntry, Memory, MemoryType, Relation, StructuredEntry,
};

// Errors and configuration
pub use engram_core::{EngineConfig, EngramError, EngramResult, EMBEDDING_DIM};

// Engine surface types
pub use engram_engine::{
    ListOptions, MemoryMatch, ProjectStats, RelatedMemory, SearchHit, SearchOptions,
    SearchOutcome, StoreOptions,
};

// Embedding provider seam
pub use engram_engine::{EmbeddingProvider, SharedEmbedder};

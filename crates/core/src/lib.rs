//! Shared vocabulary for the engram memory engine.
//!
//! This crate defines the record types stored by the engine, the error
//! taxonomy, the JSON validation boundary and the engine configuration.
//! It holds no storage logic.

pub mod config;
pub mod error;
pub mod json;
pub mod types;

pub use config::{EngineConfig, MAX_LIST_LIMIT, MAX_SEARCH_LIMIT};
pub use error::{EngramError, EngramResult};
pub use json::JsonValue;
pub use types::{
    Direction, EphemeralEntry, Memory, MemoryId, MemoryType, Relation, RelationId,
    StructuredEntry, EMBEDDING_DIM,
};

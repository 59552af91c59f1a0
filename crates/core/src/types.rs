//! Core record types shared by every store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngramError;
use crate::json::JsonValue;

/// Dimensionality of every stored embedding vector.
///
/// The embedding provider is required to produce exactly this many elements;
/// both the stores and the engine reject anything else.
pub const EMBEDDING_DIM: usize = 384;

/// Globally unique identifier of a [`Memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(Uuid);

impl MemoryId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        MemoryId(Uuid::new_v4())
    }

    /// Wrap an existing uuid.
    pub fn from_uuid(uuid: Uuid) -> Self {
        MemoryId(uuid)
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemoryId {
    type Err = EngramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(MemoryId)
            .map_err(|_| EngramError::validation(format!("invalid memory id: {}", s)))
    }
}

/// Globally unique identifier of a [`Relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(Uuid);

impl RelationId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        RelationId(Uuid::new_v4())
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a stored memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// A record of a specific event or decision, routine by default.
    #[default]
    Episodic,
    /// A learned, durable truth rather than a one-off event.
    Insight,
    /// A repeatable how-to.
    Procedure,
}

impl MemoryType {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Episodic => "episodic",
            MemoryType::Insight => "insight",
            MemoryType::Procedure => "procedure",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = EngramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episodic" => Ok(MemoryType::Episodic),
            "insight" => Ok(MemoryType::Insight),
            "procedure" => Ok(MemoryType::Procedure),
            other => Err(EngramError::validation(format!(
                "unknown memory type '{}' (expected episodic, insight or procedure)",
                other
            ))),
        }
    }
}

/// Direction of a relation edge relative to the queried memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The queried memory is the source of the edge.
    Outgoing,
    /// The queried memory is the target of the edge.
    Incoming,
}

/// A semantic memory record with its embedding.
///
/// Owned exclusively by the vector store; the relation graph references
/// memories by id and never owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Globally unique id, assigned at creation.
    pub id: MemoryId,
    /// Project this memory is scoped to. No operation crosses projects.
    pub project_id: String,
    /// Free-form category (e.g. "decision", "bug").
    pub category: String,
    /// The remembered text.
    pub content: String,
    /// L2-normalized embedding, exactly [`EMBEDDING_DIM`] elements.
    pub embedding: Vec<f32>,
    /// Caller-supplied metadata object.
    pub metadata: JsonValue,
    /// Kind of memory.
    pub memory_type: MemoryType,
    /// Durable-relevance signal in 1..=5; primary search ranking key.
    pub importance: u8,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A directed, typed edge between two memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Unique id of this edge.
    pub id: RelationId,
    /// Source memory.
    pub source_id: MemoryId,
    /// Target memory.
    pub target_id: MemoryId,
    /// Edge label; `(source, target, label)` is unique.
    pub relation_type: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An exact structured fact, keyed by `(project, category, key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredEntry {
    /// Project scope.
    pub project_id: String,
    /// Category component of the composite key.
    pub category: String,
    /// Key component of the composite key.
    pub key: String,
    /// The stored value.
    pub value: JsonValue,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time; preserved across upserts.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every upsert.
    pub updated_at: DateTime<Utc>,
}

/// Session-scoped scratch state with optional expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralEntry {
    /// Session scope.
    pub session_id: String,
    /// Key, unique within the session.
    pub key: String,
    /// The stored value.
    pub value: JsonValue,
    /// Creation time (reset when the key is overwritten).
    pub created_at: DateTime<Utc>,
    /// Expiry instant; `None` means the entry lives until overwritten or
    /// deleted. Evaluated lazily at read time, never swept in the background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

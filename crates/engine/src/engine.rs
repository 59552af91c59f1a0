//! Memory engine facade.
//!
//! [`MemoryEngine`] composes the four stores behind one surface, one logical
//! operation per caller request. Each operation maps to exactly one store,
//! except relation creation/traversal and memory deletion, which touch the
//! vector store and the relation graph together. The facade owns the
//! cross-store invariants: relation endpoints must exist, and deleting a
//! memory cascades to every relation referencing it.
//!
//! Text enters here; vectors live below. `store_memory` and
//! `search_memories` run the caller's text through the shared embedding
//! provider. The provider call is blocking but local to the request — there
//! is no engine-wide lock, so a slow embedding never serializes unrelated
//! operations.

use std::sync::Arc;

use serde::Serialize;

use engram_core::{
    EngineConfig, EngramResult, JsonValue, Memory, MemoryId, MemoryType, RelationId,
    StructuredEntry,
};

use crate::embed::SharedEmbedder;
use crate::ephemeral::EphemeralStore;
use crate::graph::{RelatedMemory, RelationGraph};
use crate::structured::StructuredStore;
use crate::vector::{ListOptions, ProjectStats, SearchOptions, VectorStore};

/// Optional fields for `store_memory`, with the documented defaults.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Kind of memory; defaults to episodic.
    pub memory_type: MemoryType,
    /// Durable-relevance signal in 1..=5; defaults to 1.
    pub importance: u8,
    /// Metadata object; defaults to `{}`.
    pub metadata: JsonValue,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            memory_type: MemoryType::Episodic,
            importance: 1,
            metadata: JsonValue::object(),
        }
    }
}

/// One search result as returned by the facade.
///
/// `similarity` is `None` when the result came from the degraded
/// chronological fallback rather than a vector comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// The matched memory.
    pub memory: Memory,
    /// Cosine similarity to the query, absent in degraded mode.
    pub similarity: Option<f32>,
}

/// Result of `search_memories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Ranked results (or a chronological page in degraded mode).
    pub matches: Vec<SearchHit>,
    /// True when similarity search was unavailable and results fell back to
    /// chronological ordering.
    pub degraded: bool,
}

/// Facade over the four memory stores.
///
/// Cheap to share: wrap it in an `Arc` and clone the handle per caller. All
/// operations take `&self` and are safe under concurrent use.
pub struct MemoryEngine {
    vectors: VectorStore,
    graph: RelationGraph,
    structured: StructuredStore,
    ephemeral: EphemeralStore,
    embedder: Arc<SharedEmbedder>,
    config: Arc<EngineConfig>,
}

impl MemoryEngine {
    /// Create an engine with default configuration.
    pub fn new(embedder: Arc<SharedEmbedder>) -> Self {
        Self::with_config(embedder, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(embedder: Arc<SharedEmbedder>, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            vectors: VectorStore::new(config.clone()),
            graph: RelationGraph::new(),
            structured: StructuredStore::new(config.clone()),
            ephemeral: EphemeralStore::new(config.clone()),
            embedder,
            config,
        }
    }

    /// Search options seeded from this engine's configuration.
    ///
    /// `SearchOptions::default()` uses the built-in knobs; engines built via
    /// `with_config` get their own defaults through here.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::from_config(&self.config)
    }

    /// List options seeded from this engine's configuration.
    pub fn list_options(&self) -> ListOptions {
        ListOptions::from_config(&self.config)
    }

    // =========================================================================
    // Semantic memories
    // =========================================================================

    /// Embed `content` and persist it as a new memory.
    pub fn store_memory(
        &self,
        project_id: &str,
        category: &str,
        content: &str,
        options: StoreOptions,
    ) -> EngramResult<MemoryId> {
        let embedding = self.embedder.embed(content)?;
        self.vectors.store(
            project_id,
            category,
            content,
            embedding,
            options.memory_type,
            options.importance,
            options.metadata,
        )
    }

    /// Semantic search over a project's memories.
    ///
    /// If the embedding provider is unavailable or fails on the query, the
    /// engine degrades to chronological `list` ordering instead of failing;
    /// the outcome carries `degraded = true` and hits without similarity
    /// scores so the fallback is observable.
    pub fn search_memories(
        &self,
        project_id: &str,
        query: &str,
        options: SearchOptions,
    ) -> EngramResult<SearchOutcome> {
        options.validate()?;

        let query_embedding = match self.embedder.embed(query) {
            Ok(embedding) => embedding,
            Err(error) => {
                tracing::warn!(
                    target: "engram::engine",
                    project = project_id,
                    %error,
                    "similarity search unavailable, falling back to chronological order"
                );
                let page = self.vectors.list(
                    project_id,
                    &ListOptions {
                        category: options.category.clone(),
                        limit: options.limit,
                        offset: 0,
                    },
                )?;
                return Ok(SearchOutcome {
                    matches: page
                        .into_iter()
                        .map(|memory| SearchHit {
                            memory,
                            similarity: None,
                        })
                        .collect(),
                    degraded: true,
                });
            }
        };

        let matches = self.vectors.search(project_id, &query_embedding, &options)?;
        Ok(SearchOutcome {
            matches: matches
                .into_iter()
                .map(|m| SearchHit {
                    memory: m.memory,
                    similarity: Some(m.similarity),
                })
                .collect(),
            degraded: false,
        })
    }

    /// Chronological page of a project's memories, newest first.
    pub fn list_memories(
        &self,
        project_id: &str,
        options: ListOptions,
    ) -> EngramResult<Vec<Memory>> {
        self.vectors.list(project_id, &options)
    }

    /// Delete a memory and cascade to every relation referencing it.
    ///
    /// The memory row is removed first, then its relations; traversal joins
    /// edges against live memories, so no concurrent reader can observe a
    /// relation whose endpoint is already gone.
    pub fn delete_memory(&self, memory_id: MemoryId, project_id: &str) -> EngramResult<()> {
        self.vectors.delete(memory_id, project_id)?;
        self.graph.cascade_delete(memory_id);
        Ok(())
    }

    /// Counters for a project.
    pub fn get_project_stats(&self, project_id: &str) -> ProjectStats {
        self.vectors.stats(project_id)
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Create a directed, typed edge between two existing memories.
    pub fn create_relation(
        &self,
        source_id: MemoryId,
        target_id: MemoryId,
        relation_type: &str,
    ) -> EngramResult<RelationId> {
        self.graph
            .create_relation(&self.vectors, source_id, target_id, relation_type)
    }

    /// Single-hop traversal around a memory, both directions.
    pub fn get_related_memories(&self, memory_id: MemoryId) -> EngramResult<Vec<RelatedMemory>> {
        self.graph.traverse(&self.vectors, memory_id)
    }

    // =========================================================================
    // Structured facts
    // =========================================================================

    /// Upsert an exact fact keyed by `(project, category, key)`.
    pub fn set_structured_memory(
        &self,
        project_id: &str,
        category: &str,
        key: &str,
        value: JsonValue,
        description: Option<String>,
    ) -> EngramResult<()> {
        self.structured
            .set(project_id, category, key, value, description)
    }

    /// Fetch an exact fact.
    pub fn get_structured_memory(
        &self,
        project_id: &str,
        category: &str,
        key: &str,
    ) -> EngramResult<StructuredEntry> {
        self.structured.get(project_id, category, key)
    }

    /// Delete an exact fact.
    pub fn delete_structured_memory(
        &self,
        project_id: &str,
        category: &str,
        key: &str,
    ) -> EngramResult<()> {
        self.structured.delete(project_id, category, key)
    }

    /// All facts for a project, optionally narrowed to one category.
    pub fn list_structured_memories(
        &self,
        project_id: &str,
        category: Option<&str>,
    ) -> Vec<StructuredEntry> {
        self.structured.list(project_id, category)
    }

    // =========================================================================
    // Short-term state
    // =========================================================================

    /// Upsert session scratch state with an optional TTL in seconds.
    pub fn set_short_term_memory(
        &self,
        session_id: &str,
        key: &str,
        value: JsonValue,
        ttl_seconds: Option<u64>,
    ) -> EngramResult<()> {
        self.ephemeral.set(session_id, key, value, ttl_seconds)
    }

    /// Read session scratch state, evaluating expiry at read time.
    pub fn get_short_term_memory(&self, session_id: &str, key: &str) -> EngramResult<JsonValue> {
        self.ephemeral.get(session_id, key)
    }

    /// Delete session scratch state explicitly.
    pub fn delete_short_term_memory(&self, session_id: &str, key: &str) -> EngramResult<()> {
        self.ephemeral.delete(session_id, key)
    }

    /// Drop every entry of a session. Returns the number removed.
    pub fn clear_session(&self, session_id: &str) -> usize {
        self.ephemeral.clear_session(session_id)
    }
}

//! Vector store: semantic memories with embeddings.
//!
//! Memories are partitioned into per-project shards so operations on
//! different projects never contend. A global id directory maps a memory id
//! back to its owning project, which is what lets the relation graph check
//! endpoint existence without knowing project scopes.
//!
//! # Design
//!
//! - `DashMap<project, Shard>`: sharded writes, lock-free reads
//! - `FxHashMap` inside each shard: O(1) id lookups, fast non-crypto hash
//! - Search is an exact cosine scan over the project shard. The
//!   filter/rank/limit contract is index-agnostic, so an approximate
//!   graph-based index can replace the scan without changing callers.

pub mod distance;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

use engram_core::{
    EngineConfig, EngramError, EngramResult, JsonValue, Memory, MemoryId, MemoryType,
    EMBEDDING_DIM, MAX_LIST_LIMIT, MAX_SEARCH_LIMIT,
};

use distance::cosine_similarity;

/// Per-project shard holding that project's memories.
#[derive(Debug, Default)]
struct Shard {
    memories: FxHashMap<MemoryId, Memory>,
}

/// A search hit: the memory plus its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryMatch {
    /// The matched memory.
    pub memory: Memory,
    /// Cosine similarity to the query, in [-1, 1].
    pub similarity: f32,
}

/// Per-project counters returned by [`VectorStore::stats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStats {
    /// Total memories stored for the project.
    pub total_memories: usize,
    /// Count per memory type.
    pub by_type: BTreeMap<String, usize>,
    /// Count per category.
    pub by_category: BTreeMap<String, usize>,
}

/// Options for [`VectorStore::search`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict results to this category.
    pub category: Option<String>,
    /// Minimum similarity, in [0, 1].
    pub threshold: f32,
    /// Maximum number of results, in 1..=50.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SearchOptions {
    /// Options seeded from a specific configuration's search knobs.
    ///
    /// `Default` uses the built-in configuration; engines with custom knobs
    /// hand theirs in here (see `MemoryEngine::search_options`).
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            category: None,
            threshold: config.default_search_threshold,
            limit: config.default_search_limit,
        }
    }

    /// Validate threshold and limit ranges.
    pub fn validate(&self) -> EngramResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EngramError::validation(format!(
                "similarity threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        if self.limit < 1 || self.limit > MAX_SEARCH_LIMIT {
            return Err(EngramError::validation(format!(
                "search limit {} is outside 1..={}",
                self.limit, MAX_SEARCH_LIMIT
            )));
        }
        Ok(())
    }
}

/// Options for [`VectorStore::list`].
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Restrict results to this category.
    pub category: Option<String>,
    /// Page size, in 1..=100.
    pub limit: usize,
    /// Number of entries to skip.
    pub offset: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ListOptions {
    /// Options seeded from a specific configuration's page-size knob.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            category: None,
            limit: config.default_list_limit,
            offset: 0,
        }
    }

    /// Validate the page size range.
    pub fn validate(&self) -> EngramResult<()> {
        if self.limit < 1 || self.limit > MAX_LIST_LIMIT {
            return Err(EngramError::validation(format!(
                "list limit {} is outside 1..={}",
                self.limit, MAX_LIST_LIMIT
            )));
        }
        Ok(())
    }
}

/// Store for episodic/insight/procedure memories with embeddings.
///
/// # Thread Safety
///
/// All operations are safe under concurrent callers. Writes lock only the
/// owning project's shard; reads are lock-free via DashMap.
pub struct VectorStore {
    shards: DashMap<String, Shard>,
    directory: DashMap<MemoryId, String>,
    config: Arc<EngineConfig>,
}

impl VectorStore {
    /// Create an empty store with the given limits.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            shards: DashMap::new(),
            directory: DashMap::new(),
            config,
        }
    }

    /// Persist a new memory and return its id.
    ///
    /// Rejects embeddings that are not exactly [`EMBEDDING_DIM`] elements,
    /// importance outside 1..=5, and metadata that is not a JSON object or
    /// exceeds the configured size/depth limits.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        project_id: &str,
        category: &str,
        content: &str,
        embedding: Vec<f32>,
        memory_type: MemoryType,
        importance: u8,
        metadata: JsonValue,
    ) -> EngramResult<MemoryId> {
        if embedding.len() != EMBEDDING_DIM {
            return Err(EngramError::validation(format!(
                "embedding has {} dimensions, expected {}",
                embedding.len(),
                EMBEDDING_DIM
            )));
        }
        if !(1..=5).contains(&importance) {
            return Err(EngramError::validation(format!(
                "importance {} is outside 1..=5",
                importance
            )));
        }
        metadata.require_object("metadata")?;
        metadata.validate(self.config.max_value_bytes, self.config.max_value_depth)?;

        let now = Utc::now();
        let id = MemoryId::new();
        let memory = Memory {
            id,
            project_id: project_id.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            embedding,
            metadata,
            memory_type,
            importance,
            created_at: now,
            updated_at: now,
        };

        self.shards
            .entry(project_id.to_string())
            .or_default()
            .memories
            .insert(id, memory);
        // The id becomes visible to endpoint checks only after the row is in
        // place, so a relation can never reference a half-inserted memory.
        self.directory.insert(id, project_id.to_string());

        tracing::debug!(target: "engram::vector", %id, project = project_id, "stored memory");
        Ok(id)
    }

    /// Similarity search within a project.
    ///
    /// Candidates are filtered to the project, the optional category and
    /// `similarity >= threshold`, then ranked by importance descending with
    /// similarity descending as the tie-break. A lower-similarity but
    /// higher-importance memory deliberately outranks a closer routine one.
    pub fn search(
        &self,
        project_id: &str,
        query_embedding: &[f32],
        options: &SearchOptions,
    ) -> EngramResult<Vec<MemoryMatch>> {
        options.validate()?;
        if query_embedding.len() != EMBEDDING_DIM {
            return Err(EngramError::validation(format!(
                "query embedding has {} dimensions, expected {}",
                query_embedding.len(),
                EMBEDDING_DIM
            )));
        }

        let shard = match self.shards.get(project_id) {
            Some(shard) => shard,
            None => return Ok(Vec::new()),
        };

        let mut matches: Vec<MemoryMatch> = shard
            .memories
            .values()
            .filter(|m| {
                options
                    .category
                    .as_deref()
                    .map_or(true, |c| m.category == c)
            })
            .filter_map(|m| {
                let similarity = cosine_similarity(&m.embedding, query_embedding);
                (similarity >= options.threshold).then(|| MemoryMatch {
                    memory: m.clone(),
                    similarity,
                })
            })
            .collect();
        drop(shard);

        matches.sort_by(|a, b| {
            b.memory
                .importance
                .cmp(&a.memory.importance)
                .then(b.similarity.total_cmp(&a.similarity))
        });
        matches.truncate(options.limit);
        Ok(matches)
    }

    /// Chronological page of a project's memories, newest first.
    ///
    /// Pure pagination, no ranking. Ties on `created_at` break on id so
    /// pages are stable.
    pub fn list(&self, project_id: &str, options: &ListOptions) -> EngramResult<Vec<Memory>> {
        options.validate()?;

        let shard = match self.shards.get(project_id) {
            Some(shard) => shard,
            None => return Ok(Vec::new()),
        };

        let mut memories: Vec<Memory> = shard
            .memories
            .values()
            .filter(|m| {
                options
                    .category
                    .as_deref()
                    .map_or(true, |c| m.category == c)
            })
            .cloned()
            .collect();
        drop(shard);

        memories.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(memories
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect())
    }

    /// Delete a memory, verifying project ownership first.
    ///
    /// Returns the removed memory. A guessed id with the wrong project is
    /// reported as not found, never deleted.
    pub fn delete(&self, id: MemoryId, project_id: &str) -> EngramResult<Memory> {
        let owner = match self.directory.get(&id) {
            Some(owner) => owner.value().clone(),
            None => {
                return Err(EngramError::not_found(format!("memory {} not found", id)));
            }
        };
        if owner != project_id {
            // Cross-project delete attempt; indistinguishable from a miss.
            return Err(EngramError::not_found(format!(
                "memory {} not found in project {}",
                id, project_id
            )));
        }

        let removed = self
            .shards
            .get_mut(project_id)
            .and_then(|mut shard| shard.memories.remove(&id));
        match removed {
            Some(memory) => {
                self.directory.remove(&id);
                tracing::debug!(target: "engram::vector", %id, project = project_id, "deleted memory");
                Ok(memory)
            }
            // Lost a race with a concurrent delete.
            None => Err(EngramError::not_found(format!("memory {} not found", id))),
        }
    }

    /// Counters for a project.
    pub fn stats(&self, project_id: &str) -> ProjectStats {
        let shard = match self.shards.get(project_id) {
            Some(shard) => shard,
            None => return ProjectStats::default(),
        };

        let mut stats = ProjectStats {
            total_memories: shard.memories.len(),
            ..ProjectStats::default()
        };
        for memory in shard.memories.values() {
            *stats
                .by_type
                .entry(memory.memory_type.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_category
                .entry(memory.category.clone())
                .or_insert(0) += 1;
        }
        stats
    }

    /// Snapshot a memory by id, regardless of project.
    ///
    /// Used by the relation graph to join edges with live memories.
    pub fn get(&self, id: &MemoryId) -> Option<Memory> {
        let project = self.directory.get(id)?.value().clone();
        self.shards
            .get(&project)
            .and_then(|shard| shard.memories.get(id).cloned())
    }

    /// True if the id refers to a live memory in any project.
    pub fn contains(&self, id: &MemoryId) -> bool {
        let project = match self.directory.get(id) {
            Some(project) => project.value().clone(),
            None => return false,
        };
        self.shards
            .get(&project)
            .map_or(false, |shard| shard.memories.contains_key(id))
    }
}

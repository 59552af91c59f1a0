//! Relation graph: directed, typed edges between memories.
//!
//! The triple map is the source of truth — an edge exists iff its
//! `(source, target, relation_type)` key is present, and the DashMap entry
//! API makes the uniqueness check-then-insert atomic. Forward and reverse
//! adjacency lists mirror the triples for O(out + in) single-hop traversal.
//!
//! Traversal joins edges against live memories and drops any edge whose
//! counterpart memory is missing, so a reader can never observe a dangling
//! edge even mid-cascade.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use engram_core::{
    Direction, EngramError, EngramResult, Memory, MemoryId, MemoryType, Relation, RelationId,
};

use crate::vector::VectorStore;

/// Uniqueness key of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TripleKey {
    source: MemoryId,
    target: MemoryId,
    relation_type: String,
}

/// One traversal result: the edge plus a snapshot of the memory on the
/// other end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedMemory {
    /// Edge label.
    pub relation_type: String,
    /// Whether the queried memory is the source or the target of the edge.
    pub direction: Direction,
    /// Id of the memory on the other end.
    pub memory_id: MemoryId,
    /// Category of the related memory.
    pub category: String,
    /// Content of the related memory.
    pub content: String,
    /// Type of the related memory.
    pub memory_type: MemoryType,
}

impl RelatedMemory {
    fn new(relation_type: &str, direction: Direction, other: Memory) -> Self {
        Self {
            relation_type: relation_type.to_string(),
            direction,
            memory_id: other.id,
            category: other.category,
            content: other.content,
            memory_type: other.memory_type,
        }
    }
}

/// Graph of relations between vector-store memories.
///
/// Endpoints are referenced by id, never owned; the vector store remains the
/// single owner of every memory.
pub struct RelationGraph {
    triples: DashMap<TripleKey, Relation>,
    forward: DashMap<MemoryId, Vec<TripleKey>>,
    reverse: DashMap<MemoryId, Vec<TripleKey>>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            triples: DashMap::new(),
            forward: DashMap::new(),
            reverse: DashMap::new(),
        }
    }

    /// Create a directed, typed edge between two existing memories.
    ///
    /// Fails `NotFound` if either endpoint is absent from the vector store;
    /// fails `Conflict` if the exact triple already exists. A duplicate is an
    /// explicit error, not a silent no-op.
    pub fn create_relation(
        &self,
        memories: &VectorStore,
        source_id: MemoryId,
        target_id: MemoryId,
        relation_type: &str,
    ) -> EngramResult<RelationId> {
        if relation_type.is_empty() {
            return Err(EngramError::validation("relation_type must not be empty"));
        }
        if !memories.contains(&source_id) {
            return Err(EngramError::not_found(format!(
                "source memory {} does not exist",
                source_id
            )));
        }
        if !memories.contains(&target_id) {
            return Err(EngramError::not_found(format!(
                "target memory {} does not exist",
                target_id
            )));
        }

        let key = TripleKey {
            source: source_id,
            target: target_id,
            relation_type: relation_type.to_string(),
        };
        let relation = Relation {
            id: RelationId::new(),
            source_id,
            target_id,
            relation_type: relation_type.to_string(),
            created_at: Utc::now(),
        };

        // Atomic check-then-insert: two racing creators of the same triple
        // get exactly one success and one Conflict.
        let id = match self.triples.entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(EngramError::conflict(format!(
                    "relation {} -[{}]-> {} already exists",
                    source_id, relation_type, target_id
                )));
            }
            Entry::Vacant(vacant) => {
                let id = relation.id;
                vacant.insert(relation);
                id
            }
        };

        self.forward.entry(source_id).or_default().push(key.clone());
        self.reverse.entry(target_id).or_default().push(key.clone());

        // Re-check after the edge is fully in place. A concurrent memory
        // delete whose cascade ran between the endpoint checks and the
        // inserts would otherwise leave this edge behind with nothing left
        // to reclaim it.
        if !memories.contains(&source_id) || !memories.contains(&target_id) {
            self.remove_edge(&key);
            return Err(EngramError::not_found(format!(
                "relation endpoint deleted while creating {} -[{}]-> {}",
                source_id, relation_type, target_id
            )));
        }

        tracing::debug!(
            target: "engram::graph",
            source = %source_id,
            target = %target_id,
            relation_type,
            "created relation"
        );
        Ok(id)
    }

    /// Single-hop traversal: all edges where `memory_id` is source
    /// (outgoing) or target (incoming), each paired with a snapshot of the
    /// memory on the other end.
    ///
    /// Never recurses, so cycles need no special handling. Edges whose
    /// counterpart memory is gone are filtered out.
    pub fn traverse(
        &self,
        memories: &VectorStore,
        memory_id: MemoryId,
    ) -> EngramResult<Vec<RelatedMemory>> {
        if !memories.contains(&memory_id) {
            return Err(EngramError::not_found(format!(
                "memory {} does not exist",
                memory_id
            )));
        }

        let mut related = Vec::new();

        let outgoing = self
            .forward
            .get(&memory_id)
            .map(|keys| keys.value().clone())
            .unwrap_or_default();
        for key in outgoing {
            if self.triples.get(&key).is_none() {
                continue;
            }
            if let Some(other) = memories.get(&key.target) {
                related.push(RelatedMemory::new(
                    &key.relation_type,
                    Direction::Outgoing,
                    other,
                ));
            }
        }

        let incoming = self
            .reverse
            .get(&memory_id)
            .map(|keys| keys.value().clone())
            .unwrap_or_default();
        for key in incoming {
            if self.triples.get(&key).is_none() {
                continue;
            }
            if let Some(other) = memories.get(&key.source) {
                related.push(RelatedMemory::new(
                    &key.relation_type,
                    Direction::Incoming,
                    other,
                ));
            }
        }

        Ok(related)
    }

    /// Remove one edge from the triple map and both adjacency mirrors.
    fn remove_edge(&self, key: &TripleKey) {
        self.triples.remove(key);
        if let Some(mut keys) = self.forward.get_mut(&key.source) {
            keys.retain(|k| k != key);
        }
        if let Some(mut keys) = self.reverse.get_mut(&key.target) {
            keys.retain(|k| k != key);
        }
    }

    /// Remove every relation where `memory_id` is source or target.
    ///
    /// Invoked as part of memory deletion, after the memory row itself is
    /// removed. Idempotent: cascading an id with no edges is a no-op.
    /// A `create_relation` racing with the cascade is handled on the
    /// creation side: it re-checks both endpoints after inserting and tears
    /// its own edge down if either memory vanished, so an edge the cascade
    /// never saw cannot outlive its endpoints.
    pub fn cascade_delete(&self, memory_id: MemoryId) {
        let mut removed = 0usize;

        let outgoing = self
            .forward
            .remove(&memory_id)
            .map(|(_, keys)| keys)
            .unwrap_or_default();
        for key in outgoing {
            if self.triples.remove(&key).is_some() {
                removed += 1;
            }
            if key.target != memory_id {
                if let Some(mut keys) = self.reverse.get_mut(&key.target) {
                    keys.retain(|k| k != &key);
                }
            }
        }

        let incoming = self
            .reverse
            .remove(&memory_id)
            .map(|(_, keys)| keys)
            .unwrap_or_default();
        for key in incoming {
            if self.triples.remove(&key).is_some() {
                removed += 1;
            }
            if key.source != memory_id {
                if let Some(mut keys) = self.forward.get_mut(&key.source) {
                    keys.retain(|k| k != &key);
                }
            }
        }

        if removed > 0 {
            tracing::debug!(
                target: "engram::graph",
                memory = %memory_id,
                removed,
                "cascaded relation delete"
            );
        }
    }

    /// Total number of relations in the graph.
    pub fn relation_count(&self) -> usize {
        self.triples.len()
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}

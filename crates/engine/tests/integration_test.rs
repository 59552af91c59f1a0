//! End-to-end engine tests.
//!
//! These tests exercise the full facade the way a host application would:
//! - store → search ranking (importance-major, similarity-minor)
//! - relations with cascade on memory deletion
//! - structured facts and short-term TTL state
//! - degraded search when the embedding provider fails

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use engram_core::{Direction, EngramError, JsonValue, MemoryType, EMBEDDING_DIM};
use engram_engine::{
    EmbeddingProvider, MemoryEngine, SearchOptions, SharedEmbedder, StoreOptions,
};

/// Deterministic provider for tests.
///
/// Texts registered via `with` embed to an exact vector; any other text gets
/// its own unit axis, so unrelated texts are orthogonal.
struct ScriptedProvider {
    scripted: HashMap<String, Vec<f32>>,
    assigned: Mutex<HashMap<String, usize>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            scripted: HashMap::new(),
            assigned: Mutex::new(HashMap::new()),
        }
    }

    fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), EMBEDDING_DIM);
        self.scripted.insert(text.to_string(), vector);
        self
    }
}

impl EmbeddingProvider for ScriptedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, String> {
        if let Some(vector) = self.scripted.get(text) {
            return Ok(vector.clone());
        }
        let mut assigned = self.assigned.lock().unwrap();
        // Axes above 100 are reserved for scripted vectors.
        let next = 100 + assigned.len() % (EMBEDDING_DIM - 100);
        let axis = *assigned.entry(text.to_string()).or_insert(next);
        let mut v = vec![0.0; EMBEDDING_DIM];
        v[axis] = 1.0;
        Ok(v)
    }
}

/// Unit vector with `v[0] = c` and the remainder on `other`, so its cosine
/// similarity to the axis-0 unit vector is exactly `c`.
fn with_query_similarity(c: f32, other: usize) -> Vec<f32> {
    let mut v = vec![0.0; EMBEDDING_DIM];
    v[0] = c;
    v[other] = (1.0 - c * c).sqrt();
    v
}

fn engine_with(provider: ScriptedProvider) -> MemoryEngine {
    MemoryEngine::new(Arc::new(SharedEmbedder::with_provider(Arc::new(provider))))
}

/// Test: a very relevant low-importance memory ranks below a less relevant
/// high-importance one.
#[test]
fn test_importance_outranks_similarity() {
    let mut query = vec![0.0; EMBEDDING_DIM];
    query[0] = 1.0;

    let provider = ScriptedProvider::new()
        .with("query", query)
        .with("critical decision", with_query_similarity(0.7, 1))
        .with("minor note", with_query_similarity(0.9, 2));
    let engine = engine_with(provider);

    engine
        .store_memory(
            "proj",
            "decision",
            "critical decision",
            StoreOptions {
                memory_type: MemoryType::Insight,
                importance: 5,
                metadata: JsonValue::object(),
            },
        )
        .unwrap();
    engine
        .store_memory(
            "proj",
            "note",
            "minor note",
            StoreOptions {
                importance: 1,
                ..Default::default()
            },
        )
        .unwrap();

    let outcome = engine
        .search_memories("proj", "query", SearchOptions::default())
        .unwrap();
    assert!(!outcome.degraded);
    assert_eq!(outcome.matches.len(), 2);
    assert_eq!(outcome.matches[0].memory.content, "critical decision");
    assert_eq!(outcome.matches[1].memory.content, "minor note");
    // Similarities are still reported truthfully.
    assert!(outcome.matches[0].similarity.unwrap() < outcome.matches[1].similarity.unwrap());
}

/// Test: the threshold excludes weak matches entirely.
#[test]
fn test_threshold_filters_weak_matches() {
    let mut query = vec![0.0; EMBEDDING_DIM];
    query[0] = 1.0;

    let provider = ScriptedProvider::new()
        .with("query", query)
        .with("strong", with_query_similarity(0.8, 1))
        .with("weak", with_query_similarity(0.3, 2));
    let engine = engine_with(provider);

    engine
        .store_memory("proj", "c", "strong", StoreOptions::default())
        .unwrap();
    engine
        .store_memory("proj", "c", "weak", StoreOptions::default())
        .unwrap();

    let outcome = engine
        .search_memories("proj", "query", SearchOptions::default())
        .unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].memory.content, "strong");
}

/// Test: projects never see each other's memories.
#[test]
fn test_projects_are_isolated() {
    let engine = engine_with(ScriptedProvider::new());
    engine
        .store_memory("alpha", "c", "shared words", StoreOptions::default())
        .unwrap();
    engine
        .store_memory("beta", "c", "other words", StoreOptions::default())
        .unwrap();

    let outcome = engine
        .search_memories("alpha", "shared words", SearchOptions::default())
        .unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].memory.project_id, "alpha");

    assert_eq!(engine.get_project_stats("alpha").total_memories, 1);
    assert_eq!(engine.get_project_stats("beta").total_memories, 1);
}

/// Test: relate two memories, traverse from both ends, then delete one and
/// verify the cascade removed the relation.
#[test]
fn test_relation_lifecycle_with_cascade() {
    let engine = engine_with(ScriptedProvider::new());
    let bug = engine
        .store_memory("proj", "bug", "login loops forever", StoreOptions::default())
        .unwrap();
    let cause = engine
        .store_memory(
            "proj",
            "insight",
            "session cookie never expires",
            StoreOptions::default(),
        )
        .unwrap();

    engine.create_relation(bug, cause, "caused_by").unwrap();

    // Duplicate triple is a conflict, not an upsert.
    let err = engine.create_relation(bug, cause, "caused_by").unwrap_err();
    assert!(matches!(err, EngramError::Conflict(_)));
    // Same endpoints under a different type are a distinct edge.
    engine.create_relation(bug, cause, "references").unwrap();

    let from_bug = engine.get_related_memories(bug).unwrap();
    assert_eq!(from_bug.len(), 2);
    assert!(from_bug.iter().all(|r| r.direction == Direction::Outgoing));

    let from_cause = engine.get_related_memories(cause).unwrap();
    assert_eq!(from_cause.len(), 2);
    assert!(from_cause.iter().all(|r| r.direction == Direction::Incoming));
    assert_eq!(from_cause[0].memory_id, bug);

    engine.delete_memory(bug, "proj").unwrap();
    assert!(engine.get_related_memories(cause).unwrap().is_empty());
    assert!(engine.get_related_memories(bug).unwrap_err().is_not_found());
}

/// Test: relating a missing memory fails before any edge is written.
#[test]
fn test_relation_requires_both_endpoints() {
    let engine = engine_with(ScriptedProvider::new());
    let a = engine
        .store_memory("proj", "c", "exists", StoreOptions::default())
        .unwrap();
    let ghost = engram_core::MemoryId::new();

    let err = engine.create_relation(a, ghost, "references").unwrap_err();
    assert!(err.is_not_found());
    assert!(engine.get_related_memories(a).unwrap().is_empty());
}

/// Test: structured facts upsert in place while semantic memories accumulate.
#[test]
fn test_structured_facts_upsert() {
    let engine = engine_with(ScriptedProvider::new());
    engine
        .set_structured_memory(
            "proj",
            "config",
            "api_endpoint",
            JsonValue::from("https://api.v1.example"),
            None,
        )
        .unwrap();
    engine
        .set_structured_memory(
            "proj",
            "config",
            "api_endpoint",
            JsonValue::from("https://api.v2.example"),
            Some("bumped during migration".to_string()),
        )
        .unwrap();

    let entries = engine.list_structured_memories("proj", Some("config"));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value.as_str(), Some("https://api.v2.example"));
    assert!(entries[0].updated_at >= entries[0].created_at);
}

/// Test: short-term state honors its TTL and expired keys stay dead.
#[test]
fn test_short_term_ttl_expiry() {
    let engine = engine_with(ScriptedProvider::new());
    engine
        .set_short_term_memory("sess", "current_file", JsonValue::from("auth.ts"), Some(1))
        .unwrap();
    engine
        .set_short_term_memory("sess", "mode", JsonValue::from("debug"), None)
        .unwrap();

    assert_eq!(
        engine
            .get_short_term_memory("sess", "current_file")
            .unwrap()
            .as_str(),
        Some("auth.ts")
    );

    std::thread::sleep(Duration::from_millis(1100));

    assert!(engine
        .get_short_term_memory("sess", "current_file")
        .unwrap_err()
        .is_not_found());
    // The untimed key survives.
    assert_eq!(
        engine.get_short_term_memory("sess", "mode").unwrap().as_str(),
        Some("debug")
    );

    assert_eq!(engine.clear_session("sess"), 1);
}

/// Test: provider failure degrades search to chronological listing instead
/// of failing the request.
#[test]
fn test_degraded_search_is_observable() {
    struct QueryFailingProvider {
        inner: ScriptedProvider,
    }
    impl EmbeddingProvider for QueryFailingProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>, String> {
            if text.starts_with("query:") {
                Err("model unavailable".to_string())
            } else {
                self.inner.embed(text)
            }
        }
    }

    let engine = MemoryEngine::new(Arc::new(SharedEmbedder::with_provider(Arc::new(
        QueryFailingProvider {
            inner: ScriptedProvider::new(),
        },
    ))));

    engine
        .store_memory("proj", "c", "older memory", StoreOptions::default())
        .unwrap();
    std::thread::sleep(Duration::from_millis(2));
    engine
        .store_memory("proj", "c", "newer memory", StoreOptions::default())
        .unwrap();

    let outcome = engine
        .search_memories("proj", "query: anything", SearchOptions::default())
        .unwrap();
    assert!(outcome.degraded);
    assert_eq!(outcome.matches.len(), 2);
    assert_eq!(outcome.matches[0].memory.content, "newer memory");
    assert!(outcome.matches.iter().all(|m| m.similarity.is_none()));

    // Storing still requires a working provider.
    let err = engine
        .store_memory("proj", "c", "query: text", StoreOptions::default())
        .unwrap_err();
    assert!(matches!(err, EngramError::Provider(_)));
}

/// Test: concurrent stores and searches on a shared engine stay consistent.
#[test]
fn test_concurrent_store_and_search() {
    let engine = Arc::new(engine_with(ScriptedProvider::new()));

    let mut handles = Vec::new();
    for t in 0..4 {
        let engine = engine.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..25 {
                engine
                    .store_memory(
                        "proj",
                        "c",
                        &format!("thread {} memory {}", t, i),
                        StoreOptions::default(),
                    )
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.get_project_stats("proj").total_memories, 100);
    let page = engine
        .list_memories(
            "proj",
            engram_engine::ListOptions {
                limit: 100,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.len(), 100);
}

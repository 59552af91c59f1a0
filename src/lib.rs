//! EngramDB: embedded long-term memory for AI agents.
//!
//! One engine, four kinds of memory:
//!
//! - semantic memories, searched by embedding similarity
//! - directed, typed relations between memories
//! - exact structured facts keyed by `(project, category, key)`
//! - short-term session state with optional TTL
//!
//! The host supplies an [`EmbeddingProvider`]; everything else is in-process
//! and safe to share across threads.
//!
//! ```no_run
//! use std::sync::Arc;
//! use engramdb::{MemoryEngine, SharedEmbedder, StoreOptions};
//!
//! # fn load_model() -> Result<Arc<dyn engramdb::EmbeddingProvider>, String> { unimplemented!() }
//! let embedder = Arc::new(SharedEmbedder::new(load_model));
//! let engine = MemoryEngine::new(embedder);
//!
//! let id = engine.store_memory(
//!     "my-project",
//!     "decision",
//!     "we shard the vector store per project",
//!     StoreOptions::default(),
//! )?;
//! # Ok::<(), engramdb::EngramError>(())
//! ```

mod types;

pub use types::*;

pub use engram_engine::MemoryEngine;

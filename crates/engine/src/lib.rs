//! Memory engine: the four stores and the facade that composes them.
//!
//! - [`vector`]: semantic memories with embedding similarity search
//! - [`graph`]: directed, typed relations between memories
//! - [`structured`]: exact facts keyed by `(project, category, key)`
//! - [`ephemeral`]: session scratch state with optional TTL
//! - [`embed`]: the embedding provider seam
//! - [`engine`]: the [`MemoryEngine`] facade

pub mod embed;
pub mod engine;
pub mod ephemeral;
pub mod graph;
pub mod structured;
pub mod vector;

pub use embed::{EmbeddingProvider, SharedEmbedder};
pub use engine::{MemoryEngine, SearchHit, SearchOutcome, StoreOptions};
pub use ephemeral::EphemeralStore;
pub use graph::{RelatedMemory, RelationGraph};
pub use structured::StructuredStore;
pub use vector::{ListOptions, MemoryMatch, ProjectStats, SearchOptions, VectorStore};

//! Embedding provider seam.
//!
//! The engine never embeds text itself; it delegates to an
//! [`EmbeddingProvider`] supplied by the host. Providers are typically
//! expensive to initialize (model load), so [`SharedEmbedder`] wraps one in a
//! process-wide, initialize-once lazy handle: the loader runs at most once,
//! and a load failure is cached and surfaced on every later use instead of
//! being retried.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use engram_core::{EngramError, EngramResult, EMBEDDING_DIM};

/// A text-to-vector function.
///
/// Implementations must be deterministic for identical input (up to their
/// own versioning) and produce L2-normalized vectors of exactly
/// [`EMBEDDING_DIM`] elements. The engine never inspects provider internals,
/// only the output shape. The call may be slow (model inference); it blocks
/// only the request that triggered it.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, String>;

    /// Dimensionality of produced vectors.
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }
}

type Loader = dyn Fn() -> Result<Arc<dyn EmbeddingProvider>, String> + Send + Sync;

/// Lazy, shared, initialize-once handle to the embedding provider.
///
/// On first use the loader is invoked; its result (success or failure) is
/// cached for the process lifetime. Thread-safe: concurrent first callers
/// race on a `OnceCell`, and exactly one loader invocation wins.
pub struct SharedEmbedder {
    loader: Box<Loader>,
    provider: OnceCell<Result<Arc<dyn EmbeddingProvider>, String>>,
}

impl SharedEmbedder {
    /// Create a handle that loads the provider on first use.
    pub fn new(
        loader: impl Fn() -> Result<Arc<dyn EmbeddingProvider>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            provider: OnceCell::new(),
        }
    }

    /// Create a handle around an already-initialized provider.
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Ok(provider));
        Self {
            loader: Box::new(|| Err("provider was supplied pre-initialized".to_string())),
            provider: cell,
        }
    }

    /// Get or load the provider. Load is attempted at most once; a failure
    /// is cached and returned on every later call.
    pub fn get_or_load(&self) -> Result<Arc<dyn EmbeddingProvider>, String> {
        self.provider.get_or_init(|| (self.loader)()).clone()
    }

    /// Embed text, checking the output shape.
    ///
    /// Fails `Provider` if the provider cannot be loaded, the embedding call
    /// fails, or the vector does not have exactly [`EMBEDDING_DIM`] elements.
    pub fn embed(&self, text: &str) -> EngramResult<Vec<f32>> {
        let provider = self.get_or_load().map_err(EngramError::provider)?;
        let vector = provider.embed(text).map_err(EngramError::provider)?;
        if vector.len() != EMBEDDING_DIM {
            return Err(EngramError::provider(format!(
                "provider returned {} dimensions, expected {}",
                vector.len(),
                EMBEDDING_DIM
            )));
        }
        Ok(vector)
    }
}

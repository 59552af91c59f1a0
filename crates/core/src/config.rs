//! Engine configuration.
//!
//! The engine itself never reads files or environment; the (external) setup
//! layer builds an [`EngineConfig`] and hands it in. Defaults match the
//! documented operation contracts.

use serde::{Deserialize, Serialize};

/// Hard upper bound for `search` result limits.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Hard upper bound for `list` page sizes.
pub const MAX_LIST_LIMIT: usize = 100;

/// Tunable limits and defaults for the memory engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum serialized size of a caller-supplied JSON value, in bytes.
    pub max_value_bytes: usize,
    /// Maximum nesting depth of a caller-supplied JSON value.
    pub max_value_depth: usize,
    /// Default similarity threshold for search.
    pub default_search_threshold: f32,
    /// Default result limit for search.
    pub default_search_limit: usize,
    /// Default page size for list.
    pub default_list_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_value_bytes: 256 * 1024,
            max_value_depth: 32,
            default_search_threshold: 0.5,
            default_search_limit: 5,
            default_list_limit: 20,
        }
    }
}

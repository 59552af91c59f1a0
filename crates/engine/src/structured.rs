//! Structured store: exact facts keyed by `(project, category, key)`.
//!
//! Writes are upserts: at most one live value per triple, with `created_at`
//! preserved and `updated_at` refreshed on overwrite. The DashMap entry API
//! serializes concurrent writers on the same triple so exactly one final
//! value wins and no duplicate row is ever observable.

use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use engram_core::{EngineConfig, EngramError, EngramResult, JsonValue, StructuredEntry};

/// Composite key of a structured fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactKey {
    project_id: String,
    category: String,
    key: String,
}

/// Store for exact structured facts, not subject to similarity search.
pub struct StructuredStore {
    entries: DashMap<FactKey, StructuredEntry>,
    config: Arc<EngineConfig>,
}

impl StructuredStore {
    /// Create an empty store with the given limits.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Upsert a fact.
    ///
    /// Creates the triple if absent; otherwise replaces value/description,
    /// refreshes `updated_at` and preserves the original `created_at`.
    pub fn set(
        &self,
        project_id: &str,
        category: &str,
        key: &str,
        value: JsonValue,
        description: Option<String>,
    ) -> EngramResult<()> {
        value.validate(self.config.max_value_bytes, self.config.max_value_depth)?;

        let fact_key = FactKey {
            project_id: project_id.to_string(),
            category: category.to_string(),
            key: key.to_string(),
        };
        let now = Utc::now();

        match self.entries.entry(fact_key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.value = value;
                entry.description = description;
                entry.updated_at = now;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StructuredEntry {
                    project_id: project_id.to_string(),
                    category: category.to_string(),
                    key: key.to_string(),
                    value,
                    description,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        tracing::debug!(
            target: "engram::structured",
            project = project_id,
            category,
            key,
            "set structured fact"
        );
        Ok(())
    }

    /// Fetch a fact by its triple.
    pub fn get(&self, project_id: &str, category: &str, key: &str) -> EngramResult<StructuredEntry> {
        let fact_key = FactKey {
            project_id: project_id.to_string(),
            category: category.to_string(),
            key: key.to_string(),
        };
        self.entries
            .get(&fact_key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                EngramError::not_found(format!(
                    "no structured fact {}/{}/{}",
                    project_id, category, key
                ))
            })
    }

    /// Delete a fact by its triple.
    pub fn delete(&self, project_id: &str, category: &str, key: &str) -> EngramResult<()> {
        let fact_key = FactKey {
            project_id: project_id.to_string(),
            category: category.to_string(),
            key: key.to_string(),
        };
        match self.entries.remove(&fact_key) {
            Some(_) => {
                tracing::debug!(
                    target: "engram::structured",
                    project = project_id,
                    category,
                    key,
                    "deleted structured fact"
                );
                Ok(())
            }
            None => Err(EngramError::not_found(format!(
                "no structured fact {}/{}/{}",
                project_id, category, key
            ))),
        }
    }

    /// All facts for a project, optionally narrowed to one category,
    /// ordered by (category, key).
    pub fn list(&self, project_id: &str, category: Option<&str>) -> Vec<StructuredEntry> {
        let mut entries: Vec<StructuredEntry> = self
            .entries
            .iter()
            .filter(|kv| {
                kv.key().project_id == project_id
                    && category.map_or(true, |c| kv.key().category == c)
            })
            .map(|kv| kv.value().clone())
            .collect();
        entries.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.key.cmp(&b.key)));
        entries
    }
}

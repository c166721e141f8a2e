//! Per-call resolution cache

use dashmap::DashMap;
use serde_json::Value;
use solvent_domain::ProducerKey;

/// Results of cached nodes within one top-level call
///
/// Keyed by the effective node's key, so an override never reads the
/// replaced producer's result. Never shared between calls.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    values: DashMap<ProducerKey, Value>,
}

impl ResolutionCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `key`
    pub fn get(&self, key: ProducerKey) -> Option<Value> {
        self.values.get(&key).map(|value| value.value().clone())
    }

    /// Store the result for `key`
    pub fn insert(&self, key: ProducerKey, value: Value) {
        self.values.insert(key, value);
    }

    /// Whether `key` has a result
    pub fn contains(&self, key: ProducerKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

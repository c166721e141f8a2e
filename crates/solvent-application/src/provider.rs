//! Provider
//!
//! Registry of built dependency nodes plus a map of overrides. Lookups go
//! through the override map first:
//!
//! ```text
//!   get(key) ──▶ overrides[key] ──found──▶ replacement node
//!                    │
//!                 missing
//!                    ▼
//!               nodes[key] ──missing──▶ Error::MissingDependency
//! ```
//!
//! Both maps are concurrent, so resolutions may read while tests or hosts
//! install overrides. Scoped overrides restore the previous state when
//! their guard drops, including on error and panic.

use crate::builder::{BuildOptions, build_call_node};
use crate::call_node::CallNode;
use dashmap::DashMap;
use solvent_domain::{Error, Producer, ProducerKey, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of dependency nodes and their overrides
#[derive(Debug, Default)]
pub struct Provider {
    nodes: DashMap<ProducerKey, Arc<CallNode>>,
    overrides: DashMap<ProducerKey, Arc<CallNode>>,
}

impl Provider {
    /// Empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under its producer key; the last registration wins
    pub fn add(&self, node: Arc<CallNode>) -> ProducerKey {
        let key = node.key();
        debug!(call = node.call_name(), %key, "Registered dependency");
        self.nodes.insert(key, node);
        key
    }

    /// Effective node for `key`: the override if any, else the registration
    pub fn get(&self, key: ProducerKey) -> Result<Arc<CallNode>> {
        if let Some(node) = self.overrides.get(&key) {
            return Ok(Arc::clone(node.value()));
        }
        self.registered(key)
            .ok_or_else(|| Error::missing_dependency(key.to_string()))
    }

    /// Registered node for `key`, ignoring overrides
    pub fn registered(&self, key: ProducerKey) -> Option<Arc<CallNode>> {
        self.nodes.get(&key).map(|node| Arc::clone(node.value()))
    }

    /// Replace `original` with `replacement` wherever it is resolved
    ///
    /// The replacement is built with the original node's validator factory
    /// and caching flags. An original that was never registered is
    /// registered first.
    pub fn override_with(&self, original: &Producer, replacement: &Producer) -> Result<()> {
        let key = original.key();
        let original_node = match self.registered(key) {
            Some(node) => node,
            None => {
                let node = build_call_node(original, self, &BuildOptions::default())?;
                self.add(Arc::clone(&node));
                node
            }
        };
        let mut options = BuildOptions::default()
            .with_use_cache(original_node.use_cache())
            .with_cast_result(original_node.cast_result());
        if let Some(factory) = original_node.validator_factory() {
            options = options.with_validator_factory(Arc::clone(factory));
        }
        let node = build_call_node(replacement, self, &options)?;
        info!(
            original = original.name(),
            replacement = replacement.name(),
            "Dependency overridden"
        );
        self.overrides.insert(key, node);
        Ok(())
    }

    /// Item-assignment form of [`Provider::override_with`]
    pub fn set(&self, original: &Producer, replacement: &Producer) -> Result<()> {
        self.override_with(original, replacement)
    }

    /// Override `original` until the returned guard drops
    ///
    /// Dropping the guard restores whatever override was in place before,
    /// or removes the override if there was none.
    pub fn scope(&self, original: &Producer, replacement: &Producer) -> Result<OverrideScope<'_>> {
        let key = original.key();
        let previous = self
            .overrides
            .get(&key)
            .map(|node| Arc::clone(node.value()));
        self.override_with(original, replacement)?;
        Ok(OverrideScope {
            provider: self,
            key,
            previous,
        })
    }

    /// Run `f` with `original` overridden by `replacement`
    pub fn with_override<T, F>(&self, original: &Producer, replacement: &Producer, f: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        let _scope = self.scope(original, replacement)?;
        Ok(f())
    }

    /// Remove every override; registrations are kept
    pub fn clear(&self) {
        info!(count = self.overrides.len(), "Overrides cleared");
        self.overrides.clear();
    }

    /// Remove every override and every registration
    pub fn reset(&self) {
        self.overrides.clear();
        self.nodes.clear();
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: ProducerKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Whether `key` is currently overridden
    pub fn is_overridden(&self, key: ProducerKey) -> bool {
        self.overrides.contains_key(&key)
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of active overrides
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

/// Guard restoring the previous override of one key on drop
#[derive(Debug)]
pub struct OverrideScope<'a> {
    provider: &'a Provider,
    key: ProducerKey,
    previous: Option<Arc<CallNode>>,
}

impl Drop for OverrideScope<'_> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(node) => {
                self.provider.overrides.insert(self.key, node);
            }
            None => {
                self.provider.overrides.remove(&self.key);
            }
        }
        debug!(key = %self.key, "Scoped override restored");
    }
}

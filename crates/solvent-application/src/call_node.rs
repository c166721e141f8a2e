//! Call Nodes
//!
//! A call node is the resolvable form of a producer: its parameters have
//! been classified into caller-supplied values, dependencies and custom
//! fields, its children are registered in a [`Provider`], and its
//! validator has been built. Nodes never change after building.

use crate::provider::Provider;
use solvent_domain::{
    CustomField, OptionItem, Producer, ProducerKey, Validator, ValidatorFactory,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Entity: resolvable unit of a call graph
#[derive(Debug)]
pub struct CallNode {
    pub(crate) producer: Producer,
    pub(crate) is_async: bool,
    pub(crate) is_generator: bool,
    pub(crate) use_cache: bool,
    pub(crate) cast_result: bool,
    pub(crate) params: Vec<OptionItem>,
    pub(crate) options: Vec<OptionItem>,
    pub(crate) dependencies: Vec<(String, ProducerKey)>,
    pub(crate) extra_dependencies: Vec<ProducerKey>,
    pub(crate) custom_fields: Vec<(String, Arc<dyn CustomField>)>,
    pub(crate) positional_names: Vec<String>,
    pub(crate) keyword_names: Vec<String>,
    pub(crate) var_args_name: Option<String>,
    pub(crate) var_kwargs_name: Option<String>,
    pub(crate) validator: Option<Arc<dyn Validator>>,
    pub(crate) validator_factory: Option<Arc<dyn ValidatorFactory>>,
}

impl CallNode {
    /// Key of the producer this node resolves
    pub fn key(&self) -> ProducerKey {
        self.producer.key()
    }

    /// Name of the producer this node resolves
    pub fn call_name(&self) -> &str {
        self.producer.name()
    }

    /// The producer this node resolves
    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Whether resolving this node requires the concurrent model
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Whether the producer yields a sequence of values
    pub fn is_generator(&self) -> bool {
        self.is_generator
    }

    /// Whether the result is shared per top-level call
    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    /// Whether the result is cast against the return hint
    pub fn cast_result(&self) -> bool {
        self.cast_result
    }

    /// Options supplied by the caller
    pub fn params(&self) -> &[OptionItem] {
        &self.params
    }

    /// Every option the validator expects, in declaration order
    pub fn options(&self) -> &[OptionItem] {
        &self.options
    }

    /// Dependency parameters and the keys of their producers
    pub fn dependencies(&self) -> &[(String, ProducerKey)] {
        &self.dependencies
    }

    /// Producers resolved for their side effects before the call
    pub fn extra_dependencies(&self) -> &[ProducerKey] {
        &self.extra_dependencies
    }

    /// Custom-field parameters
    pub fn custom_fields(&self) -> &[(String, Arc<dyn CustomField>)] {
        &self.custom_fields
    }

    /// Parameters filled by name, then by position
    pub fn positional_names(&self) -> &[String] {
        &self.positional_names
    }

    /// Parameters filled by name only
    pub fn keyword_names(&self) -> &[String] {
        &self.keyword_names
    }

    /// Parameter collecting surplus positional values
    pub fn var_args_name(&self) -> Option<&str> {
        self.var_args_name.as_deref()
    }

    /// Parameter collecting surplus keyword values
    pub fn var_kwargs_name(&self) -> Option<&str> {
        self.var_kwargs_name.as_deref()
    }

    /// Validator bound to this node's options
    pub fn validator(&self) -> Option<&Arc<dyn Validator>> {
        self.validator.as_ref()
    }

    /// Factory the validator was built with; reused for overrides
    pub fn validator_factory(&self) -> Option<&Arc<dyn ValidatorFactory>> {
        self.validator_factory.as_ref()
    }

    /// Caller-supplied options of this node and every node below it
    ///
    /// Children are looked up through `provider`, so overrides are
    /// honoured. Names are de-duplicated; the first occurrence wins.
    pub fn flat_params(&self, provider: &Provider) -> Vec<OptionItem> {
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut params = Vec::new();
        self.collect_params(provider, &mut visited, &mut seen, &mut params);
        params
    }

    fn collect_params(
        &self,
        provider: &Provider,
        visited: &mut HashSet<ProducerKey>,
        seen: &mut HashSet<String>,
        params: &mut Vec<OptionItem>,
    ) {
        if !visited.insert(self.key()) {
            return;
        }
        for option in &self.params {
            if seen.insert(option.field_name.clone()) {
                params.push(option.clone());
            }
        }
        let children = self
            .dependencies
            .iter()
            .map(|(_, key)| *key)
            .chain(self.extra_dependencies.iter().copied());
        for key in children {
            if let Ok(child) = provider.get(key) {
                child.collect_params(provider, visited, seen, params);
            }
        }
    }
}

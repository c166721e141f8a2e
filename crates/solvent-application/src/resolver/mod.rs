//! Resolver
//!
//! Resolves a call-node tree for one top-level call. Two execution models
//! share the same steps and differ only in how independent work runs:
//!
//! | Step                     | Sequential          | Concurrent                   |
//! |--------------------------|---------------------|------------------------------|
//! | Heat cached nodes        | plan order          | plan levels, fanned out      |
//! | Extra dependencies, deps | declaration order   | fanned out, first error wins |
//! | Custom fields            | declaration order   | field mode fanned out        |
//! | Sync bodies              | calling thread      | [`BlockingPool`]             |
//!
//! Only the root binds the caller's arguments. Every node hands its
//! dependencies a keyword map of what it bound, so a positional value
//! reaches a child under the name the root gave it.
//!
//! Per call, a [`ResolutionCache`] holds results of cached nodes and a
//! [`ResourceStack`] holds the cleanups of scoped dependencies.

mod cache;
mod concurrent;
mod plan;
mod pool;
mod scope;
mod sequential;

pub use cache::ResolutionCache;
pub use concurrent::ConcurrentResolver;
pub use plan::{PlannedNode, ResolutionPlan};
pub use pool::BlockingPool;
pub use scope::ResourceStack;
pub use sequential::SequentialResolver;

pub(crate) use scope::{Unclaimed, exit_of, settle};

use crate::call_node::CallNode;
use crate::provider::Provider;
use serde_json::Value;
use solvent_domain::{Arguments, CallArgs, KwArgs, Result};

/// Everything one top-level call resolves against
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// Node registry, honouring overrides
    pub provider: &'a Provider,
    /// Caller arguments, bound by the root node only
    pub arguments: &'a Arguments,
    /// Results of cached nodes
    pub cache: &'a ResolutionCache,
    /// Cleanups of opened resources
    pub stack: &'a ResourceStack,
}

impl<'a> Resolution<'a> {
    /// Bundle the state of one call
    pub fn new(
        provider: &'a Provider,
        arguments: &'a Arguments,
        cache: &'a ResolutionCache,
        stack: &'a ResourceStack,
    ) -> Self {
        Self {
            provider,
            arguments,
            cache,
            stack,
        }
    }
}

/// Arguments ready for a body, or a result that makes the call unnecessary
pub(crate) enum Prepared {
    Cached(Value),
    Ready(CallArgs),
}

/// Caller arguments distributed over one node's parameters
#[derive(Debug, Default)]
pub(crate) struct Bound {
    pub values: KwArgs,
    pub var_args: Vec<Value>,
    pub var_kwargs: KwArgs,
}

impl Bound {
    /// Arguments a node hands to its dependencies
    ///
    /// Positionals were consumed by name when this node bound them, so
    /// children only see keywords: the node's bound values plus surplus
    /// keywords. Surplus positionals stop here.
    pub(crate) fn handed_down(&self) -> Arguments {
        let mut keywords = self.values.clone();
        for (name, value) in &self.var_kwargs {
            keywords
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        Arguments {
            positional: Vec::new(),
            keywords,
        }
    }
}

/// Distribute `arguments` over the parameters of `node`
///
/// Keyword names are filled by name only; positional names by name, then
/// by position. Surplus positionals go to var-args. Surplus keywords go to
/// var-kwargs when declared, otherwise they stay in the map so custom
/// fields can read them.
pub(crate) fn bind(node: &CallNode, arguments: &Arguments) -> Bound {
    let mut keywords = arguments.keywords.clone();
    let mut values = KwArgs::new();

    for name in &node.keyword_names {
        if let Some(value) = keywords.remove(name) {
            values.insert(name.clone(), value);
        }
    }

    let mut positional = arguments.positional.iter();
    for name in &node.positional_names {
        if let Some(value) = keywords.remove(name) {
            values.insert(name.clone(), value);
        } else if let Some(value) = positional.next() {
            values.insert(name.clone(), value.clone());
        }
    }

    let var_args = if node.var_args_name.is_some() {
        positional.cloned().collect()
    } else {
        Vec::new()
    };
    let var_kwargs = if node.var_kwargs_name.is_some() {
        std::mem::take(&mut keywords)
    } else {
        KwArgs::new()
    };
    for (name, value) in keywords {
        values.entry(name).or_insert(value);
    }

    Bound {
        values,
        var_args,
        var_kwargs,
    }
}

/// Apply defaults, validate and keep only declared parameters
pub(crate) fn finish(node: &CallNode, bound: Bound) -> Result<CallArgs> {
    let Bound {
        mut values,
        var_args,
        var_kwargs,
    } = bound;
    if let Some(name) = &node.var_args_name {
        values.insert(name.clone(), Value::Array(var_args));
    }
    if let Some(name) = &node.var_kwargs_name {
        values.insert(name.clone(), Value::Object(var_kwargs));
    }
    for option in &node.options {
        if let Some(default) = &option.default_value {
            values
                .entry(option.field_name.clone())
                .or_insert_with(|| default.clone());
        }
    }

    if let Some(validator) = &node.validator {
        values = validator.validate(values)?;
    }

    let mut declared = KwArgs::new();
    let mut var_args = Vec::new();
    let mut var_kwargs = KwArgs::new();
    for option in &node.options {
        let Some(value) = values.remove(&option.field_name) else {
            continue;
        };
        let name = Some(&option.field_name);
        if name == node.var_args_name.as_ref() {
            if let Value::Array(items) = value {
                var_args = items;
            }
        } else if name == node.var_kwargs_name.as_ref() {
            if let Value::Object(map) = value {
                var_kwargs = map;
            }
        } else {
            declared.insert(option.field_name.clone(), value);
        }
    }
    Ok(CallArgs::new(
        node.call_name(),
        declared,
        var_args,
        var_kwargs,
    ))
}

/// Cast a produced value through the node's validator
pub(crate) fn cast_response(node: &CallNode, value: Value) -> Result<Value> {
    match &node.validator {
        Some(validator) if !node.is_generator => Ok(validator.response(value)?),
        _ => Ok(value),
    }
}

/// Cast one item yielded by a stream-shaped root
pub(crate) fn cast_item(node: &CallNode, value: Value) -> Result<Value> {
    match &node.validator {
        Some(validator) => Ok(validator.response(value)?),
        None => Ok(value),
    }
}

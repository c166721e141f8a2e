//! Sequential resolution
//!
//! Resolves a synchronous call graph on the calling thread. Async nodes
//! are rejected; the builder already refuses them under a synchronous
//! root, so meeting one here means an override swapped one in.

use super::{Prepared, Resolution, ResolutionPlan, bind, cast_response, finish};
use crate::call_node::CallNode;
use serde_json::Value;
use solvent_domain::{Arguments, Body, CallArgs, Closer, Error, FieldMode, Result};
use tracing::{debug, trace};

/// Resolves call nodes one at a time
#[derive(Debug, Clone, Copy)]
pub struct SequentialResolver<'a> {
    resolution: Resolution<'a>,
}

impl<'a> SequentialResolver<'a> {
    /// Resolver bound to the state of one call
    pub fn new(resolution: Resolution<'a>) -> Self {
        Self { resolution }
    }

    /// Resolve `root` and everything below it
    pub fn solve(&self, root: &CallNode) -> Result<Value> {
        self.solve_node(root, self.resolution.arguments, false)
    }

    fn solve_node(&self, node: &CallNode, incoming: &Arguments, nested: bool) -> Result<Value> {
        let args = match self.prepare(node, incoming, nested)? {
            Prepared::Cached(value) => return Ok(value),
            Prepared::Ready(args) => args,
        };
        debug!(call = node.call_name(), nested, "Resolving");
        let value = self.invoke(node, args, nested)?;
        let value = cast_response(node, value)?;
        if node.use_cache {
            self.resolution.cache.insert(node.key(), value.clone());
        }
        Ok(value)
    }

    /// Everything up to the body call: dependencies, fields, validation
    ///
    /// `incoming` is what the parent handed down, or the caller arguments
    /// for the root.
    pub(crate) fn prepare(
        &self,
        node: &CallNode,
        incoming: &Arguments,
        nested: bool,
    ) -> Result<Prepared> {
        if node.is_async {
            return Err(Error::execution_mode(
                node.call_name(),
                "async producer in a synchronous call",
            ));
        }
        if node.use_cache
            && let Some(value) = self.resolution.cache.get(node.key())
        {
            trace!(call = node.call_name(), "Cache hit");
            return Ok(Prepared::Cached(value));
        }

        let mut bound = bind(node, incoming);
        if !nested {
            self.heat(node, incoming)?;
        }

        let handed = bound.handed_down();
        for key in &node.extra_dependencies {
            let child = self.resolution.provider.get(*key)?;
            self.solve_node(&child, &handed, true)?;
        }
        for (param, key) in &node.dependencies {
            if bound.values.contains_key(param) {
                continue;
            }
            let child = self.resolution.provider.get(*key)?;
            let value = self.solve_node(&child, &handed, true)?;
            bound.values.insert(param.clone(), value);
        }

        for (param, field) in &node.custom_fields {
            match field.mode() {
                FieldMode::Use => {
                    bound.values = field.use_kwargs(param, std::mem::take(&mut bound.values))?;
                }
                FieldMode::Field => {
                    if let Some(value) = field.use_field(param, &bound.values)? {
                        bound.values.insert(param.clone(), value);
                    }
                }
            }
        }

        finish(node, bound).map(Prepared::Ready)
    }

    /// Resolve every cached node below `root` in dependency order
    fn heat(&self, root: &CallNode, incoming: &Arguments) -> Result<()> {
        let plan = ResolutionPlan::compute(root, self.resolution.provider, incoming)?;
        for planned in plan.order() {
            let node = &planned.node;
            if node.use_cache && !self.resolution.cache.contains(node.key()) {
                self.solve_node(node, &planned.arguments, true)?;
            }
        }
        Ok(())
    }

    fn invoke(&self, node: &CallNode, args: CallArgs, nested: bool) -> Result<Value> {
        match node.producer.body() {
            Body::Sync(body) => body(args),
            Body::Scoped(body) => {
                let resource = body(args)?;
                self.resolution.stack.push(resource.closer);
                Ok(resource.value)
            }
            Body::Stream(body) if nested => {
                let mut items = body(args)?;
                let first = items.next();
                self.resolution.stack.push(Closer::dropping(items));
                first.unwrap_or_else(|| {
                    Err(Error::execution_mode(
                        node.call_name(),
                        "stream dependency yielded no value",
                    ))
                })
            }
            Body::Stream(_) => Err(Error::execution_mode(
                node.call_name(),
                "stream producers are consumed with `stream`",
            )),
            Body::Async(_) | Body::AsyncScoped(_) | Body::AsyncStream(_) => Err(
                Error::execution_mode(node.call_name(), "async producer in a synchronous call"),
            ),
        }
    }
}

//! Concurrent resolution
//!
//! Resolves a call graph on the async executor. Independent work is
//! started together and joined with `try_join_all`: the first failure is
//! returned and the sibling futures are dropped, which cancels them.
//! Synchronous bodies and closers run on a [`BlockingPool`].

use super::{
    BlockingPool, Prepared, Resolution, ResolutionPlan, Unclaimed, bind, cast_response, finish,
};
use crate::call_node::CallNode;
use futures::future::{BoxFuture, try_join_all};
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use solvent_domain::{Arguments, Body, CallArgs, Closer, Error, FieldMode, Result, ValueStream};
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolves call nodes with fan-out of independent work
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentResolver<'a> {
    resolution: Resolution<'a>,
    pool: &'a BlockingPool,
}

impl<'a> ConcurrentResolver<'a> {
    /// Resolver bound to the state of one call
    pub fn new(resolution: Resolution<'a>, pool: &'a BlockingPool) -> Self {
        Self { resolution, pool }
    }

    /// Resolve `root` and everything below it
    pub async fn solve(&self, root: Arc<CallNode>) -> Result<Value> {
        let arguments = Arc::new(self.resolution.arguments.clone());
        self.solve_node(root, arguments, false).await
    }

    fn solve_node(
        &self,
        node: Arc<CallNode>,
        incoming: Arc<Arguments>,
        nested: bool,
    ) -> BoxFuture<'_, Result<Value>> {
        async move {
            let args = match self.prepare(&node, &incoming, nested).await? {
                Prepared::Cached(value) => return Ok(value),
                Prepared::Ready(args) => args,
            };
            debug!(call = node.call_name(), nested, "Resolving");
            let value = self.invoke(&node, args, nested).await?;
            let value = cast_response(&node, value)?;
            if node.use_cache {
                self.resolution.cache.insert(node.key(), value.clone());
            }
            Ok(value)
        }
        .boxed()
    }

    /// Everything up to the body call: dependencies, fields, validation
    async fn prepare(
        &self,
        node: &CallNode,
        incoming: &Arguments,
        nested: bool,
    ) -> Result<Prepared> {
        if node.use_cache
            && let Some(value) = self.resolution.cache.get(node.key())
        {
            trace!(call = node.call_name(), "Cache hit");
            return Ok(Prepared::Cached(value));
        }

        let mut bound = bind(node, incoming);
        if !nested {
            self.heat(node, incoming).await?;
        }

        let provider = self.resolution.provider;
        let handed = Arc::new(bound.handed_down());
        let extras = node.extra_dependencies.iter().map(|key| {
            let handed = Arc::clone(&handed);
            async move {
                let child = provider.get(*key)?;
                self.solve_node(child, handed, true).await
            }
        });
        let supplied = &bound.values;
        let dependencies = node
            .dependencies
            .iter()
            .filter(|(param, _)| !supplied.contains_key(param))
            .map(|(param, key)| {
                let handed = Arc::clone(&handed);
                async move {
                    let child = provider.get(*key)?;
                    let value = self.solve_node(child, handed, true).await?;
                    Ok::<_, Error>((param.clone(), value))
                }
            });
        let (_, resolved) = futures::try_join!(try_join_all(extras), try_join_all(dependencies))?;
        for (param, value) in resolved {
            bound.values.insert(param, value);
        }

        let values = &bound.values;
        let fields = node
            .custom_fields
            .iter()
            .filter(|(_, field)| field.mode() == FieldMode::Field)
            .map(|(param, field)| async move {
                let value = if field.is_async() {
                    field.use_field_async(param, values).await?
                } else {
                    field.use_field(param, values)?
                };
                Ok::<_, Error>((param, value))
            });
        for (param, value) in try_join_all(fields).await? {
            if let Some(value) = value {
                bound.values.insert(param.clone(), value);
            }
        }
        for (param, field) in &node.custom_fields {
            if field.mode() != FieldMode::Use {
                continue;
            }
            let values = std::mem::take(&mut bound.values);
            bound.values = if field.is_async() {
                field.use_kwargs_async(param, values).await?
            } else {
                field.use_kwargs(param, values)?
            };
        }

        finish(node, bound).map(Prepared::Ready)
    }

    /// Resolve every cached node below `root`, one plan level at a time
    async fn heat(&self, root: &CallNode, incoming: &Arguments) -> Result<()> {
        let plan = ResolutionPlan::compute(root, self.resolution.provider, incoming)?;
        for level in plan.levels() {
            let pending = level
                .iter()
                .filter(|planned| {
                    planned.node.use_cache && !self.resolution.cache.contains(planned.node.key())
                })
                .map(|planned| {
                    self.solve_node(
                        Arc::clone(&planned.node),
                        Arc::clone(&planned.arguments),
                        true,
                    )
                });
            try_join_all(pending).await?;
        }
        Ok(())
    }

    async fn invoke(&self, node: &CallNode, args: CallArgs, nested: bool) -> Result<Value> {
        match node.producer.body().clone() {
            Body::Sync(body) => self.pool.run(move || body(args)).await,
            Body::Async(body) => body(args).await,
            Body::Scoped(body) => {
                // Wrapped on the blocking thread so a cancelled wait still closes it.
                let opened = self
                    .pool
                    .run(move || body(args).map(Unclaimed::new))
                    .await?;
                Ok(opened.claim(self.resolution.stack))
            }
            Body::AsyncScoped(body) => {
                let resource = body(args).await?;
                self.resolution.stack.push(resource.closer);
                Ok(resource.value)
            }
            Body::Stream(body) if nested => {
                let (first, items) = self
                    .pool
                    .run(move || {
                        let mut items = body(args)?;
                        let first = items.next();
                        Ok((first, items))
                    })
                    .await?;
                self.resolution.stack.push(Closer::dropping(items));
                first.unwrap_or_else(|| Err(empty_stream(node)))
            }
            Body::AsyncStream(body) if nested => {
                let mut items = body(args)?;
                let first = items.next().await;
                self.resolution.stack.push(Closer::dropping(items));
                first.unwrap_or_else(|| Err(empty_stream(node)))
            }
            Body::Stream(_) | Body::AsyncStream(_) => Err(Error::execution_mode(
                node.call_name(),
                "stream producers are consumed with `stream_async`",
            )),
        }
    }

    /// Resolve `root`'s arguments and open its stream
    ///
    /// Items are not cast here; the caller owns the stream and the scope.
    pub(crate) async fn open_stream(&self, root: &CallNode) -> Result<ValueStream> {
        let Prepared::Ready(args) = self.prepare(root, self.resolution.arguments, false).await?
        else {
            return Err(Error::internal("stream root resolved from cache"));
        };
        match root.producer.body().clone() {
            Body::AsyncStream(body) => body(args),
            Body::Stream(body) => {
                let items = self.pool.run(move || body(args)).await?;
                Ok(futures::stream::iter(items).boxed())
            }
            _ => Err(Error::execution_mode(
                root.call_name(),
                "producer does not yield a stream",
            )),
        }
    }
}

fn empty_stream(node: &CallNode) -> Error {
    Error::execution_mode(node.call_name(), "stream dependency yielded no value")
}

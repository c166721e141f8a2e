//! Injected Functions
//!
//! [`inject`] builds the call node of a producer once and returns an
//! [`Injected`] handle. Every call through the handle gets a fresh
//! [`ResolutionCache`] and [`ResourceStack`], resolves the graph and
//! unwinds the stack before returning.
//!
//! ## Example
//!
//! ```
//! use solvent_application::{InjectOptions, Provider, inject};
//! use solvent_domain::{Arguments, Param, Producer, Signature, TypeHint, depends};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let base = Producer::sync("base", Signature::new(), |_| Ok(json!(2)));
//! let handler = Producer::sync(
//!     "handler",
//!     Signature::new()
//!         .param(Param::positional("a", TypeHint::Int))
//!         .param(Param::dependency("b", TypeHint::Int, depends(&base))),
//!     |args| Ok(json!(args.value::<i64>("a")? * args.value::<i64>("b")?)),
//! );
//!
//! let injected = inject(&handler, Arc::new(Provider::new()), InjectOptions::default()).unwrap();
//! assert_eq!(injected.call(Arguments::positional([21])).unwrap(), json!(42));
//! ```

use crate::builder::{BuildOptions, build_call_node};
use crate::call_node::CallNode;
use crate::provider::Provider;
use crate::resolver::{
    BlockingPool, ConcurrentResolver, Prepared, Resolution, ResolutionCache, ResourceStack,
    SequentialResolver, cast_item, exit_of, settle,
};
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use solvent_domain::constants::{DEFAULT_CAST, DEFAULT_INJECT_CAST_RESULT};
use solvent_domain::{
    Arguments, Body, CallArgs, Dependant, Error, KwArgs, Producer, Result, ScopeExit,
    ValidatorFactory, ValueIter, ValueStream,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Options of an injected function
#[derive(Debug, Clone)]
pub struct InjectOptions {
    /// Validate arguments; `false` disables the validator entirely
    pub cast: bool,
    /// Cast the result against the declared return hint
    pub cast_result: bool,
    /// Producers resolved for their side effects before every call
    pub extra_dependencies: Vec<Dependant>,
    /// Factory for validators of the root and every dependency
    pub validator_factory: Option<Arc<dyn ValidatorFactory>>,
    /// Keyword values merged under the caller's keywords on every call
    pub call_extra: KwArgs,
    /// Pool running synchronous bodies in async calls
    pub pool: Option<BlockingPool>,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            cast: DEFAULT_CAST,
            cast_result: DEFAULT_INJECT_CAST_RESULT,
            extra_dependencies: Vec::new(),
            validator_factory: None,
            call_extra: KwArgs::new(),
            pool: None,
        }
    }
}

impl InjectOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set argument validation
    pub fn with_cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Set result casting
    pub fn with_cast_result(mut self, cast_result: bool) -> Self {
        self.cast_result = cast_result;
        self
    }

    /// Add an extra dependency
    pub fn with_extra_dependency(mut self, dependant: Dependant) -> Self {
        self.extra_dependencies.push(dependant);
        self
    }

    /// Set the validator factory
    pub fn with_validator_factory(mut self, factory: Arc<dyn ValidatorFactory>) -> Self {
        self.validator_factory = Some(factory);
        self
    }

    /// Add a keyword value supplied on every call
    pub fn with_call_extra<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.call_extra.insert(name.into(), value.into());
        self
    }

    /// Set the blocking pool
    pub fn with_pool(mut self, pool: BlockingPool) -> Self {
        self.pool = Some(pool);
        self
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            use_cache: true,
            is_sync: None,
            extra_dependencies: self.extra_dependencies.clone(),
            validator_factory: if self.cast {
                self.validator_factory.clone()
            } else {
                None
            },
            cast_result: self.cast_result,
        }
    }
}

/// Build `producer` and wrap it as an injected function
pub fn inject(producer: &Producer, provider: Arc<Provider>, options: InjectOptions) -> Result<Injected> {
    let node = build_call_node(producer, &provider, &options.build_options())?;
    Ok(inject_node(node, provider, options))
}

/// Wrap a prebuilt call node as an injected function
pub fn inject_node(node: Arc<CallNode>, provider: Arc<Provider>, options: InjectOptions) -> Injected {
    debug!(call = node.call_name(), is_async = node.is_async(), "Injected");
    Injected {
        node,
        provider,
        call_extra: options.call_extra,
        pool: options.pool.unwrap_or_default(),
    }
}

/// A producer whose parameters are resolved on every call
#[derive(Debug, Clone)]
pub struct Injected {
    node: Arc<CallNode>,
    provider: Arc<Provider>,
    call_extra: KwArgs,
    pool: BlockingPool,
}

impl Injected {
    /// Root call node
    pub fn node(&self) -> &Arc<CallNode> {
        &self.node
    }

    /// Provider the graph resolves against
    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    fn arguments(&self, args: Arguments) -> Arguments {
        args.with_defaults(&self.call_extra)
    }

    /// Call synchronously
    ///
    /// Fails with [`Error::ExecutionMode`] when any node of the effective
    /// graph is asynchronous.
    pub fn call(&self, args: Arguments) -> Result<Value> {
        let arguments = self.arguments(args);
        let cache = ResolutionCache::new();
        let stack = ResourceStack::new();
        let resolution = Resolution::new(&self.provider, &arguments, &cache, &stack);
        let result = SequentialResolver::new(resolution).solve(&self.node);
        let closed = stack.close_all(&exit_of(&result));
        settle(result, closed)
    }

    /// Call on the async executor, fanning out independent dependencies
    pub async fn call_async(&self, args: Arguments) -> Result<Value> {
        let arguments = self.arguments(args);
        let cache = ResolutionCache::new();
        let stack = ResourceStack::new();
        let resolution = Resolution::new(&self.provider, &arguments, &cache, &stack);
        let result = ConcurrentResolver::new(resolution, &self.pool)
            .solve(Arc::clone(&self.node))
            .await;
        let closed = stack.close_all_async(&exit_of(&result), &self.pool).await;
        settle(result, closed)
    }

    /// Call a synchronous stream-shaped root
    ///
    /// The returned iterator closes the call's scope when it is exhausted,
    /// when an item fails, or when it is dropped.
    pub fn stream(&self, args: Arguments) -> Result<ResolvedIter> {
        let arguments = self.arguments(args);
        let cache = ResolutionCache::new();
        let stack = ResourceStack::new();
        let opened = {
            let resolution = Resolution::new(&self.provider, &arguments, &cache, &stack);
            SequentialResolver::new(resolution)
                .prepare(&self.node, &arguments, false)
                .and_then(|prepared| self.open_iter(prepared))
        };
        match opened {
            Ok(items) => Ok(ResolvedIter {
                items: Some(items),
                stack: Some(stack),
                node: Arc::clone(&self.node),
            }),
            Err(error) => {
                let closed = stack.close_all(&ScopeExit::failure(&error));
                settle(Err(error), closed)
            }
        }
    }

    fn open_iter(&self, prepared: Prepared) -> Result<ValueIter> {
        let Prepared::Ready(args) = prepared else {
            return Err(Error::internal("stream root resolved from cache"));
        };
        match self.node.producer().body() {
            Body::Stream(body) => body(args),
            _ => Err(Error::execution_mode(
                self.node.call_name(),
                "producer does not yield a synchronous stream",
            )),
        }
    }

    /// Call a stream-shaped root on the async executor
    ///
    /// Resolution starts when the stream is first polled. The call's scope
    /// is closed once the inner stream ends or fails.
    pub fn stream_async(&self, args: Arguments) -> ValueStream {
        let this = self.clone();
        let arguments = self.arguments(args);
        async_stream::stream! {
            let cache = ResolutionCache::new();
            let stack = ResourceStack::new();
            let opened = {
                let resolution = Resolution::new(&this.provider, &arguments, &cache, &stack);
                ConcurrentResolver::new(resolution, &this.pool)
                    .open_stream(&this.node)
                    .await
            };
            let mut items = match opened {
                Ok(items) => items,
                Err(error) => {
                    let closed = stack
                        .close_all_async(&ScopeExit::failure(&error), &this.pool)
                        .await;
                    yield settle::<Value>(Err(error), closed);
                    return;
                }
            };

            let mut failure = None;
            while let Some(item) = items.next().await {
                match item.and_then(|value| cast_item(&this.node, value)) {
                    Ok(value) => yield Ok(value),
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
            drop(items);

            let exit = failure.as_ref().map_or(ScopeExit::Success, ScopeExit::failure);
            let closed = stack.close_all_async(&exit, &this.pool).await;
            match failure {
                Some(error) => yield settle::<Value>(Err(error), closed),
                None => {
                    if let Err(error) = closed {
                        yield Err(error);
                    }
                }
            }
        }
        .boxed()
    }

    /// A producer that runs this injected function
    ///
    /// The producer reports the key of the original producer, so it can
    /// be depended upon and overridden exactly like the original.
    pub fn as_producer(&self) -> Producer {
        let original = self.node.producer();
        let injected = self.clone();
        let body = match original.body() {
            Body::Stream(_) => Body::Stream(Arc::new(move |args: CallArgs| {
                injected
                    .stream(args.into_arguments())
                    .map(|items| Box::new(items) as ValueIter)
            })),
            Body::AsyncStream(_) => Body::AsyncStream(Arc::new(move |args: CallArgs| {
                Ok(injected.stream_async(args.into_arguments()))
            })),
            _ if self.node.is_async() => Body::Async(Arc::new(move |args: CallArgs| {
                let injected = injected.clone();
                async move { injected.call_async(args.into_arguments()).await }.boxed()
            })),
            _ => Body::Sync(Arc::new(move |args: CallArgs| {
                injected.call(args.into_arguments())
            })),
        };
        Producer::wrapping(original, original.name(), original.signature().clone(), body)
    }
}

/// Iterator over the items of a synchronous stream-shaped root
///
/// Owns the call's scope; the scope closes once the items are exhausted,
/// an item fails, or the iterator is dropped.
pub struct ResolvedIter {
    items: Option<ValueIter>,
    stack: Option<ResourceStack>,
    node: Arc<CallNode>,
}

impl ResolvedIter {
    fn close(&mut self, exit: &ScopeExit) -> Result<()> {
        self.items = None;
        match self.stack.take() {
            Some(stack) => stack.close_all(exit),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        let closed = self.close(&ScopeExit::failure(&error));
        match settle::<()>(Err(error), closed) {
            Err(error) => error,
            Ok(()) => Error::internal("stream failure lost"),
        }
    }
}

impl Iterator for ResolvedIter {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.as_mut()?.next();
        match item {
            Some(Ok(value)) => match cast_item(&self.node, value) {
                Ok(value) => Some(Ok(value)),
                Err(error) => Some(Err(self.fail(error))),
            },
            Some(Err(error)) => Some(Err(self.fail(error))),
            None => match self.close(&ScopeExit::Success) {
                Ok(()) => None,
                Err(error) => Some(Err(error)),
            },
        }
    }
}

impl std::fmt::Debug for ResolvedIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedIter")
            .field("call", &self.node.call_name())
            .field("open", &self.items.is_some())
            .finish()
    }
}

impl Drop for ResolvedIter {
    fn drop(&mut self) {
        if self.stack.is_some() {
            let exit = ScopeExit::Failure {
                message: "stream dropped before exhaustion".to_string(),
            };
            if let Err(error) = self.close(&exit) {
                warn!(error = %error, "Cleanup failed while dropping stream");
            }
        }
    }
}

/// Injection defaults shared by many injected functions
#[derive(Debug, Clone)]
pub struct Injector {
    provider: Arc<Provider>,
    options: InjectOptions,
}

impl Injector {
    /// Injector over `provider` with `options` as defaults
    pub fn new(provider: Arc<Provider>, mut options: InjectOptions) -> Self {
        options.pool.get_or_insert_with(BlockingPool::default);
        Self { provider, options }
    }

    /// Shared provider
    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Default options
    pub fn options(&self) -> &InjectOptions {
        &self.options
    }

    /// Inject `producer` with the default options
    pub fn inject(&self, producer: &Producer) -> Result<Injected> {
        inject(producer, Arc::clone(&self.provider), self.options.clone())
    }

    /// Inject `producer` with options adjusted from the defaults
    pub fn inject_with<F>(&self, producer: &Producer, adjust: F) -> Result<Injected>
    where
        F: FnOnce(InjectOptions) -> InjectOptions,
    {
        inject(
            producer,
            Arc::clone(&self.provider),
            adjust(self.options.clone()),
        )
    }
}

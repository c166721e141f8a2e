//! Producers
//!
//! A producer is a named callable with an explicit [`Signature`]. Its body
//! takes one of six shapes:
//!
//! ```text
//!              plain        scoped            stream
//!   sync       Sync         Scoped            Stream
//!   async      Async        AsyncScoped       AsyncStream
//! ```
//!
//! Scoped bodies hand back a [`Resource`]: the produced value plus a
//! [`Closer`] that the resolver runs when the enclosing call finishes.
//! Stream bodies hand back a sequence of values.
//!
//! Every producer carries a [`ProducerKey`] that is unique for the life of
//! the process. A producer created with [`Producer::wrapping`] reports the
//! key of the producer it wraps, so registrations and overrides made
//! against the original also apply to the wrapper.

use super::Signature;
use crate::error::Result;
use crate::value_objects::CallArgs;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProducerKey(u64);

impl ProducerKey {
    fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProducerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Resources
// ============================================================================

/// How the scope holding a resource ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeExit {
    /// The call completed
    Success,
    /// The call failed with `message`
    Failure {
        /// Display form of the failure
        message: String,
    },
}

impl ScopeExit {
    /// Failure exit carrying the display form of `error`
    pub fn failure<E: fmt::Display>(error: &E) -> Self {
        Self::Failure {
            message: error.to_string(),
        }
    }

    /// Whether the scope ended successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Synchronous cleanup callback
pub type SyncCloser = Box<dyn FnOnce(ScopeExit) -> Result<()> + Send>;
/// Asynchronous cleanup callback
pub type AsyncCloser = Box<dyn FnOnce(ScopeExit) -> BoxFuture<'static, Result<()>> + Send>;

/// Cleanup attached to a scoped resource
pub enum Closer {
    /// Runs to completion on the calling thread
    Sync(SyncCloser),
    /// Awaited by the concurrent resolver
    Async(AsyncCloser),
}

impl Closer {
    /// Closer that only drops `value`
    pub fn dropping<T: Send + 'static>(value: T) -> Self {
        Self::Sync(Box::new(move |_| {
            drop(value);
            Ok(())
        }))
    }

    /// Whether this closer must be awaited
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for Closer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => write!(f, "Closer::Sync"),
            Self::Async(_) => write!(f, "Closer::Async"),
        }
    }
}

/// A produced value plus the cleanup that releases it
#[derive(Debug)]
pub struct Resource {
    /// Value handed to the consumer
    pub value: Value,
    /// Cleanup run when the enclosing call finishes
    pub closer: Closer,
}

impl Resource {
    /// Resource with a synchronous closer
    pub fn new<V, F>(value: V, close: F) -> Self
    where
        V: Into<Value>,
        F: FnOnce(ScopeExit) -> Result<()> + Send + 'static,
    {
        Self {
            value: value.into(),
            closer: Closer::Sync(Box::new(close)),
        }
    }

    /// Resource with an asynchronous closer
    pub fn with_async_close<V, F, Fut>(value: V, close: F) -> Self
    where
        V: Into<Value>,
        F: FnOnce(ScopeExit) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            value: value.into(),
            closer: Closer::Async(Box::new(move |exit| close(exit).boxed())),
        }
    }
}

// ============================================================================
// Bodies
// ============================================================================

/// Iterator produced by a synchronous stream body
pub type ValueIter = Box<dyn Iterator<Item = Result<Value>> + Send>;
/// Stream produced by an asynchronous stream body
pub type ValueStream = BoxStream<'static, Result<Value>>;

/// `fn(args) -> value`
pub type SyncBody = Arc<dyn Fn(CallArgs) -> Result<Value> + Send + Sync>;
/// `async fn(args) -> value`
pub type AsyncBody = Arc<dyn Fn(CallArgs) -> BoxFuture<'static, Result<Value>> + Send + Sync>;
/// `fn(args) -> resource`
pub type ScopedBody = Arc<dyn Fn(CallArgs) -> Result<Resource> + Send + Sync>;
/// `async fn(args) -> resource`
pub type AsyncScopedBody =
    Arc<dyn Fn(CallArgs) -> BoxFuture<'static, Result<Resource>> + Send + Sync>;
/// `fn(args) -> iterator`
pub type StreamBody = Arc<dyn Fn(CallArgs) -> Result<ValueIter> + Send + Sync>;
/// `fn(args) -> stream`
pub type AsyncStreamBody = Arc<dyn Fn(CallArgs) -> Result<ValueStream> + Send + Sync>;

/// The callable part of a producer
#[derive(Clone)]
pub enum Body {
    /// Synchronous function
    Sync(SyncBody),
    /// Asynchronous function
    Async(AsyncBody),
    /// Synchronous function returning a resource
    Scoped(ScopedBody),
    /// Asynchronous function returning a resource
    AsyncScoped(AsyncScopedBody),
    /// Synchronous generator
    Stream(StreamBody),
    /// Asynchronous generator
    AsyncStream(AsyncStreamBody),
}

impl Body {
    /// Whether the body must be awaited or polled asynchronously
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_) | Self::AsyncScoped(_) | Self::AsyncStream(_))
    }

    /// Whether the body yields a sequence of values
    pub fn is_generator(&self) -> bool {
        matches!(self, Self::Stream(_) | Self::AsyncStream(_))
    }

    /// Whether the body returns a resource needing cleanup
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Scoped(_) | Self::AsyncScoped(_))
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::Async(_) => "async",
            Self::Scoped(_) => "scoped",
            Self::AsyncScoped(_) => "async_scoped",
            Self::Stream(_) => "stream",
            Self::AsyncStream(_) => "async_stream",
        }
    }
}

// ============================================================================
// Producer
// ============================================================================

struct ProducerInner {
    key: ProducerKey,
    wraps: Option<ProducerKey>,
    name: String,
    signature: Signature,
    body: Body,
}

/// Entity: a named callable that can take part in a call graph
///
/// Cloning is cheap and preserves identity.
///
/// # Example
///
/// ```
/// use solvent_domain::{Param, Producer, Signature, TypeHint};
/// use serde_json::json;
///
/// let add = Producer::sync(
///     "add",
///     Signature::new()
///         .param(Param::positional("a", TypeHint::Int))
///         .param(Param::positional("b", TypeHint::Int)),
///     |args| Ok(json!(args.value::<i64>("a")? + args.value::<i64>("b")?)),
/// );
/// assert!(!add.is_async());
/// ```
#[derive(Clone)]
pub struct Producer {
    inner: Arc<ProducerInner>,
}

impl Producer {
    fn with_body<S: Into<String>>(name: S, signature: Signature, body: Body) -> Self {
        Self {
            inner: Arc::new(ProducerInner {
                key: ProducerKey::next(),
                wraps: None,
                name: name.into(),
                signature,
                body,
            }),
        }
    }

    /// Producer with a synchronous body
    pub fn sync<S, F>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self::with_body(name, signature, Body::Sync(Arc::new(body)))
    }

    /// Producer with an asynchronous body
    pub fn asynchronous<S, F, Fut>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::with_body(
            name,
            signature,
            Body::Async(Arc::new(move |args| body(args).boxed())),
        )
    }

    /// Producer with a synchronous body returning a [`Resource`]
    pub fn scoped<S, F>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Result<Resource> + Send + Sync + 'static,
    {
        Self::with_body(name, signature, Body::Scoped(Arc::new(body)))
    }

    /// Producer with an asynchronous body returning a [`Resource`]
    pub fn async_scoped<S, F, Fut>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resource>> + Send + 'static,
    {
        Self::with_body(
            name,
            signature,
            Body::AsyncScoped(Arc::new(move |args| body(args).boxed())),
        )
    }

    /// Producer yielding values from an iterator
    pub fn stream<S, F, I>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Result<I> + Send + Sync + 'static,
        I: Iterator<Item = Result<Value>> + Send + 'static,
    {
        Self::with_body(
            name,
            signature,
            Body::Stream(Arc::new(move |args| {
                body(args).map(|iter| Box::new(iter) as ValueIter)
            })),
        )
    }

    /// Producer yielding values from an asynchronous stream
    pub fn async_stream<S, F, St>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(CallArgs) -> Result<St> + Send + Sync + 'static,
        St: Stream<Item = Result<Value>> + Send + 'static,
    {
        Self::with_body(
            name,
            signature,
            Body::AsyncStream(Arc::new(move |args| {
                body(args).map(|stream| Box::pin(stream) as ValueStream)
            })),
        )
    }

    /// Producer standing in for `original`
    ///
    /// The result reports `original`'s key, so registrations and overrides
    /// keyed by the original apply to it as well.
    pub fn wrapping<S: Into<String>>(
        original: &Producer,
        name: S,
        signature: Signature,
        body: Body,
    ) -> Self {
        Self {
            inner: Arc::new(ProducerInner {
                key: ProducerKey::next(),
                wraps: Some(original.key()),
                name: name.into(),
                signature,
                body,
            }),
        }
    }

    /// Identity used for registration, overrides and caching
    pub fn key(&self) -> ProducerKey {
        self.inner.wraps.unwrap_or(self.inner.key)
    }

    /// Identity of this producer object, ignoring wrapping
    pub fn own_key(&self) -> ProducerKey {
        self.inner.key
    }

    /// Whether this producer wraps another
    pub fn is_wrapper(&self) -> bool {
        self.inner.wraps.is_some()
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared parameters and return type
    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// Callable body
    pub fn body(&self) -> &Body {
        &self.inner.body
    }

    /// Whether the body is asynchronous
    pub fn is_async(&self) -> bool {
        self.inner.body.is_async()
    }

    /// Whether the body yields a sequence of values
    pub fn is_generator(&self) -> bool {
        self.inner.body.is_generator()
    }

    /// Whether the body returns a resource needing cleanup
    pub fn is_scoped(&self) -> bool {
        self.inner.body.is_scoped()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("key", &self.key())
            .field("name", &self.inner.name)
            .field("body", &self.inner.body.shape())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Producer {}

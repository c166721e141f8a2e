//! Resource Scope
//!
//! Scoped dependencies push a [`Closer`] when their resource opens. The
//! stack is unwound once per top-level call, newest first, whatever the
//! outcome of the call:
//!
//! ```text
//!   open db ─▶ open tx ─▶ call ─▶ close tx ─▶ close db
//! ```
//!
//! Every closer runs even when an earlier one fails. When the call itself
//! failed its error wins and close failures are only logged.

use super::BlockingPool;
use serde_json::Value;
use solvent_domain::{Closer, Error, Resource, Result, ScopeExit};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Stack of cleanups owed by one top-level call
#[derive(Debug, Default)]
pub struct ResourceStack {
    closers: Mutex<Vec<Closer>>,
}

impl ResourceStack {
    /// Empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the cleanup of a freshly opened resource
    pub fn push(&self, closer: Closer) {
        self.closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(closer);
    }

    /// Number of open resources
    pub fn len(&self) -> usize {
        self.closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no resource is open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn drain(&self) -> Vec<Closer> {
        let mut closers = self
            .closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *closers)
    }

    /// Close every resource synchronously, newest first
    ///
    /// Async closers cannot run here; they are reported as an error after
    /// the remaining closers ran.
    pub fn close_all(&self, exit: &ScopeExit) -> Result<()> {
        let mut first_error = None;
        for closer in self.drain().into_iter().rev() {
            let closed = match closer {
                Closer::Sync(close) => close(exit.clone()),
                Closer::Async(_) => Err(Error::execution_mode(
                    "resource scope",
                    "async cleanup cannot run in a synchronous call",
                )),
            };
            record(&mut first_error, closed);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Close every resource, newest first, awaiting async closers
    ///
    /// Sync closers run on `pool`.
    pub async fn close_all_async(&self, exit: &ScopeExit, pool: &BlockingPool) -> Result<()> {
        let mut first_error = None;
        for closer in self.drain().into_iter().rev() {
            let closed = match closer {
                Closer::Sync(close) => {
                    let exit = exit.clone();
                    pool.run(move || close(exit)).await
                }
                Closer::Async(close) => close(exit.clone()).await,
            };
            record(&mut first_error, closed);
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn record(first_error: &mut Option<Error>, closed: Result<()>) {
    if let Err(error) = closed {
        if first_error.is_none() {
            *first_error = Some(error);
        } else {
            warn!(error = %error, "Additional cleanup failure suppressed");
        }
    }
}

impl Drop for ResourceStack {
    fn drop(&mut self) {
        let closers = self.drain();
        if closers.is_empty() {
            return;
        }
        let exit = ScopeExit::Failure {
            message: "scope dropped before completion".to_string(),
        };
        for closer in closers.into_iter().rev() {
            close_detached(closer, exit.clone());
        }
    }
}

/// A resource opened off the executor that no scope owns yet
///
/// A blocking job may finish after the future waiting for it was dropped.
/// Its resource then never reaches a [`ResourceStack`], so dropping the
/// unclaimed resource closes it with a failure exit.
#[derive(Debug)]
pub(crate) struct Unclaimed {
    value: Value,
    closer: Option<Closer>,
}

impl Unclaimed {
    pub(crate) fn new(resource: Resource) -> Self {
        Self {
            value: resource.value,
            closer: Some(resource.closer),
        }
    }

    /// Hand the cleanup to `stack` and return the value
    pub(crate) fn claim(mut self, stack: &ResourceStack) -> Value {
        if let Some(closer) = self.closer.take() {
            stack.push(closer);
        }
        std::mem::take(&mut self.value)
    }
}

impl Drop for Unclaimed {
    fn drop(&mut self) {
        if let Some(closer) = self.closer.take() {
            let exit = ScopeExit::Failure {
                message: "call abandoned before the resource was used".to_string(),
            };
            close_detached(closer, exit);
        }
    }
}

/// Run a closer nobody awaits
///
/// Sync closers run in place. Async closers are spawned on the current
/// runtime; outside one they cannot run and are only logged.
fn close_detached(closer: Closer, exit: ScopeExit) {
    match closer {
        Closer::Sync(close) => {
            if let Err(error) = close(exit) {
                warn!(error = %error, "Detached cleanup failed");
            }
        }
        Closer::Async(close) => match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = close(exit).await {
                        warn!(error = %error, "Detached cleanup failed");
                    }
                });
            }
            Err(_) => warn!("Async cleanup skipped outside a runtime"),
        },
    }
}

/// Exit status matching the outcome of a call
pub(crate) fn exit_of<T>(result: &Result<T>) -> ScopeExit {
    match result {
        Ok(_) => ScopeExit::Success,
        Err(error) => ScopeExit::failure(error),
    }
}

/// Combine a call outcome with the outcome of closing its scope
///
/// The call's error wins; a close error surfaces only after a success.
pub(crate) fn settle<T>(result: Result<T>, closed: Result<()>) -> Result<T> {
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            warn!(error = %close_error, "Cleanup failure suppressed by call failure");
            Err(error)
        }
    }
}

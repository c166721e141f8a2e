//! Shared helpers for the application tests

#![allow(dead_code)]

use serde_json::Value;
use solvent_application::{InjectOptions, Injected, Provider, inject};
use solvent_domain::{Producer, Signature};
use solvent_providers::JsonCaster;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared invocation counter
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// Current value of a counter
pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Producer without parameters returning `value`
pub fn constant(name: &str, value: Value) -> Producer {
    Producer::sync(name, Signature::new(), move |_| Ok(value.clone()))
}

/// Producer without parameters returning `value` and counting its calls
pub fn counted(name: &str, calls: &Arc<AtomicUsize>, value: Value) -> Producer {
    let calls = Arc::clone(calls);
    Producer::sync(name, Signature::new(), move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value.clone())
    })
}

/// Ordered event log
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&self, event: S) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Logs `event` when dropped
pub struct DropLog {
    pub log: EventLog,
    pub event: &'static str,
}

impl Drop for DropLog {
    fn drop(&mut self) {
        self.log.push(self.event);
    }
}

/// Fresh shared provider
pub fn provider() -> Arc<Provider> {
    Arc::new(Provider::new())
}

/// Options validating through the JSON caster
pub fn casting() -> InjectOptions {
    InjectOptions::default().with_validator_factory(Arc::new(JsonCaster::new()))
}

/// Inject with the JSON caster
pub fn injected(producer: &Producer, provider: &Arc<Provider>) -> Injected {
    inject(producer, Arc::clone(provider), casting()).expect("inject")
}

/// Inject without any validator
pub fn injected_plain(producer: &Producer, provider: &Arc<Provider>) -> Injected {
    inject(producer, Arc::clone(provider), InjectOptions::default()).expect("inject")
}

//! Dependency Descriptors

use super::{Producer, ProducerKey};
use crate::constants::{DEFAULT_CAST, DEFAULT_DEPENDANT_CAST_RESULT, DEFAULT_USE_CACHE};
use std::fmt;

/// Entity: a declared dependency on a producer
///
/// Two descriptors are equal when they name the same producer, whatever
/// their flags.
#[derive(Clone)]
pub struct Dependant {
    producer: Producer,
    /// Share one result per top-level call
    pub use_cache: bool,
    /// Validate the produced value against the consumer's annotation
    pub cast: bool,
    /// Cast the produced value against the producer's own return hint
    pub cast_result: bool,
}

impl Dependant {
    /// Descriptor with default flags
    pub fn new(producer: &Producer) -> Self {
        Self {
            producer: producer.clone(),
            use_cache: DEFAULT_USE_CACHE,
            cast: DEFAULT_CAST,
            cast_result: DEFAULT_DEPENDANT_CAST_RESULT,
        }
    }

    /// Evaluate the producer on every use
    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Set whether the result is shared per call
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set whether the produced value is validated by the consumer
    pub fn with_cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Set whether the producer casts its own return value
    pub fn with_cast_result(mut self, cast_result: bool) -> Self {
        self.cast_result = cast_result;
        self
    }

    /// The producer depended upon
    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Key of the producer depended upon
    pub fn key(&self) -> ProducerKey {
        self.producer.key()
    }
}

impl fmt::Debug for Dependant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = if self.use_cache { "" } else { ", no_cache" };
        write!(f, "Depends({}{cache})", self.producer.name())
    }
}

impl PartialEq for Dependant {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Dependant {}

/// Declare a dependency on `producer` with default flags
pub fn depends(producer: &Producer) -> Dependant {
    Dependant::new(producer)
}

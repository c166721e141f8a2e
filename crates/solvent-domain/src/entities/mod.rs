//! Entities
//!
//! Producers and the declarations that connect them: signatures, parameter
//! markers and dependency descriptors.

/// Dependency descriptors
pub mod dependant;
/// Producers, bodies and scoped resources
pub mod producer;
/// Parameter declarations
pub mod signature;

pub use dependant::{Dependant, depends};
pub use producer::{
    AsyncBody, AsyncCloser, AsyncScopedBody, AsyncStreamBody, Body, Closer, Producer, ProducerKey,
    Resource, ScopeExit, ScopedBody, StreamBody, SyncBody, SyncCloser, ValueIter, ValueStream,
};
pub use signature::{Marker, Param, ParamDefault, ParamKind, Signature};

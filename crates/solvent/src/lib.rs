//! # Solvent
//!
//! Call-graph dependency resolution for plain functions.
//!
//! A producer declares its parameters; some of them name other producers as
//! dependencies, some read values from the incoming arguments through custom
//! fields. Solvent builds the graph once, then resolves it per call,
//! sequentially or concurrently, caching shared dependencies and releasing
//! scoped resources when the call ends.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use solvent::prelude::*;
//! use std::sync::Arc;
//!
//! let base = Producer::sync("base", Signature::new(), |_| Ok(json!(10)));
//! let total = Producer::sync(
//!     "total",
//!     Signature::new()
//!         .param(Param::positional("extra", TypeHint::Int))
//!         .param(Param::dependency("base", TypeHint::Int, depends(&base))),
//!     |args| Ok(json!(args.value::<i64>("extra")? + args.value::<i64>("base")?)),
//! );
//!
//! let provider = Arc::new(Provider::new());
//! let injected = inject(&total, provider, InjectOptions::new()).unwrap();
//! assert_eq!(injected.call(Arguments::positional([5])).unwrap(), json!(15));
//! ```
//!
//! ## Architecture
//!
//! - `domain` - producers, signatures, plug-in ports and errors
//! - `application` - graph builder, provider, resolvers and injection
//! - `providers` - the JSON casting validator and context custom fields
//! - `infrastructure` - configuration, logging and injector bootstrap

/// Domain layer - producers, signatures and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use solvent_domain::*;
}

/// Application layer - graph building and resolution
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use solvent_application::*;
}

/// Providers - validator and custom-field implementations
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use solvent_providers::*;
}

/// Infrastructure layer - config, logging and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use solvent_infrastructure::*;
}

/// Types needed to declare, inject and call producers
pub mod prelude {
    pub use solvent_application::{
        BlockingPool, InjectOptions, Injected, Injector, Provider, inject,
    };
    pub use solvent_domain::{
        Arguments, CustomField, Dependant, Error, Param, Producer, Resource, Result, Signature,
        TypeHint, depends,
    };
    pub use solvent_providers::{ContextKey, ContextValue, JsonCaster};
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the injection entry points at the crate root
pub use application::{InjectOptions, Injected, Injector, Provider, inject};

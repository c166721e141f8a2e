//! Application Layer - Solvent
//!
//! Turns producers into resolvable call graphs and resolves them.
//!
//! ## Architecture
//!
//! ```text
//!   Producer ──build_call_node──▶ CallNode ──registered──▶ Provider
//!                                    │                        │
//!                                 inject()                overrides
//!                                    ▼                        │
//!                                Injected ──call()──▶ Resolver ◀┘
//!                                                       │
//!                                     ResolutionCache ◀─┴─▶ ResourceStack
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: static pass over a producer's signature
//! - [`call_node`]: the immutable resolvable unit
//! - [`provider`]: node registry with reversible overrides
//! - [`resolver`]: sequential and concurrent execution
//! - [`inject`]: the injected-function factory
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `solvent-domain`: producers, signatures, plug-in ports and errors
//! - Pure Rust libraries for async execution and concurrent maps

pub mod builder;
pub mod call_node;
pub mod inject;
pub mod provider;
pub mod resolver;

pub use builder::{BuildOptions, build_call_node};
pub use call_node::CallNode;
pub use inject::{InjectOptions, Injected, Injector, ResolvedIter, inject, inject_node};
pub use provider::{OverrideScope, Provider};
pub use resolver::{
    BlockingPool, ConcurrentResolver, PlannedNode, Resolution, ResolutionCache, ResolutionPlan,
    ResourceStack, SequentialResolver,
};

//! Domain Layer - Solvent
//!
//! Core types of the call-graph dependency resolver. Nothing in this crate
//! resolves anything; it describes what can be resolved.
//!
//! ## Contents
//!
//! - [`entities`]: producers, their signatures and dependency descriptors
//! - [`value_objects`]: argument containers, type hints and option items
//! - [`ports`]: validator and custom-field plug-in contracts
//! - [`error`]: the crate-wide error type
//!
//! ## Dependencies
//!
//! This crate depends only on pure libraries for serialization, errors and
//! boxed futures.

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::*;
pub use error::{Error, FieldError, Result, ValidationError};
pub use ports::*;
pub use value_objects::*;

//! # Solvent - Plug-in Implementations
//!
//! Reference implementations of the plug-in ports defined in
//! `solvent-domain`. Hosts may use them as they are or supply their own.
//!
//! ## Plug-in Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Validation | `ValidatorFactory` | `JsonCaster` |
//! | Custom fields | `CustomField` | `ContextKey`, `ContextValue` |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! solvent-providers = { version = "0.1", default-features = false, features = ["validation-json"] }
//! ```

// Re-export solvent-domain types commonly used with providers
pub use solvent_domain::error::{Error, Result};
pub use solvent_domain::ports::{CustomField, FieldMode, Validator, ValidatorFactory};

/// Validator implementations
#[cfg(feature = "validation-json")]
pub mod validation;

/// Custom field implementations
#[cfg(feature = "fields-context")]
pub mod fields;

#[cfg(feature = "validation-json")]
pub use validation::JsonCaster;

#[cfg(feature = "fields-context")]
pub use fields::{ContextKey, ContextValue};

//! Domain Port Interfaces
//!
//! Plug-in contracts the resolver calls into. The resolver never inspects
//! types or reads request context itself; it delegates to these ports.
//!
//! ## Organization
//!
//! - **validator** - argument validation and result casting
//! - **custom_field** - values injected from out-of-band context

/// Custom-field plug-in
pub mod custom_field;
/// Validator plug-in
pub mod validator;

pub use custom_field::{CustomField, FieldMode};
pub use validator::{Validator, ValidatorFactory};

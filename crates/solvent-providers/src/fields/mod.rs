//! Context custom fields
//!
//! Fields that inject parameter values from context the caller passes
//! out of band.

mod context_key;
mod context_value;

pub use context_key::ContextKey;
pub use context_value::ContextValue;

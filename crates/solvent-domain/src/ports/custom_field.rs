//! Custom Field Port
//!
//! A custom field injects a parameter value from context the caller passed
//! out of band, e.g. a header map. Fields work in one of two modes:
//!
//! - [`FieldMode::Use`]: the field receives the whole accumulated argument
//!   map and returns a replacement.
//! - [`FieldMode::Field`]: the field computes only its own value, which the
//!   resolver writes under the parameter name. Field-mode fields of one
//!   node may run concurrently.

use crate::error::Result;
use crate::value_objects::KwArgs;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// How a custom field contributes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    /// Transform the whole argument map
    #[default]
    Use,
    /// Compute a single value
    Field,
}

/// Plug-in injecting a parameter value from out-of-band context
#[async_trait]
pub trait CustomField: Send + Sync + Debug {
    /// How the field contributes its value
    fn mode(&self) -> FieldMode {
        FieldMode::Use
    }

    /// Whether the injected value is validated against the annotation
    fn cast(&self) -> bool {
        true
    }

    /// Whether a value must be present; optional fields default to `null`
    fn required(&self) -> bool {
        true
    }

    /// Whether the field must be awaited
    fn is_async(&self) -> bool {
        false
    }

    /// Transform the argument map for parameter `param`
    fn use_kwargs(&self, param: &str, kwargs: KwArgs) -> Result<KwArgs> {
        let _ = param;
        Ok(kwargs)
    }

    /// Compute the value of parameter `param`; `None` leaves it unset
    fn use_field(&self, param: &str, kwargs: &KwArgs) -> Result<Option<Value>> {
        Ok(kwargs.get(param).cloned())
    }

    /// Asynchronous counterpart of [`CustomField::use_kwargs`]
    async fn use_kwargs_async(&self, param: &str, kwargs: KwArgs) -> Result<KwArgs> {
        self.use_kwargs(param, kwargs)
    }

    /// Asynchronous counterpart of [`CustomField::use_field`]
    async fn use_field_async(&self, param: &str, kwargs: &KwArgs) -> Result<Option<Value>> {
        self.use_field(param, kwargs)
    }
}

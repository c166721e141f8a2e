//! Context Value Field

use serde_json::Value;
use solvent_domain::{CustomField, FieldMode, KwArgs, Result};

/// Injects a fixed value, unless the caller supplied the parameter
#[derive(Debug, Clone)]
pub struct ContextValue {
    value: Value,
    asynchronous: bool,
}

impl ContextValue {
    /// Field supplying `value`
    pub fn new<V: Into<Value>>(value: V) -> Self {
        Self {
            value: value.into(),
            asynchronous: false,
        }
    }

    /// Declare the field asynchronous; sync graphs will refuse it
    pub fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }
}

impl CustomField for ContextValue {
    fn mode(&self) -> FieldMode {
        FieldMode::Field
    }

    fn is_async(&self) -> bool {
        self.asynchronous
    }

    fn use_field(&self, param: &str, kwargs: &KwArgs) -> Result<Option<Value>> {
        Ok(Some(
            kwargs
                .get(param)
                .cloned()
                .unwrap_or_else(|| self.value.clone()),
        ))
    }
}

//! Option Items
//!
//! One entry per value a validator expects: its name, declared type,
//! default and where the value comes from.

use super::TypeHint;
use serde_json::Value;
use std::fmt;

/// Where the value of an option comes from at call time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// Supplied by the caller (positionally or by keyword)
    Caller,
    /// Produced by the named dependency
    Dependency(String),
    /// Injected by a custom field
    CustomField(String),
}

/// Value Object: expected option of a call node
#[derive(Debug, Clone, PartialEq)]
pub struct OptionItem {
    /// Parameter name
    pub field_name: String,
    /// Declared type
    pub field_type: TypeHint,
    /// Default value; `None` means the option is required
    pub default_value: Option<Value>,
    /// Origin of the value
    pub source: OptionSource,
}

impl OptionItem {
    /// A required caller-supplied option
    pub fn new<S: Into<String>>(field_name: S, field_type: TypeHint) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            default_value: None,
            source: OptionSource::Caller,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: OptionSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the caller must provide a value
    pub fn is_required(&self) -> bool {
        self.default_value.is_none()
    }
}

impl fmt::Display for OptionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_name, self.field_type)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

//! Signatures
//!
//! The explicit parameter list of a producer. A parameter may carry
//! markers in two positions, mirroring an annotated declaration:
//!
//! - `markers`: attached to the annotation
//! - `default`: a marker (or a plain value) in the default position
//!
//! The builder decides which combinations are legal.

use super::Dependant;
use crate::ports::CustomField;
use crate::value_objects::TypeHint;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How a parameter receives its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// By position or by name
    Positional,
    /// By name only
    KeywordOnly,
    /// Collects surplus positional values
    VarArgs,
    /// Collects surplus keyword values
    VarKwargs,
}

impl ParamKind {
    /// Whether the parameter collects surplus values
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::VarArgs | Self::VarKwargs)
    }
}

/// Marker declaring where a parameter's value comes from
#[derive(Clone)]
pub enum Marker {
    /// Produced by a dependency
    Depends(Dependant),
    /// Injected by a custom field
    Custom(Arc<dyn CustomField>),
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depends(dependant) => write!(f, "{dependant:?}"),
            Self::Custom(field) => write!(f, "{field:?}"),
        }
    }
}

/// Default position of a parameter
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// A plain default value
    Value(Value),
    /// A marker written as the default
    Marker(Marker),
}

/// One declared parameter
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// How it receives its value
    pub kind: ParamKind,
    /// Declared type
    pub annotation: TypeHint,
    /// Markers attached to the annotation
    pub markers: Vec<Marker>,
    /// Default value or default-position marker
    pub default: Option<ParamDefault>,
}

impl Param {
    fn new<S: Into<String>>(name: S, kind: ParamKind, annotation: TypeHint) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation,
            markers: Vec::new(),
            default: None,
        }
    }

    /// Parameter accepted by position or by name
    pub fn positional<S: Into<String>>(name: S, annotation: TypeHint) -> Self {
        Self::new(name, ParamKind::Positional, annotation)
    }

    /// Parameter accepted by name only
    pub fn keyword_only<S: Into<String>>(name: S, annotation: TypeHint) -> Self {
        Self::new(name, ParamKind::KeywordOnly, annotation)
    }

    /// Parameter collecting surplus positional values
    pub fn var_args<S: Into<String>>(name: S) -> Self {
        Self::new(name, ParamKind::VarArgs, TypeHint::Any)
    }

    /// Parameter collecting surplus keyword values
    pub fn var_kwargs<S: Into<String>>(name: S) -> Self {
        Self::new(name, ParamKind::VarKwargs, TypeHint::Any)
    }

    /// Parameter whose value is produced by `dependant`
    pub fn dependency<S: Into<String>>(name: S, annotation: TypeHint, dependant: Dependant) -> Self {
        Self::positional(name, annotation).default_depends(dependant)
    }

    /// Parameter whose value is injected by `field`
    pub fn custom_field<S: Into<String>>(
        name: S,
        annotation: TypeHint,
        field: Arc<dyn CustomField>,
    ) -> Self {
        Self::positional(name, annotation).default_custom(field)
    }

    /// Set a plain default value
    pub fn with_default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(ParamDefault::Value(value.into()));
        self
    }

    /// Attach a dependency marker to the annotation
    pub fn depends(self, dependant: Dependant) -> Self {
        self.with_marker(Marker::Depends(dependant))
    }

    /// Attach a custom-field marker to the annotation
    pub fn custom(self, field: Arc<dyn CustomField>) -> Self {
        self.with_marker(Marker::Custom(field))
    }

    /// Put a dependency marker in the default position
    pub fn default_depends(self, dependant: Dependant) -> Self {
        self.with_default_marker(Marker::Depends(dependant))
    }

    /// Put a custom-field marker in the default position
    pub fn default_custom(self, field: Arc<dyn CustomField>) -> Self {
        self.with_default_marker(Marker::Custom(field))
    }

    /// Attach any marker to the annotation
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Put any marker in the default position
    pub fn with_default_marker(mut self, marker: Marker) -> Self {
        self.default = Some(ParamDefault::Marker(marker));
        self
    }

    /// Plain default value, if any
    pub fn default_value(&self) -> Option<&Value> {
        match &self.default {
            Some(ParamDefault::Value(value)) => Some(value),
            _ => None,
        }
    }
}

/// Declared parameters and return type of a producer
#[derive(Debug, Clone, Default)]
pub struct Signature {
    /// Parameters in declaration order
    pub params: Vec<Param>,
    /// Declared return type
    pub returns: Option<TypeHint>,
}

impl Signature {
    /// Empty signature
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, hint: TypeHint) -> Self {
        self.returns = Some(hint);
        self
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

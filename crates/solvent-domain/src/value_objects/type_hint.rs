//! Type Hints
//!
//! The declared type of a parameter or return value. Validators use it to
//! check and coerce values; the resolver never inspects it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    /// Accepts anything, never coerced
    #[default]
    Any,
    /// Only `null`
    Null,
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// String
    Str,
    /// Homogeneous list
    List(Box<TypeHint>),
    /// String-keyed map with homogeneous values
    Map(Box<TypeHint>),
    /// `null` or the inner type
    Optional(Box<TypeHint>),
}

impl TypeHint {
    /// List of `inner`
    pub fn list(inner: TypeHint) -> Self {
        Self::List(Box::new(inner))
    }

    /// Map of `inner`
    pub fn map(inner: TypeHint) -> Self {
        Self::Map(Box::new(inner))
    }

    /// `inner` or null; optional hints are not wrapped twice
    pub fn optional(inner: TypeHint) -> Self {
        match inner {
            Self::Optional(_) | Self::Any | Self::Null => inner,
            other => Self::Optional(Box::new(other)),
        }
    }

    /// Whether `null` is an acceptable value
    pub fn accepts_null(&self) -> bool {
        matches!(self, Self::Any | Self::Null | Self::Optional(_))
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Null => write!(f, "None"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Map(inner) => write!(f, "dict[str, {inner}]"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
        }
    }
}

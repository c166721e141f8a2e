//! Error handling types

use crate::value_objects::OptionItem;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for building and resolving call graphs
#[derive(Error, Debug)]
pub enum Error {
    /// An async dependency was declared under a synchronous consumer
    #[error("You cannot use async dependency `{dependency}` at sync main `{consumer}`")]
    AsyncDependency {
        /// Name of the async producer
        dependency: String,
        /// Name of the synchronous consumer
        consumer: String,
    },

    /// An async custom field was declared under a synchronous consumer
    #[error("You cannot use async custom field `{field}` at sync `{consumer}`")]
    AsyncCustomField {
        /// Parameter the field is attached to
        field: String,
        /// Name of the synchronous consumer
        consumer: String,
    },

    /// More than one marker attached to a parameter annotation
    #[error("Cannot specify multiple markers for parameter `{param}`")]
    MultipleMarkers {
        /// Offending parameter
        param: String,
    },

    /// A parameter carries conflicting declarations
    #[error("Ambiguous declaration of parameter `{param}`: {message}")]
    AmbiguousParameter {
        /// Offending parameter
        param: String,
        /// What conflicts
        message: String,
    },

    /// The signature itself is malformed
    #[error("Invalid signature of `{call}`: {message}")]
    InvalidSignature {
        /// Producer name
        call: String,
        /// What is wrong
        message: String,
    },

    /// Argument validation or result casting failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A producer key is not registered in the provider
    #[error("Dependency not registered: {key}")]
    MissingDependency {
        /// Display form of the missing key
        key: String,
    },

    /// Overrides introduced a cycle into the effective graph
    #[error("Dependency cycle detected between: {}", members.join(", "))]
    DependencyCycle {
        /// Producers taking part in the cycle
        members: Vec<String>,
    },

    /// A producer body asked for an argument it was not given
    #[error("Missing argument `{name}` in call to `{call}`")]
    MissingArgument {
        /// Producer name
        call: String,
        /// Argument name
        name: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A node was invoked through an execution path it does not support
    #[error("Cannot execute `{call}`: {message}")]
    ExecutionMode {
        /// Producer name
        call: String,
        /// Why the path is unsupported
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic error from external sources
    #[error("Generic error: {0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error (task join, semaphore, poisoned state)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into().into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Build-time error creation methods
impl Error {
    /// Create an async-dependency-under-sync error
    pub fn async_dependency<D: Into<String>, C: Into<String>>(dependency: D, consumer: C) -> Self {
        Self::AsyncDependency {
            dependency: dependency.into(),
            consumer: consumer.into(),
        }
    }

    /// Create an async-custom-field-under-sync error
    pub fn async_custom_field<F: Into<String>, C: Into<String>>(field: F, consumer: C) -> Self {
        Self::AsyncCustomField {
            field: field.into(),
            consumer: consumer.into(),
        }
    }

    /// Create an ambiguous parameter error
    pub fn ambiguous<P: Into<String>, M: Into<String>>(param: P, message: M) -> Self {
        Self::AmbiguousParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature<C: Into<String>, M: Into<String>>(call: C, message: M) -> Self {
        Self::InvalidSignature {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised while building a graph
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::AsyncDependency { .. }
                | Self::AsyncCustomField { .. }
                | Self::MultipleMarkers { .. }
                | Self::AmbiguousParameter { .. }
                | Self::InvalidSignature { .. }
        )
    }
}

// Resolution error creation methods
impl Error {
    /// Create a missing dependency error
    pub fn missing_dependency<S: Into<String>>(key: S) -> Self {
        Self::MissingDependency { key: key.into() }
    }

    /// Create a missing argument error
    pub fn missing_argument<C: Into<String>, N: Into<String>>(call: C, name: N) -> Self {
        Self::MissingArgument {
            call: call.into(),
            name: name.into(),
        }
    }

    /// Create an execution mode error
    pub fn execution_mode<C: Into<String>, M: Into<String>>(call: C, message: M) -> Self {
        Self::ExecutionMode {
            call: call.into(),
            message: message.into(),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// ============================================================================
// Validation errors
// ============================================================================

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Location of the failure; empty for whole-value failures
    pub field: String,
    /// Human readable reason
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Aggregated failure of argument validation or result casting
///
/// `error_fields` lists the expected options named by the failures. When
/// no failure names a known option, every expected option is listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Producer whose arguments or result failed
    pub call: String,
    /// Values as they arrived at the validator
    pub incoming: Value,
    /// Expected options involved in the failure
    pub error_fields: Vec<OptionItem>,
    /// Individual failures
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Aggregate `errors` against the `expected` options
    pub fn new<S: Into<String>>(
        call: S,
        incoming: Value,
        expected: &[OptionItem],
        errors: Vec<FieldError>,
    ) -> Self {
        let mut error_fields: Vec<OptionItem> = Vec::new();
        for error in &errors {
            if let Some(option) = expected.iter().find(|o| o.field_name == error.field)
                && !error_fields.iter().any(|o| o.field_name == option.field_name)
            {
                error_fields.push(option.clone());
            }
        }
        if error_fields.is_empty() {
            error_fields = expected.to_vec();
        }
        Self {
            call: call.into(),
            incoming,
            error_fields,
            errors,
        }
    }

    /// Names of the options involved in the failure
    pub fn field_names(&self) -> Vec<&str> {
        self.error_fields
            .iter()
            .map(|o| o.field_name.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for `{}`", self.call)?;
        write!(f, "\n    Incoming options: ")?;
        match &self.incoming {
            Value::Object(map) => {
                let content: Vec<String> = map.iter().map(|(k, v)| format!("{k}=`{v}`")).collect();
                write!(f, "{}", content.join(", "))?;
            }
            other => write!(f, "`{other}`")?,
        }
        write!(f, "\n    In the following option types error occurred:")?;
        for option in &self.error_fields {
            write!(f, "\n    {option}")?;
        }
        for error in &self.errors {
            if error.field.is_empty() {
                write!(f, "\n    - {}", error.message)?;
            } else {
                write!(f, "\n    - {}: {}", error.field, error.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

//! Validator Port
//!
//! A [`ValidatorFactory`] is handed the flat option list of a call node at
//! build time and returns a [`Validator`] bound to it. The resolver then
//! runs every argument map through [`Validator::validate`] before the body
//! is invoked, and every result through [`Validator::response`].

use crate::error::ValidationError;
use crate::value_objects::{KwArgs, OptionItem, TypeHint};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Validates and coerces the arguments and result of one call node
pub trait Validator: Send + Sync + Debug {
    /// Check and coerce an argument map
    ///
    /// Missing options with defaults are filled in. All failures are
    /// reported together in one [`ValidationError`].
    fn validate(&self, values: KwArgs) -> Result<KwArgs, ValidationError>;

    /// Check and coerce a produced value against the return hint
    fn response(&self, value: Value) -> Result<Value, ValidationError>;
}

/// Builds a [`Validator`] for a call node
pub trait ValidatorFactory: Send + Sync + Debug {
    /// Validator for the producer `call` expecting `options`
    fn build(
        &self,
        call: &str,
        options: &[OptionItem],
        response: Option<&TypeHint>,
    ) -> Arc<dyn Validator>;
}

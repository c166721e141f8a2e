//! JSON Caster
//!
//! [`ValidatorFactory`] building [`JsonValidator`]s. A validator checks
//! every expected option, fills defaults for missing ones and reports all
//! failures of one call together.

use super::coerce::coerce;
use serde_json::Value;
use solvent_domain::{
    FieldError, KwArgs, OptionItem, TypeHint, ValidationError, Validator, ValidatorFactory,
};
use std::sync::Arc;
use tracing::trace;

/// Name under which result failures are reported
const RETURN_FIELD: &str = "return";

/// Factory of JSON casting validators
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCaster {
    strict: bool,
}

impl JsonCaster {
    /// Lax caster coercing compatible values
    pub fn new() -> Self {
        Self::default()
    }

    /// Caster accepting only values of the declared JSON type
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Whether coercion is disabled
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl ValidatorFactory for JsonCaster {
    fn build(
        &self,
        call: &str,
        options: &[OptionItem],
        response: Option<&TypeHint>,
    ) -> Arc<dyn Validator> {
        Arc::new(JsonValidator {
            call: call.to_string(),
            options: options.to_vec(),
            response: response.cloned(),
            strict: self.strict,
        })
    }
}

/// Validator bound to the options of one call node
#[derive(Debug, Clone)]
pub struct JsonValidator {
    call: String,
    options: Vec<OptionItem>,
    response: Option<TypeHint>,
    strict: bool,
}

impl JsonValidator {
    /// Options this validator expects
    pub fn options(&self) -> &[OptionItem] {
        &self.options
    }

    /// Declared result type, if results are cast
    pub fn response_type(&self) -> Option<&TypeHint> {
        self.response.as_ref()
    }
}

impl Validator for JsonValidator {
    fn validate(&self, values: KwArgs) -> Result<KwArgs, ValidationError> {
        let incoming = Value::Object(values.clone());
        let mut values = values;
        let mut errors = Vec::new();

        for option in &self.options {
            let name = &option.field_name;
            match values.remove(name) {
                Some(value) => match coerce(&value, &option.field_type, self.strict) {
                    Ok(cast) => {
                        values.insert(name.clone(), cast);
                    }
                    Err(reason) => {
                        errors.push(FieldError::new(name, reason));
                        values.insert(name.clone(), value);
                    }
                },
                None => match &option.default_value {
                    Some(default) => {
                        values.insert(name.clone(), default.clone());
                    }
                    None => errors.push(FieldError::new(name, "field required")),
                },
            }
        }

        if errors.is_empty() {
            trace!(call = %self.call, "Arguments validated");
            Ok(values)
        } else {
            Err(ValidationError::new(
                &self.call,
                incoming,
                &self.options,
                errors,
            ))
        }
    }

    fn response(&self, value: Value) -> Result<Value, ValidationError> {
        let Some(hint) = &self.response else {
            return Ok(value);
        };
        coerce(&value, hint, self.strict).map_err(|reason| {
            ValidationError::new(
                &self.call,
                value.clone(),
                &[OptionItem::new(RETURN_FIELD, hint.clone())],
                vec![FieldError::new(RETURN_FIELD, reason)],
            )
        })
    }
}

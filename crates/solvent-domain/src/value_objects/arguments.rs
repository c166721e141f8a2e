//! Argument Containers
//!
//! [`Arguments`] is what a caller hands to an injected function.
//! [`CallArgs`] is what a producer body receives once every parameter has
//! been resolved, validated and defaulted.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keyword arguments and resolved parameter maps
pub type KwArgs = serde_json::Map<String, Value>;

/// Positional and keyword arguments supplied by a caller
///
/// The same `Arguments` are handed unchanged to every node of a call
/// graph, so a dependency can read any value the caller supplied.
///
/// # Example
///
/// ```
/// use solvent_domain::Arguments;
/// use serde_json::json;
///
/// let args = Arguments::new().arg(1).kwarg("b", "2");
/// assert_eq!(args.positional, vec![json!(1)]);
/// assert_eq!(args.keywords.get("b"), Some(&json!("2")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Positional values in call order
    pub positional: Vec<Value>,
    /// Keyword values
    pub keywords: KwArgs,
}

impl Arguments {
    /// Empty arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments made of positional values only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: KwArgs::new(),
        }
    }

    /// Arguments made of keyword values only
    pub fn keywords(keywords: KwArgs) -> Self {
        Self {
            positional: Vec::new(),
            keywords,
        }
    }

    /// Append a positional value
    pub fn arg<V: Into<Value>>(mut self, value: V) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword value
    pub fn kwarg<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Add keyword values that are not already present
    pub fn with_defaults(mut self, extra: &KwArgs) -> Self {
        for (name, value) in extra {
            if !self.keywords.contains_key(name) {
                self.keywords.insert(name.clone(), value.clone());
            }
        }
        self
    }

    /// Whether no argument was supplied
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// Resolved arguments handed to a producer body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    call: String,
    values: KwArgs,
    var_args: Vec<Value>,
    var_kwargs: KwArgs,
}

impl CallArgs {
    /// Assemble the arguments of a call to `call`
    pub fn new<S: Into<String>>(
        call: S,
        values: KwArgs,
        var_args: Vec<Value>,
        var_kwargs: KwArgs,
    ) -> Self {
        Self {
            call: call.into(),
            values,
            var_args,
            var_kwargs,
        }
    }

    /// Name of the producer being called
    pub fn call(&self) -> &str {
        &self.call
    }

    /// Raw value of a named parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserialize a named parameter
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| Error::missing_argument(&self.call, name))?;
        Ok(T::deserialize(value)?)
    }

    /// Deserialize a named parameter, treating absence and `null` as `None`
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(T::deserialize(value)?)),
        }
    }

    /// All named parameters
    pub fn values(&self) -> &KwArgs {
        &self.values
    }

    /// Extra positional values collected by a var-args parameter
    pub fn var_args(&self) -> &[Value] {
        &self.var_args
    }

    /// Extra keyword values collected by a var-kwargs parameter
    pub fn var_kwargs(&self) -> &KwArgs {
        &self.var_kwargs
    }

    /// Convert back into caller arguments, named values as keywords
    pub fn into_arguments(self) -> Arguments {
        let mut keywords = self.values;
        keywords.extend(self.var_kwargs);
        Arguments {
            positional: self.var_args,
            keywords,
        }
    }
}

//! Context Key Field
//!
//! Reads a parameter from a map the caller passed under a context name,
//! e.g. `headers`:
//!
//! ```text
//!   call(headers = {"user-agent": "curl"})
//!        │
//!        └── ContextKey::new("headers") on param `user_agent`
//!              reads headers["user_agent"] (or the configured alias)
//! ```

use solvent_domain::{CustomField, FieldMode, KwArgs, Result};
use tracing::trace;

/// Injects `kwargs[source][key]` into a parameter
#[derive(Debug, Clone)]
pub struct ContextKey {
    source: String,
    alias: Option<String>,
    cast: bool,
    required: bool,
}

impl ContextKey {
    /// Read the parameter from the map passed as `source`
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            alias: None,
            cast: true,
            required: true,
        }
    }

    /// Look the value up under `alias` instead of the parameter name
    pub fn with_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Allow the value to be absent; it then defaults to `null`
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Skip validation of the injected value
    pub fn without_cast(mut self) -> Self {
        self.cast = false;
        self
    }

    /// Name of the context map
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl CustomField for ContextKey {
    fn mode(&self) -> FieldMode {
        FieldMode::Use
    }

    fn cast(&self) -> bool {
        self.cast
    }

    fn required(&self) -> bool {
        self.required
    }

    fn use_kwargs(&self, param: &str, mut kwargs: KwArgs) -> Result<KwArgs> {
        if kwargs.contains_key(param) {
            return Ok(kwargs);
        }
        let key = self.alias.as_deref().unwrap_or(param);
        let found = kwargs
            .get(&self.source)
            .and_then(|context| context.as_object())
            .and_then(|context| context.get(key))
            .cloned();
        if let Some(value) = found {
            trace!(source = %self.source, key, "Context value injected");
            kwargs.insert(param.to_string(), value);
        }
        Ok(kwargs)
    }
}

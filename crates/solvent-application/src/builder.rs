//! Graph Builder
//!
//! Static pass over a producer's [`Signature`](solvent_domain::Signature)
//! producing a [`CallNode`]. Every parameter is classified:
//!
//! ```text
//!   marker in annotation / default ─┬─ Depends ──▶ dependency (child node)
//!                                   └─ Custom  ──▶ custom field
//!   no marker ──────────────────────────────────▶ plain (caller-supplied)
//! ```
//!
//! Dependencies are built recursively and registered in the provider;
//! the node keeps only their keys. Async-compatibility is checked here,
//! against the effective node (an override, when one is registered), so
//! a synchronous graph never meets an async producer at call time.

use crate::call_node::CallNode;
use crate::provider::Provider;
use serde_json::Value;
use solvent_domain::{
    CustomField, Dependant, Error, Marker, OptionItem, OptionSource, Param, ParamDefault,
    ParamKind, Producer, ProducerKey, Result, TypeHint, ValidatorFactory,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Options of a build pass
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Share the node's result per top-level call
    pub use_cache: bool,
    /// Force the synchronous model; `None` follows the producer
    pub is_sync: Option<bool>,
    /// Producers resolved for their side effects before the call
    pub extra_dependencies: Vec<Dependant>,
    /// Factory for the node's validator; `None` disables validation
    pub validator_factory: Option<Arc<dyn ValidatorFactory>>,
    /// Cast the result against the declared return hint
    pub cast_result: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            is_sync: None,
            extra_dependencies: Vec::new(),
            validator_factory: None,
            cast_result: true,
        }
    }
}

impl BuildOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set result sharing
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Force or release the synchronous model
    pub fn with_is_sync(mut self, is_sync: Option<bool>) -> Self {
        self.is_sync = is_sync;
        self
    }

    /// Add an extra dependency
    pub fn with_extra_dependency(mut self, dependant: Dependant) -> Self {
        self.extra_dependencies.push(dependant);
        self
    }

    /// Set the validator factory
    pub fn with_validator_factory(mut self, factory: Arc<dyn ValidatorFactory>) -> Self {
        self.validator_factory = Some(factory);
        self
    }

    /// Set result casting
    pub fn with_cast_result(mut self, cast_result: bool) -> Self {
        self.cast_result = cast_result;
        self
    }

    fn for_child(&self, dependant: &Dependant, is_sync: bool) -> Self {
        Self {
            use_cache: dependant.use_cache,
            is_sync: Some(is_sync),
            extra_dependencies: Vec::new(),
            validator_factory: self.validator_factory.clone(),
            cast_result: dependant.cast_result,
        }
    }
}

/// Build the call node of `producer`
///
/// Dependency nodes are built recursively and registered in `provider`.
/// The returned root node itself is not registered.
pub fn build_call_node(
    producer: &Producer,
    provider: &Provider,
    options: &BuildOptions,
) -> Result<Arc<CallNode>> {
    build_node(producer, provider, options, None).map(Arc::new)
}

enum Source<'a> {
    Dependency(&'a Dependant),
    Custom(&'a Arc<dyn CustomField>, Option<&'a Value>),
    Plain(Option<&'a Value>),
}

fn build_node(
    producer: &Producer,
    provider: &Provider,
    options: &BuildOptions,
    consumer: Option<&str>,
) -> Result<CallNode> {
    let name = producer.name();
    let is_async = producer.is_async();
    let is_sync = options.is_sync.unwrap_or(!is_async);
    if is_sync && is_async {
        return Err(Error::async_dependency(name, consumer.unwrap_or(name)));
    }

    let signature = producer.signature();
    check_signature(name, &signature.params)?;

    let mut node = CallNode {
        producer: producer.clone(),
        is_async,
        is_generator: producer.is_generator(),
        use_cache: options.use_cache,
        cast_result: options.cast_result,
        params: Vec::new(),
        options: Vec::new(),
        dependencies: Vec::new(),
        extra_dependencies: Vec::new(),
        custom_fields: Vec::new(),
        positional_names: Vec::new(),
        keyword_names: Vec::new(),
        var_args_name: None,
        var_kwargs_name: None,
        validator: None,
        validator_factory: options.validator_factory.clone(),
    };

    for param in &signature.params {
        match classify(param)? {
            Source::Dependency(dependant) => {
                let key = build_child(dependant, provider, options, is_sync, name)?;
                let field_type = if dependant.cast {
                    param.annotation.clone()
                } else {
                    TypeHint::Any
                };
                node.options.push(
                    OptionItem::new(&param.name, field_type).with_source(
                        OptionSource::Dependency(dependant.producer().name().to_string()),
                    ),
                );
                node.dependencies.push((param.name.clone(), key));
                node.keyword_names.push(param.name.clone());
            }
            Source::Custom(field, fallback) => {
                if is_sync && field.is_async() {
                    return Err(Error::async_custom_field(&param.name, name));
                }
                let mut field_type = if field.cast() {
                    param.annotation.clone()
                } else {
                    TypeHint::Any
                };
                let mut default_value = fallback.cloned();
                if !field.required() {
                    field_type = TypeHint::optional(field_type);
                    default_value.get_or_insert(Value::Null);
                }
                let mut option = OptionItem::new(&param.name, field_type)
                    .with_source(OptionSource::CustomField(param.name.clone()));
                option.default_value = default_value;
                node.options.push(option);
                node.custom_fields
                    .push((param.name.clone(), Arc::clone(field)));
                node.keyword_names.push(param.name.clone());
            }
            Source::Plain(default_value) => {
                let option = plain_option(param, default_value);
                match param.kind {
                    ParamKind::Positional => node.positional_names.push(param.name.clone()),
                    ParamKind::KeywordOnly => node.keyword_names.push(param.name.clone()),
                    ParamKind::VarArgs => node.var_args_name = Some(param.name.clone()),
                    ParamKind::VarKwargs => node.var_kwargs_name = Some(param.name.clone()),
                }
                node.params.push(option.clone());
                node.options.push(option);
            }
        }
    }

    for dependant in &options.extra_dependencies {
        let key = build_child(dependant, provider, options, is_sync, name)?;
        node.extra_dependencies.push(key);
    }

    let response = if options.cast_result {
        signature.returns.as_ref()
    } else {
        None
    };
    node.validator = options
        .validator_factory
        .as_ref()
        .map(|factory| factory.build(name, &node.options, response));

    debug!(
        call = name,
        is_async,
        dependencies = node.dependencies.len(),
        custom_fields = node.custom_fields.len(),
        "Built call node"
    );
    Ok(node)
}

/// Build, register and check the node of a dependency
fn build_child(
    dependant: &Dependant,
    provider: &Provider,
    options: &BuildOptions,
    is_sync: bool,
    consumer: &str,
) -> Result<ProducerKey> {
    let child_options = options.for_child(dependant, is_sync);
    let child = build_node(dependant.producer(), provider, &child_options, Some(consumer))?;
    let key = provider.add(Arc::new(child));
    let effective = provider.get(key)?;
    if is_sync && effective.is_async() {
        return Err(Error::async_dependency(effective.call_name(), consumer));
    }
    Ok(key)
}

fn classify(param: &Param) -> Result<Source<'_>> {
    if param.markers.len() > 1 {
        return Err(Error::MultipleMarkers {
            param: param.name.clone(),
        });
    }
    match (param.markers.first(), param.default.as_ref()) {
        (Some(_), Some(ParamDefault::Marker(_))) => Err(Error::ambiguous(
            &param.name,
            "markers declared both in the annotation and as the default",
        )),
        (Some(Marker::Depends(_)), Some(ParamDefault::Value(_))) => Err(Error::ambiguous(
            &param.name,
            "a dependency cannot have a default value",
        )),
        (Some(Marker::Depends(dependant)), None)
        | (None, Some(ParamDefault::Marker(Marker::Depends(dependant)))) => {
            Ok(Source::Dependency(dependant))
        }
        (Some(Marker::Custom(field)), default) => Ok(Source::Custom(
            field,
            default.and_then(|d| match d {
                ParamDefault::Value(value) => Some(value),
                ParamDefault::Marker(_) => None,
            }),
        )),
        (None, Some(ParamDefault::Marker(Marker::Custom(field)))) => {
            Ok(Source::Custom(field, None))
        }
        (None, Some(ParamDefault::Value(value))) => Ok(Source::Plain(Some(value))),
        (None, None) => Ok(Source::Plain(None)),
    }
}

fn plain_option(param: &Param, default_value: Option<&Value>) -> OptionItem {
    let option = match param.kind {
        ParamKind::VarArgs => OptionItem::new(&param.name, TypeHint::list(param.annotation.clone()))
            .with_default(Value::Array(Vec::new())),
        ParamKind::VarKwargs => {
            OptionItem::new(&param.name, TypeHint::map(param.annotation.clone()))
                .with_default(Value::Object(serde_json::Map::new()))
        }
        ParamKind::Positional | ParamKind::KeywordOnly => {
            OptionItem::new(&param.name, param.annotation.clone())
        }
    };
    match default_value {
        Some(value) => option.with_default(value.clone()),
        None => option,
    }
}

fn check_signature(call: &str, params: &[Param]) -> Result<()> {
    let mut names = HashSet::new();
    let mut var_args = 0;
    let mut var_kwargs = 0;
    for param in params {
        if !names.insert(param.name.as_str()) {
            return Err(Error::invalid_signature(
                call,
                format!("duplicate parameter `{}`", param.name),
            ));
        }
        match param.kind {
            ParamKind::VarArgs => var_args += 1,
            ParamKind::VarKwargs => var_kwargs += 1,
            ParamKind::Positional | ParamKind::KeywordOnly => {}
        }
        if param.kind.is_variadic()
            && (!param.markers.is_empty() || param.default.is_some())
        {
            return Err(Error::invalid_signature(
                call,
                format!("variadic parameter `{}` cannot carry markers or defaults", param.name),
            ));
        }
    }
    if var_args > 1 || var_kwargs > 1 {
        return Err(Error::invalid_signature(
            call,
            "at most one var-args and one var-kwargs parameter",
        ));
    }
    Ok(())
}

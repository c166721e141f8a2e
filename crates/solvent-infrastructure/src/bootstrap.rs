//! Bootstrap
//!
//! Turns an [`AppConfig`] into an [`Injector`] whose options carry the
//! configured validator and blocking pool.

use crate::config::{AppConfig, ResolverConfig};
use solvent_application::{BlockingPool, InjectOptions, Injector, Provider};
use solvent_providers::JsonCaster;
use std::sync::Arc;
use tracing::info;

/// Injection defaults described by `config`
pub fn inject_options(config: &ResolverConfig) -> InjectOptions {
    let caster = if config.strict {
        JsonCaster::strict()
    } else {
        JsonCaster::new()
    };
    InjectOptions::new()
        .with_cast(config.cast)
        .with_cast_result(config.cast_result)
        .with_validator_factory(Arc::new(caster))
        .with_pool(BlockingPool::new(config.max_blocking_workers))
}

/// Injector over `provider` configured from `config`
pub fn build_injector(config: &AppConfig, provider: Arc<Provider>) -> Injector {
    let resolver = &config.resolver;
    info!(
        max_blocking_workers = resolver.max_blocking_workers,
        cast = resolver.cast,
        cast_result = resolver.cast_result,
        strict = resolver.strict,
        "Injector configured"
    );
    Injector::new(provider, inject_options(resolver))
}

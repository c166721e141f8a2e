//! Bootstrap Tests

use serde_json::json;
use solvent_application::{BlockingPool, Provider};
use solvent_domain::{Arguments, Error, Param, Producer, Signature, TypeHint, depends};
use solvent_infrastructure::bootstrap::{build_injector, inject_options};
use solvent_infrastructure::config::{AppConfig, ConfigBuilder, ResolverConfig};
use std::sync::Arc;

fn doubler() -> Producer {
    let base = Producer::sync("base", Signature::new(), |_| Ok(json!(2)));
    Producer::sync(
        "doubler",
        Signature::new()
            .param(Param::positional("a", TypeHint::Int))
            .param(Param::dependency("b", TypeHint::Int, depends(&base))),
        |args| Ok(json!(args.value::<i64>("a")? * args.value::<i64>("b")?)),
    )
}

#[test]
fn test_inject_options_follow_config() {
    let config = ResolverConfig {
        max_blocking_workers: 3,
        cast: false,
        cast_result: false,
        strict: true,
    };
    let options = inject_options(&config);

    assert!(!options.cast);
    assert!(!options.cast_result);
    assert!(options.validator_factory.is_some());
    assert_eq!(options.pool.as_ref().map(BlockingPool::max_workers), Some(3));
}

#[test]
fn test_configured_injector_coerces_arguments() {
    let injector = build_injector(&AppConfig::default(), Arc::new(Provider::new()));
    let injected = injector.inject(&doubler()).expect("inject");

    let value = injected
        .call(Arguments::new().kwarg("a", "21"))
        .expect("call");
    assert_eq!(value, json!(42));
}

#[test]
fn test_strict_injector_rejects_strings() {
    let config = ConfigBuilder::new()
        .with_resolver(ResolverConfig {
            strict: true,
            ..ResolverConfig::default()
        })
        .build()
        .expect("valid config");
    let injector = build_injector(&config, Arc::new(Provider::new()));
    let injected = injector.inject(&doubler()).expect("inject");

    let result = injected.call(Arguments::new().kwarg("a", "21"));
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_configured_injector_runs_async_calls() {
    let config = ConfigBuilder::new()
        .with_max_blocking_workers(1)
        .build()
        .expect("valid config");
    let injector = build_injector(&config, Arc::new(Provider::new()));
    assert_eq!(
        injector.options().pool.as_ref().map(BlockingPool::max_workers),
        Some(1)
    );

    let value = injector
        .inject(&doubler())
        .expect("inject")
        .call_async(Arguments::positional([5]))
        .await
        .expect("call");
    assert_eq!(value, json!(10));
}

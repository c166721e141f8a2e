//! Tests for the provider and its overrides

use crate::support::{constant, count, counted, counter, injected, provider};
use serde_json::{Value, json};
use solvent_application::Provider;
use solvent_domain::{Arguments, Error, Param, Producer, ProducerKey, Signature, TypeHint, depends};
use std::panic::{AssertUnwindSafe, catch_unwind};

fn consumer(dep: &Producer) -> Producer {
    Producer::sync(
        "consumer",
        Signature::new().param(Param::dependency("value", TypeHint::Any, depends(dep))),
        |args| Ok(args.get("value").cloned().unwrap_or(Value::Null)),
    )
}

#[test]
fn test_get_unknown_key_fails() {
    let provider = Provider::new();
    let key: ProducerKey = constant("never_built", json!(1)).key();
    match provider.get(key) {
        Err(Error::MissingDependency { key: missing }) => assert_eq!(missing, key.to_string()),
        other => panic!("Expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn test_override_round_trip() {
    let original = constant("original", json!(1));
    let replacement = constant("replacement", json!(2));
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);

    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(1));

    provider.override_with(&original, &replacement).expect("override");
    assert!(provider.is_overridden(original.key()));
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(2));

    provider.clear();
    assert!(!provider.is_overridden(original.key()));
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(1));
}

#[test]
fn test_override_registers_unknown_original() {
    let original = constant("original", json!(1));
    let replacement = constant("replacement", json!(2));
    let provider = Provider::new();

    provider.set(&original, &replacement).expect("override");

    assert!(provider.contains(original.key()));
    assert_eq!(provider.override_count(), 1);
    let effective = provider.get(original.key()).expect("effective node");
    assert_eq!(effective.call_name(), "replacement");
}

#[test]
fn test_clear_keeps_registrations_and_reset_drops_them() {
    let original = constant("original", json!(1));
    let provider = provider();
    let _handler = injected(&consumer(&original), &provider);
    provider
        .override_with(&original, &constant("replacement", json!(2)))
        .expect("override");

    provider.clear();
    assert_eq!(provider.override_count(), 0);
    assert_eq!(provider.len(), 1);

    provider.reset();
    assert!(provider.is_empty());
}

#[test]
fn test_last_override_wins() {
    let original = constant("original", json!(1));
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);

    provider
        .override_with(&original, &constant("first", json!(2)))
        .expect("override");
    provider
        .override_with(&original, &constant("second", json!(3)))
        .expect("override");

    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(3));
}

#[test]
fn test_scope_restores_previous_override() {
    let original = constant("original", json!(1));
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);
    provider
        .override_with(&original, &constant("outer", json!(2)))
        .expect("override");

    {
        let _scope = provider
            .scope(&original, &constant("inner", json!(3)))
            .expect("scope");
        assert_eq!(handler.call(Arguments::new()).expect("call"), json!(3));
    }
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(2));

    provider.clear();
    {
        let _scope = provider
            .scope(&original, &constant("inner", json!(3)))
            .expect("scope");
    }
    assert!(!provider.is_overridden(original.key()));
}

#[test]
fn test_with_override_restores_after_error() {
    let original = constant("original", json!(1));
    let failing = Producer::sync("failing", Signature::new(), |_| {
        Err(Error::invalid_argument("boom"))
    });
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);

    let inner = provider
        .with_override(&original, &failing, || handler.call(Arguments::new()))
        .expect("override applied");
    assert!(matches!(inner, Err(Error::InvalidArgument { .. })));

    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(1));
}

#[test]
fn test_scope_restores_after_panic() {
    let original = constant("original", json!(1));
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _scope = provider
            .scope(&original, &constant("replacement", json!(2)))
            .expect("scope");
        panic!("test body failed");
    }));

    assert!(outcome.is_err());
    assert!(!provider.is_overridden(original.key()));
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(1));
}

#[test]
fn test_override_replaces_whole_subgraph() {
    let dep2_calls = counter();
    let dep2 = counted("dep2", &dep2_calls, json!(2));
    let dep1 = Producer::sync(
        "dep1",
        Signature::new().param(Param::dependency("d", TypeHint::Int, depends(&dep2))),
        |args| Ok(json!(args.value::<i64>("d")? * 10)),
    );
    let dep4 = constant("dep4", json!(4));
    let dep3 = Producer::sync(
        "dep3",
        Signature::new().param(Param::dependency("d", TypeHint::Int, depends(&dep4))),
        |args| Ok(json!(args.value::<i64>("d")? * 100)),
    );

    let provider = provider();
    let handler = injected(&consumer(&dep1), &provider);
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(20));
    assert_eq!(count(&dep2_calls), 1);

    provider.override_with(&dep1, &dep3).expect("override");
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(400));
    assert_eq!(count(&dep2_calls), 1);
}

#[test]
fn test_override_inherits_validator_factory() {
    let original = Producer::sync(
        "original",
        Signature::new().param(Param::positional("a", TypeHint::Int)),
        |args| Ok(json!(args.value::<i64>("a")?)),
    );
    let replacement = Producer::sync(
        "replacement",
        Signature::new().param(Param::positional("a", TypeHint::Int)),
        |args| Ok(json!(args.value::<i64>("a")? * 2)),
    );
    let provider = provider();
    let handler = injected(&consumer(&original), &provider);
    provider.override_with(&original, &replacement).expect("override");

    let value = handler
        .call(Arguments::new().kwarg("a", "5"))
        .expect("string coerced by the inherited validator");
    assert_eq!(value, json!(10));
}

#[test]
fn test_override_through_wrapper_key() {
    let original = constant("original", json!(1));
    let provider = provider();
    let wrapper = injected(&original, &provider).as_producer();
    let handler = injected(&consumer(&wrapper), &provider);

    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(1));
    provider
        .override_with(&original, &constant("replacement", json!(7)))
        .expect("override");
    assert_eq!(handler.call(Arguments::new()).expect("call"), json!(7));
}

//! Tests for producers, signatures and dependency descriptors

use serde_json::{Value, json};
use solvent_domain::{
    Body, CallArgs, Dependant, KwArgs, Param, ParamDefault, Producer, Resource, ScopeExit,
    Signature, TypeHint, depends,
};
use futures::StreamExt;
use solvent_domain::Closer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn constant(name: &str, value: Value) -> Producer {
    Producer::sync(name, Signature::new(), move |_| Ok(value.clone()))
}

fn args_with(name: &str, value: Value) -> CallArgs {
    let mut values = KwArgs::new();
    values.insert(name.to_string(), value);
    CallArgs::new("f", values, Vec::new(), KwArgs::new())
}

#[test]
fn test_keys_are_unique() {
    let a = constant("a", json!(1));
    let b = constant("a", json!(1));
    assert_ne!(a.key(), b.key());
    assert_eq!(a.clone().key(), a.key());
}

#[test]
fn test_wrapper_reports_original_key() {
    let original = constant("original", json!(1));
    let wrapper = Producer::wrapping(
        &original,
        "wrapper",
        Signature::new(),
        Body::Sync(Arc::new(|_| Ok(json!(2)))),
    );
    assert_eq!(wrapper.key(), original.key());
    assert_ne!(wrapper.own_key(), original.own_key());
    assert!(wrapper.is_wrapper());
    assert_eq!(wrapper, original);
}

#[test]
fn test_body_shapes() {
    let plain = constant("plain", json!(1));
    assert!(!plain.is_async());
    assert!(!plain.is_generator());

    let asynchronous = Producer::asynchronous("async", Signature::new(), |_| async {
        Ok(json!(1))
    });
    assert!(asynchronous.is_async());

    let scoped = Producer::scoped("scoped", Signature::new(), |_| {
        Ok(Resource::new(1, |_| Ok(())))
    });
    assert!(scoped.is_scoped());
    assert!(!scoped.is_async());

    let stream = Producer::stream("stream", Signature::new(), |_| {
        Ok(vec![Ok(json!(1)), Ok(json!(2))].into_iter())
    });
    assert!(stream.is_generator());

    let async_stream = Producer::async_stream("async_stream", Signature::new(), |_| {
        Ok(futures::stream::iter(vec![Ok(json!(1))]))
    });
    assert!(async_stream.is_generator());
    assert!(async_stream.is_async());
}

#[test]
fn test_resource_closer_runs_once() {
    let closed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&closed);
    let resource = Resource::new(json!("conn"), move |exit| {
        assert_eq!(exit, ScopeExit::Success);
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });
    match resource.closer {
        solvent_domain::Closer::Sync(close) => close(ScopeExit::Success).expect("close"),
        solvent_domain::Closer::Async(_) => panic!("Expected a sync closer"),
    }
    assert!(closed.load(Ordering::SeqCst));
}

#[test]
fn test_dependant_defaults_and_equality() {
    let producer = constant("dep", json!(1));
    let dependant = depends(&producer);
    assert!(dependant.use_cache);
    assert!(dependant.cast);
    assert!(!dependant.cast_result);

    let uncached = Dependant::new(&producer).no_cache();
    assert!(!uncached.use_cache);
    assert_eq!(dependant, uncached);
    assert_ne!(dependant, depends(&constant("dep", json!(1))));
}

#[test]
fn test_param_builders() {
    let producer = constant("dep", json!(1));
    let param = Param::dependency("d", TypeHint::Int, depends(&producer));
    assert!(param.markers.is_empty());
    assert!(matches!(param.default, Some(ParamDefault::Marker(_))));

    let plain = Param::keyword_only("k", TypeHint::Str).with_default("x");
    assert_eq!(plain.default_value(), Some(&json!("x")));

    let signature = Signature::new().param(plain).returns(TypeHint::Int);
    assert!(signature.get("k").is_some());
    assert_eq!(signature.returns, Some(TypeHint::Int));
}

#[test]
fn test_call_args_into_arguments() {
    let mut values = KwArgs::new();
    values.insert("a".to_string(), json!(1));
    let mut extra = KwArgs::new();
    extra.insert("z".to_string(), json!(9));
    let args = CallArgs::new("f", values, vec![json!(5)], extra).into_arguments();
    assert_eq!(args.positional, vec![json!(5)]);
    assert_eq!(args.keywords.get("a"), Some(&json!(1)));
    assert_eq!(args.keywords.get("z"), Some(&json!(9)));
}

#[tokio::test]
async fn test_async_body_runs() {
    let double = Producer::asynchronous(
        "double",
        Signature::new().param(Param::positional("n", TypeHint::Int)),
        |args| async move { Ok(json!(args.value::<i64>("n")? * 2)) },
    );
    let Body::Async(body) = double.body() else {
        panic!("Expected an async body");
    };
    assert_eq!(body(args_with("n", json!(21))).await.expect("call"), json!(42));
}

#[tokio::test]
async fn test_async_scoped_body_closes_asynchronously() {
    let closed = Arc::new(AtomicBool::new(false));
    let pool = {
        let closed = Arc::clone(&closed);
        Producer::async_scoped("pool", Signature::new(), move |_| {
            let closed = Arc::clone(&closed);
            async move {
                Ok(Resource::with_async_close("pool-1", move |exit: ScopeExit| async move {
                    assert!(!exit.is_success());
                    closed.store(true, Ordering::SeqCst);
                    Ok(())
                }))
            }
        })
    };
    assert!(pool.is_scoped());
    assert!(pool.is_async());

    let Body::AsyncScoped(body) = pool.body() else {
        panic!("Expected an async scoped body");
    };
    let resource = body(args_with("unused", Value::Null)).await.expect("open");
    assert_eq!(resource.value, json!("pool-1"));
    assert!(resource.closer.is_async());
    match resource.closer {
        Closer::Async(close) => close(ScopeExit::Failure {
            message: "boom".to_string(),
        })
        .await
        .expect("close"),
        Closer::Sync(_) => panic!("Expected an async closer"),
    }
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_async_stream_body_yields_items() {
    let count = Producer::async_stream(
        "count",
        Signature::new().param(Param::positional("n", TypeHint::Int)),
        |args| {
            let n: i64 = args.value("n")?;
            Ok(futures::stream::iter((0..n).map(|i| Ok(json!(i)))))
        },
    );
    let Body::AsyncStream(body) = count.body() else {
        panic!("Expected an async stream body");
    };
    let items: Vec<Value> = body(args_with("n", json!(3)))
        .expect("open")
        .map(|item| item.expect("item"))
        .collect()
        .await;
    assert_eq!(items, vec![json!(0), json!(1), json!(2)]);
}

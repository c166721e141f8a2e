//! Tests for concurrent resolution

use crate::support::{EventLog, casting, count, counter, injected, provider};
use async_trait::async_trait;
use serde_json::{Value, json};
use solvent_application::{BlockingPool, inject};
use solvent_domain::{
    Arguments, CustomField, Error, FieldMode, KwArgs, Param, Producer, Resource, Result,
    ScopeExit, Signature, TypeHint, depends,
};
use solvent_providers::ContextValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

fn delayed(name: &str, millis: u64, value: Value) -> Producer {
    Producer::asynchronous(name, Signature::new(), move |_| {
        let value = value.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(value)
        }
    })
}

fn sum_of(name: &str, deps: &[(&str, &Producer)]) -> Producer {
    let names: Vec<String> = deps.iter().map(|(param, _)| param.to_string()).collect();
    let signature = deps.iter().fold(Signature::new(), |signature, (param, dep)| {
        signature.param(Param::dependency(*param, TypeHint::Int, depends(dep)))
    });
    Producer::asynchronous(name, signature, move |args| {
        let names = names.clone();
        async move {
            let mut total = 0;
            for name in &names {
                total += args.value::<i64>(name)?;
            }
            Ok(json!(total))
        }
    })
}

/// Field looked up asynchronously
#[derive(Debug)]
struct SlowLookup(i64);

#[async_trait]
impl CustomField for SlowLookup {
    fn mode(&self) -> FieldMode {
        FieldMode::Field
    }

    fn is_async(&self) -> bool {
        true
    }

    async fn use_field_async(&self, _param: &str, _kwargs: &KwArgs) -> Result<Option<Value>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(Some(json!(self.0)))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_graph_resolves() {
    let one = delayed("one", 20, json!(1));
    let two = delayed("two", 10, json!(2));
    let root = sum_of("root", &[("a", &one), ("b", &two)]);

    let value = injected(&root, &provider())
        .call_async(Arguments::new())
        .await
        .expect("call");
    assert_eq!(value, json!(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shared_dependency_runs_once_under_fan_out() {
    let calls = counter();
    let shared = {
        let calls = Arc::clone(&calls);
        Producer::asynchronous("shared", Signature::new(), move |_| {
            let calls = Arc::clone(&calls);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!(5))
            }
        })
    };
    let left = sum_of("left", &[("s", &shared)]);
    let right = sum_of("right", &[("s", &shared)]);
    let root = sum_of("root", &[("l", &left), ("r", &right), ("s", &shared)]);

    let value = injected(&root, &provider())
        .call_async(Arguments::new())
        .await
        .expect("call");
    assert_eq!(value, json!(15));
    assert_eq!(count(&calls), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failure_cancels_running_siblings() {
    let finished = Arc::new(AtomicBool::new(false));
    let slow = {
        let finished = Arc::clone(&finished);
        Producer::asynchronous("slow", Signature::new(), move |_| {
            let finished = Arc::clone(&finished);
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                finished.store(true, Ordering::SeqCst);
                Ok(json!(1))
            }
        })
    };
    let failing = Producer::asynchronous("failing", Signature::new(), |_| async {
        Err(Error::invalid_argument("upstream unavailable"))
    });
    let root = sum_of("root", &[("a", &slow), ("b", &failing)]);

    let result = injected(&root, &provider())
        .call_async(Arguments::new())
        .await;
    match result {
        Err(Error::InvalidArgument { message }) => assert_eq!(message, "upstream unavailable"),
        other => panic!("Expected InvalidArgument, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_independent_dependencies_overlap() {
    let deps: Vec<Producer> = (0..4)
        .map(|i| delayed(&format!("dep{i}"), 100, json!(1)))
        .collect();
    let named: Vec<(String, &Producer)> = deps
        .iter()
        .enumerate()
        .map(|(i, dep)| (format!("d{i}"), dep))
        .collect();
    let pairs: Vec<(&str, &Producer)> = named.iter().map(|(n, d)| (n.as_str(), *d)).collect();
    let root = sum_of("root", &pairs);

    let started = std::time::Instant::now();
    let value = injected(&root, &provider())
        .call_async(Arguments::new())
        .await
        .expect("call");
    assert_eq!(value, json!(4));
    assert!(started.elapsed() < Duration::from_millis(350));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_bodies_run_on_pool() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let blocking = |name: &str| {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        Producer::sync(name, Signature::new(), move |_| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            running.fetch_sub(1, Ordering::SeqCst);
            Ok(json!(1))
        })
    };
    let a = blocking("a");
    let b = blocking("b");
    let c = blocking("c");
    let root = sum_of("root", &[("a", &a), ("b", &b), ("c", &c)]);

    let options = casting().with_pool(BlockingPool::new(1));
    let injected = inject(&root, provider(), options).expect("inject");
    let value = injected.call_async(Arguments::new()).await.expect("call");

    assert_eq!(value, json!(3));
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_root_through_call_async() {
    let dep = Producer::sync("dep", Signature::new(), |_| Ok(json!(20)));
    let root = Producer::sync(
        "root",
        Signature::new()
            .param(Param::positional("a", TypeHint::Int))
            .param(Param::dependency("b", TypeHint::Int, depends(&dep))),
        |args| Ok(json!(args.value::<i64>("a")? + args.value::<i64>("b")?)),
    );

    let injected = injected(&root, &provider());
    let value = injected
        .call_async(Arguments::positional([22]))
        .await
        .expect("call");
    assert_eq!(value, json!(42));
    assert_eq!(injected.call(Arguments::positional([22])).expect("call"), value);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_custom_fields() {
    let lookup: Arc<dyn CustomField> = Arc::new(SlowLookup(40));
    let fixed: Arc<dyn CustomField> = Arc::new(ContextValue::new(2).asynchronous());
    let root = Producer::asynchronous(
        "root",
        Signature::new()
            .param(Param::custom_field("looked_up", TypeHint::Int, lookup))
            .param(Param::custom_field("fixed", TypeHint::Int, fixed)),
        |args| async move {
            Ok(json!(
                args.value::<i64>("looked_up")? + args.value::<i64>("fixed")?
            ))
        },
    );

    let value = injected(&root, &provider())
        .call_async(Arguments::new())
        .await
        .expect("call");
    assert_eq!(value, json!(42));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cycle_detected_in_async_call() {
    let b = delayed("b", 0, json!(1));
    let a = sum_of("a", &[("b", &b)]);
    let root = sum_of("root", &[("a", &a)]);
    let provider = provider();
    let injected = injected(&root, &provider);

    let looping = sum_of("looping", &[("a", &a)]);
    provider.override_with(&b, &looping).expect("override");

    let result = injected.call_async(Arguments::new()).await;
    assert!(matches!(result, Err(Error::DependencyCycle { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_opened_after_sibling_failure_is_closed() {
    let log = EventLog::new();
    let slow_conn = {
        let log = log.clone();
        Producer::scoped("slow_conn", Signature::new(), move |_| {
            std::thread::sleep(Duration::from_millis(100));
            log.push("open");
            let log = log.clone();
            Ok(Resource::new("conn", move |exit: ScopeExit| {
                log.push(if exit.is_success() { "close:ok" } else { "close:failed" });
                Ok(())
            }))
        })
    };
    let failing = Producer::asynchronous("failing", Signature::new(), |_| async {
        Err(Error::invalid_argument("upstream unavailable"))
    });
    let root = Producer::asynchronous(
        "root",
        Signature::new()
            .param(Param::dependency("conn", TypeHint::Str, depends(&slow_conn)))
            .param(Param::dependency("other", TypeHint::Int, depends(&failing))),
        |_| async { Ok(Value::Null) },
    );

    let result = injected(&root, &provider())
        .call_async(Arguments::new())
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(log.events(), vec!["open", "close:failed"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_dependencies_bind_by_name_not_position() {
    let dep = Producer::asynchronous(
        "dep",
        Signature::new().param(Param::positional("b", TypeHint::Int)),
        |args| async move { Ok(json!(args.value::<i64>("b")?)) },
    );
    let root = Producer::asynchronous(
        "root",
        Signature::new()
            .param(Param::positional("a", TypeHint::Int))
            .param(Param::positional("b", TypeHint::Int))
            .param(Param::dependency("d", TypeHint::Int, depends(&dep))),
        |args| async move {
            Ok(json!([
                args.value::<i64>("a")?,
                args.value::<i64>("b")?,
                args.value::<i64>("d")?
            ]))
        },
    );

    let value = injected(&root, &provider())
        .call_async(Arguments::positional([1, 2]))
        .await
        .expect("call");
    assert_eq!(value, json!([1, 2, 2]));
}

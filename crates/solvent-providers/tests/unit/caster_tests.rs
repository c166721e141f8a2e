//! Tests for the JSON caster

use serde_json::json;
use solvent_domain::{KwArgs, OptionItem, TypeHint, ValidatorFactory};
use solvent_providers::JsonCaster;

fn options() -> Vec<OptionItem> {
    vec![
        OptionItem::new("a", TypeHint::Int),
        OptionItem::new("b", TypeHint::Str).with_default(json!("default")),
        OptionItem::new("flags", TypeHint::list(TypeHint::Bool)),
    ]
}

fn kwargs(value: serde_json::Value) -> KwArgs {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("Expected an object, got {other}"),
    }
}

#[test]
fn test_coerces_and_fills_defaults() {
    let validator = JsonCaster::new().build("handler", &options(), None);
    let values = validator
        .validate(kwargs(json!({"a": "7", "flags": ["yes", 0]})))
        .expect("valid arguments");
    assert_eq!(values.get("a"), Some(&json!(7)));
    assert_eq!(values.get("b"), Some(&json!("default")));
    assert_eq!(values.get("flags"), Some(&json!([true, false])));
}

#[test]
fn test_aggregates_every_failure() {
    let validator = JsonCaster::new().build("handler", &options(), None);
    let error = validator
        .validate(kwargs(json!({"a": "seven", "flags": "no"})))
        .expect_err("invalid arguments");
    assert_eq!(error.call, "handler");
    assert_eq!(error.field_names(), vec!["a", "flags"]);
    assert_eq!(error.errors.len(), 2);
    assert_eq!(error.incoming, json!({"a": "seven", "flags": "no"}));
}

#[test]
fn test_missing_required_field() {
    let validator = JsonCaster::new().build("handler", &options(), None);
    let error = validator
        .validate(kwargs(json!({"flags": []})))
        .expect_err("missing a");
    assert_eq!(error.field_names(), vec!["a"]);
    assert_eq!(error.errors[0].message, "field required");
}

#[test]
fn test_unknown_keys_pass_through() {
    let validator = JsonCaster::new().build("handler", &options(), None);
    let values = validator
        .validate(kwargs(json!({"a": 1, "flags": [], "headers": {}})))
        .expect("valid arguments");
    assert!(values.contains_key("headers"));
}

#[test]
fn test_response_cast() {
    let validator = JsonCaster::new().build("handler", &[], Some(&TypeHint::Str));
    assert_eq!(validator.response(json!(1)).expect("cast"), json!("1"));

    let validator = JsonCaster::new().build("handler", &[], Some(&TypeHint::Int));
    let error = validator.response(json!("x")).expect_err("not an int");
    assert_eq!(error.field_names(), vec!["return"]);

    let untyped = JsonCaster::new().build("handler", &[], None);
    assert_eq!(untyped.response(json!("x")).expect("untouched"), json!("x"));
}

#[test]
fn test_strict_caster() {
    let caster = JsonCaster::strict();
    assert!(caster.is_strict());
    let validator = caster.build("handler", &[OptionItem::new("a", TypeHint::Int)], None);
    assert!(validator.validate(kwargs(json!({"a": "1"}))).is_err());
    assert!(validator.validate(kwargs(json!({"a": 1}))).is_ok());
}

#[test]
fn test_optional_accepts_null() {
    let options = vec![OptionItem::new("a", TypeHint::optional(TypeHint::Int))];
    let validator = JsonCaster::new().build("handler", &options, None);
    let values = validator
        .validate(kwargs(json!({"a": null})))
        .expect("null accepted");
    assert_eq!(values.get("a"), Some(&json!(null)));
}

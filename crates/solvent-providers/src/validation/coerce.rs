//! Value coercion against type hints

use serde_json::{Number, Value};
use solvent_domain::TypeHint;

const TRUE_WORDS: &[&str] = &["true", "1", "yes", "on", "t", "y"];
const FALSE_WORDS: &[&str] = &["false", "0", "no", "off", "f", "n"];

/// Check `value` against `hint`, coercing compatible values
///
/// With `strict` set, only values already of the right JSON type pass.
/// The error is a human readable reason, prefixed with the path inside
/// nested lists and maps.
pub fn coerce(value: &Value, hint: &TypeHint, strict: bool) -> Result<Value, String> {
    match hint {
        TypeHint::Any => Ok(value.clone()),
        TypeHint::Null => match value {
            Value::Null => Ok(Value::Null),
            _ => Err("value is not None".to_string()),
        },
        TypeHint::Optional(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => coerce(other, inner, strict),
        },
        TypeHint::Bool => to_bool(value, strict),
        TypeHint::Int => to_int(value, strict),
        TypeHint::Float => to_float(value, strict),
        TypeHint::Str => to_str(value, strict),
        TypeHint::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    coerce(item, inner, strict).map_err(|reason| format!("[{index}]: {reason}"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Err("value is not a valid list".to_string()),
        },
        TypeHint::Map(inner) => match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| {
                    coerce(item, inner, strict)
                        .map(|item| (key.clone(), item))
                        .map_err(|reason| format!("[{key:?}]: {reason}"))
                })
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Value::Object),
            _ => Err("value is not a valid dict".to_string()),
        },
    }
}

fn to_bool(value: &Value, strict: bool) -> Result<Value, String> {
    let reason = || "value could not be parsed to a boolean".to_string();
    match value {
        Value::Bool(_) => Ok(value.clone()),
        _ if strict => Err(reason()),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(reason()),
        },
        Value::String(text) => {
            let word = text.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(reason())
            }
        }
        _ => Err(reason()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_int(value: &Value, strict: bool) -> Result<Value, String> {
    let reason = || "value is not a valid integer".to_string();
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Ok(value.clone()),
        _ if strict => Err(reason()),
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if float.fract().abs() < f64::EPSILON
                    && float >= i64::MIN as f64
                    && float <= i64::MAX as f64 =>
            {
                Ok(Value::from(float as i64))
            }
            _ => Err(reason()),
        },
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| reason()),
        Value::Bool(flag) => Ok(Value::from(i64::from(*flag))),
        _ => Err(reason()),
    }
}

fn to_float(value: &Value, strict: bool) -> Result<Value, String> {
    let reason = || "value is not a valid float".to_string();
    let float = match value {
        Value::Number(number) => number.as_f64(),
        _ if strict => None,
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    float
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(reason)
}

fn to_str(value: &Value, strict: bool) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(number) if !strict => Ok(Value::String(number.to_string())),
        _ => Err("str type expected".to_string()),
    }
}

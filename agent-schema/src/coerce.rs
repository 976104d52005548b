//! Per-kind coercion table.
//!
//! Each kind has one function that either returns the coerced value or records
//! a [`FieldError`] and returns `None`. Containers keep going after a failing
//! element so that every failure in a call is reported at once.

use serde_json::{Map, Number, Value};

use crate::error::FieldError;
use crate::schema::ParameterSpec;
use crate::types::ParamType;

const TRUE_STRINGS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_STRINGS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

pub(crate) fn coerce_value(
    ty: &ParamType,
    value: Value,
    path: &str,
    failures: &mut Vec<FieldError>,
) -> Option<Value> {
    match ty {
        ParamType::String => coerce_string(value, path, failures),
        ParamType::Integer => coerce_integer(value, path, failures),
        ParamType::Number => coerce_number(value, path, failures),
        ParamType::Boolean => coerce_boolean(value, path, failures),
        ParamType::Array(inner) => coerce_array(ty, inner, value, path, failures),
        ParamType::Map(inner) => coerce_map(ty, inner, value, path, failures),
        ParamType::Object(fields) => coerce_object(ty, fields, value, path, failures),
        ParamType::Optional(inner) => match value {
            Value::Null => Some(Value::Null),
            other => coerce_value(inner, other, path, failures),
        },
        ParamType::Any => Some(value),
    }
}

/// Coerces the named fields out of `supplied`, leaving unknown keys behind.
pub(crate) fn coerce_fields(
    fields: &[ParameterSpec],
    supplied: &mut Map<String, Value>,
    prefix: &str,
    failures: &mut Vec<FieldError>,
) -> Map<String, Value> {
    let mut coerced = Map::new();
    for field in fields {
        let path = join_path(prefix, field.name());
        match supplied.remove(field.name()) {
            Some(value) => {
                if let Some(value) = coerce_value(field.ty(), value, &path, failures) {
                    coerced.insert(field.name().to_owned(), value);
                }
            }
            None if field.is_required() => failures.push(FieldError::new(
                path,
                field.ty().type_name(),
                "missing required argument",
            )),
            None => {}
        }
    }
    coerced
}

fn coerce_string(value: Value, path: &str, failures: &mut Vec<FieldError>) -> Option<Value> {
    match value {
        Value::String(text) => Some(Value::String(text)),
        other => reject(path, &ParamType::String, &other, failures),
    }
}

fn coerce_integer(value: Value, path: &str, failures: &mut Vec<FieldError>) -> Option<Value> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(Value::Number(number)),
        Value::Number(number) => {
            let float = number.as_f64().unwrap_or(f64::NAN);
            match whole_number(float) {
                Some(whole) => Some(Value::from(whole)),
                None => {
                    let reason = if float.is_finite() && float.fract() == 0.0 {
                        format!("number {number} is out of range for integer")
                    } else {
                        format!("number {number} has a fractional part")
                    };
                    failures.push(FieldError::new(path, "integer", reason));
                    None
                }
            }
        }
        Value::String(text) => match parse_integer(text.trim()) {
            Some(number) => Some(Value::Number(number)),
            None => reject(path, &ParamType::Integer, &Value::String(text), failures),
        },
        other => reject(path, &ParamType::Integer, &other, failures),
    }
}

fn coerce_number(value: Value, path: &str, failures: &mut Vec<FieldError>) -> Option<Value> {
    match value {
        Value::Number(number) => Some(Value::Number(number)),
        Value::String(text) => {
            let trimmed = text.trim();
            match parse_integer(trimmed).or_else(|| parse_float(trimmed)) {
                Some(number) => Some(Value::Number(number)),
                None => reject(path, &ParamType::Number, &Value::String(text), failures),
            }
        }
        other => reject(path, &ParamType::Number, &other, failures),
    }
}

fn coerce_boolean(value: Value, path: &str, failures: &mut Vec<FieldError>) -> Option<Value> {
    match value {
        Value::Bool(flag) => Some(Value::Bool(flag)),
        Value::Number(number) => match number.as_u64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => reject(path, &ParamType::Boolean, &Value::Number(number), failures),
        },
        Value::String(text) => {
            let lowered = text.trim().to_ascii_lowercase();
            if TRUE_STRINGS.contains(&lowered.as_str()) {
                Some(Value::Bool(true))
            } else if FALSE_STRINGS.contains(&lowered.as_str()) {
                Some(Value::Bool(false))
            } else {
                reject(path, &ParamType::Boolean, &Value::String(text), failures)
            }
        }
        other => reject(path, &ParamType::Boolean, &other, failures),
    }
}

fn coerce_array(
    ty: &ParamType,
    inner: &ParamType,
    value: Value,
    path: &str,
    failures: &mut Vec<FieldError>,
) -> Option<Value> {
    let items = match value {
        Value::Array(items) => items,
        other => return reject(path, ty, &other, failures),
    };

    let before = failures.len();
    let coerced: Vec<Value> = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| coerce_value(inner, item, &format!("{path}[{idx}]"), failures))
        .collect();

    (failures.len() == before).then_some(Value::Array(coerced))
}

fn coerce_map(
    ty: &ParamType,
    inner: &ParamType,
    value: Value,
    path: &str,
    failures: &mut Vec<FieldError>,
) -> Option<Value> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => return reject(path, ty, &other, failures),
    };

    let before = failures.len();
    let coerced: Map<String, Value> = entries
        .into_iter()
        .filter_map(|(key, item)| {
            let item_path = join_path(path, &key);
            coerce_value(inner, item, &item_path, failures).map(|item| (key, item))
        })
        .collect();

    (failures.len() == before).then_some(Value::Object(coerced))
}

fn coerce_object(
    ty: &ParamType,
    fields: &[ParameterSpec],
    value: Value,
    path: &str,
    failures: &mut Vec<FieldError>,
) -> Option<Value> {
    let mut entries = match value {
        Value::Object(entries) => entries,
        other => return reject(path, ty, &other, failures),
    };

    let before = failures.len();
    let coerced = coerce_fields(fields, &mut entries, path, failures);
    (failures.len() == before).then_some(Value::Object(coerced))
}

fn reject(
    path: &str,
    expected: &ParamType,
    value: &Value,
    failures: &mut Vec<FieldError>,
) -> Option<Value> {
    failures.push(FieldError::new(
        path,
        expected.type_name(),
        format!("got {}", describe(value)),
    ));
    None
}

fn parse_integer(text: &str) -> Option<Number> {
    text.parse::<i64>()
        .map(Number::from)
        .or_else(|_| text.parse::<u64>().map(Number::from))
        .ok()
}

fn parse_float(text: &str) -> Option<Number> {
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_number(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(flag) => format!("boolean {flag}"),
        Value::Number(number) => format!("number {number}"),
        Value::String(text) => format!("string {text:?}"),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Object(_) => "object".into(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn coerce(ty: &ParamType, value: Value) -> Result<Value, Vec<FieldError>> {
        let mut failures = Vec::new();
        match coerce_value(ty, value, "x", &mut failures) {
            Some(value) if failures.is_empty() => Ok(value),
            _ => Err(failures),
        }
    }

    #[test]
    fn integers_accept_numeric_strings_and_whole_floats() {
        assert_eq!(coerce(&ParamType::Integer, json!(5)), Ok(json!(5)));
        assert_eq!(coerce(&ParamType::Integer, json!("5")), Ok(json!(5)));
        assert_eq!(coerce(&ParamType::Integer, json!(" -12 ")), Ok(json!(-12)));
        assert_eq!(coerce(&ParamType::Integer, json!(3.0)), Ok(json!(3)));
        assert_eq!(
            coerce(&ParamType::Integer, json!("18446744073709551615")),
            Ok(json!(u64::MAX))
        );
    }

    #[test]
    fn integers_reject_text_fractions_and_booleans() {
        let failures = coerce(&ParamType::Integer, json!("abc")).expect_err("text");
        assert_eq!(failures[0].expected(), "integer");
        assert_eq!(failures[0].reason(), "got string \"abc\"");
        assert_eq!(
            failures[0].to_string(),
            "`x`: got string \"abc\" (expected integer)"
        );

        let failures = coerce(&ParamType::Integer, json!(2.5)).expect_err("fraction");
        assert!(failures[0].reason().contains("fractional part"));
        let failures = coerce(&ParamType::Integer, json!(1e20)).expect_err("too large");
        assert!(failures[0].reason().contains("out of range"));
        assert!(coerce(&ParamType::Integer, json!("2.5")).is_err());
        assert!(coerce(&ParamType::Integer, json!(true)).is_err());
        assert!(coerce(&ParamType::Integer, Value::Null).is_err());
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        assert_eq!(coerce(&ParamType::Number, json!(1.5)), Ok(json!(1.5)));
        assert_eq!(coerce(&ParamType::Number, json!("2.25")), Ok(json!(2.25)));
        assert_eq!(coerce(&ParamType::Number, json!("7")), Ok(json!(7)));
        assert!(coerce(&ParamType::Number, json!("NaN")).is_err());
        assert!(coerce(&ParamType::Number, json!(false)).is_err());
    }

    #[test]
    fn booleans_accept_common_spellings() {
        for truthy in [json!(true), json!("yes"), json!("ON"), json!(1), json!("t")] {
            assert_eq!(coerce(&ParamType::Boolean, truthy), Ok(json!(true)));
        }
        for falsy in [json!(false), json!("No"), json!("off"), json!(0), json!("0")] {
            assert_eq!(coerce(&ParamType::Boolean, falsy), Ok(json!(false)));
        }
        assert!(coerce(&ParamType::Boolean, json!(2)).is_err());
        assert!(coerce(&ParamType::Boolean, json!("maybe")).is_err());
    }

    #[test]
    fn strings_are_strict() {
        assert_eq!(coerce(&ParamType::String, json!("hi")), Ok(json!("hi")));
        assert!(coerce(&ParamType::String, json!(5)).is_err());
        assert!(coerce(&ParamType::String, json!(["hi"])).is_err());
    }

    #[test]
    fn arrays_report_each_bad_element() {
        let ty = ParamType::array(ParamType::Integer);
        assert_eq!(coerce(&ty, json!(["1", 2])), Ok(json!([1, 2])));

        let failures = coerce(&ty, json!(["a", 2, "b"])).expect_err("bad items");
        let paths: Vec<_> = failures.iter().map(FieldError::path).collect();
        assert_eq!(paths, ["x[0]", "x[2]"]);
    }

    #[test]
    fn maps_coerce_values_by_key() {
        let ty = ParamType::map(ParamType::Boolean);
        assert_eq!(
            coerce(&ty, json!({ "a": "yes", "b": 0 })),
            Ok(json!({ "a": true, "b": false }))
        );
        let failures = coerce(&ty, json!({ "a": "maybe" })).expect_err("bad value");
        assert_eq!(failures[0].path(), "x.a");
    }

    #[test]
    fn objects_check_fields_and_drop_extras() {
        let ty = ParamType::object([
            ParameterSpec::new("prompt", ParamType::String),
            ParameterSpec::new("limit", ParamType::optional(ParamType::Integer)),
        ]);
        assert_eq!(
            coerce(&ty, json!({ "prompt": "hi", "limit": "3", "noise": 1 })),
            Ok(json!({ "prompt": "hi", "limit": 3 }))
        );

        let failures = coerce(&ty, json!({ "limit": "many" })).expect_err("bad object");
        let paths: Vec<_> = failures.iter().map(FieldError::path).collect();
        assert_eq!(paths, ["x.prompt", "x.limit"]);
    }

    #[test]
    fn optional_accepts_null_and_any_passes_through() {
        let ty = ParamType::optional(ParamType::Integer);
        assert_eq!(coerce(&ty, Value::Null), Ok(Value::Null));
        assert_eq!(coerce(&ty, json!("4")), Ok(json!(4)));
        assert_eq!(
            coerce(&ParamType::Any, json!({ "k": [1] })),
            Ok(json!({ "k": [1] }))
        );
    }
}

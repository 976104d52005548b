//! Parameter kinds and the mapping from Rust types onto them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde_json::{Map, Value, json};

use crate::coerce;
use crate::error::ValidationError;
use crate::schema::{ParameterSpec, object_schema};

/// Structural kind of a single parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// UTF-8 string.
    String,
    /// Whole number.
    Integer,
    /// Floating point or whole number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Homogeneous list.
    Array(Box<ParamType>),
    /// String-keyed object with homogeneous values.
    Map(Box<ParamType>),
    /// Object with named fields.
    Object(Vec<ParameterSpec>),
    /// Value that may be `null`.
    Optional(Box<ParamType>),
    /// Any JSON value; passed through unchecked.
    Any,
}

impl ParamType {
    /// List of `inner` values.
    #[must_use]
    pub fn array(inner: ParamType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// String-keyed map of `inner` values.
    #[must_use]
    pub fn map(inner: ParamType) -> Self {
        Self::Map(Box::new(inner))
    }

    /// Nullable `inner` value.
    #[must_use]
    pub fn optional(inner: ParamType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Object with the supplied fields.
    #[must_use]
    pub fn object(fields: impl IntoIterator<Item = ParameterSpec>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// Short human-readable name used in validation messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Integer => "integer".into(),
            Self::Number => "number".into(),
            Self::Boolean => "boolean".into(),
            Self::Array(inner) => format!("array of {}", inner.type_name()),
            Self::Map(inner) => format!("map of {}", inner.type_name()),
            Self::Object(_) => "object".into(),
            Self::Optional(inner) => format!("{} or null", inner.type_name()),
            Self::Any => "any".into(),
        }
    }

    /// Renders the kind as a JSON-schema fragment.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Array(inner) => json!({ "type": "array", "items": inner.to_json_schema() }),
            Self::Map(inner) => json!({
                "type": "object",
                "additionalProperties": inner.to_json_schema(),
            }),
            Self::Object(fields) => Value::Object(object_schema(fields)),
            Self::Optional(inner) => json!({
                "anyOf": [inner.to_json_schema(), { "type": "null" }],
            }),
            Self::Any => Value::Object(Map::new()),
        }
    }

    /// Coerces a single value against this kind.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every nested failure, reported at
    /// `path`.
    pub fn coerce(&self, path: &str, value: Value) -> Result<Value, ValidationError> {
        let mut failures = Vec::new();
        match coerce::coerce_value(self, value, path, &mut failures) {
            Some(value) if failures.is_empty() => Ok(value),
            _ => Err(ValidationError::new(failures)),
        }
    }
}

/// Rust types that can appear as agent parameters.
///
/// Implemented for the standard scalar, collection, and JSON types. Structs
/// usually get an implementation from `#[derive(ParamSchema)]`.
pub trait ParamSchema {
    /// Structural kind used for schema derivation and coercion.
    fn param_type() -> ParamType;

    /// Whether callers must supply the argument.
    fn required() -> bool {
        true
    }
}

macro_rules! scalar_param {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl ParamSchema for $ty {
                fn param_type() -> ParamType {
                    ParamType::$kind
                }
            }
        )+
    };
}

scalar_param!(String => String);
scalar_param!(Boolean => bool);
scalar_param!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
scalar_param!(Number => f32, f64);
scalar_param!(Any => Value);

impl<T: ParamSchema> ParamSchema for Option<T> {
    fn param_type() -> ParamType {
        ParamType::optional(T::param_type())
    }

    fn required() -> bool {
        false
    }
}

impl<T: ParamSchema> ParamSchema for Box<T> {
    fn param_type() -> ParamType {
        T::param_type()
    }

    fn required() -> bool {
        T::required()
    }
}

impl<T: ParamSchema> ParamSchema for Vec<T> {
    fn param_type() -> ParamType {
        ParamType::array(T::param_type())
    }
}

impl<T: ParamSchema> ParamSchema for VecDeque<T> {
    fn param_type() -> ParamType {
        ParamType::array(T::param_type())
    }
}

impl<T: ParamSchema, S> ParamSchema for HashSet<T, S> {
    fn param_type() -> ParamType {
        ParamType::array(T::param_type())
    }
}

impl<T: ParamSchema> ParamSchema for BTreeSet<T> {
    fn param_type() -> ParamType {
        ParamType::array(T::param_type())
    }
}

impl<T: ParamSchema, S> ParamSchema for HashMap<String, T, S> {
    fn param_type() -> ParamType {
        ParamType::map(T::param_type())
    }
}

impl<T: ParamSchema> ParamSchema for BTreeMap<String, T> {
    fn param_type() -> ParamType {
        ParamType::map(T::param_type())
    }
}

impl ParamSchema for Map<String, Value> {
    fn param_type() -> ParamType {
        ParamType::map(ParamType::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rust_types_to_kinds() {
        assert_eq!(u8::param_type(), ParamType::Integer);
        assert_eq!(f32::param_type(), ParamType::Number);
        assert_eq!(
            Vec::<Option<String>>::param_type(),
            ParamType::array(ParamType::optional(ParamType::String))
        );
        assert_eq!(
            HashMap::<String, bool>::param_type(),
            ParamType::map(ParamType::Boolean)
        );
        assert!(i64::required());
        assert!(!Option::<i64>::required());
    }

    #[test]
    fn type_names_read_naturally() {
        assert_eq!(
            ParamType::array(ParamType::optional(ParamType::Integer)).type_name(),
            "array of integer or null"
        );
    }

    #[test]
    fn renders_nested_json_schema() {
        let schema = ParamType::optional(ParamType::array(ParamType::Number)).to_json_schema();
        assert_eq!(
            schema,
            json!({
                "anyOf": [
                    { "type": "array", "items": { "type": "number" } },
                    { "type": "null" }
                ]
            })
        );
        assert_eq!(ParamType::Any.to_json_schema(), json!({}));
    }
}

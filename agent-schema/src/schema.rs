//! Declared parameters, derived schemas, and argument validation.

use std::collections::HashSet;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::coerce;
use crate::error::{FieldError, SchemaError, SchemaResult, ValidationError};
use crate::types::{ParamSchema, ParamType};

/// One parameter of a derived schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSpec {
    name: String,
    ty: ParamType,
    required: bool,
    description: Option<String>,
}

impl ParameterSpec {
    /// Creates a parameter of the given kind. Optional kinds are not required.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        let required = !matches!(ty, ParamType::Optional(_));
        Self {
            name: name.into(),
            ty,
            required,
            description: None,
        }
    }

    /// Creates a parameter describing the Rust type `T`.
    #[must_use]
    pub fn of<T: ParamSchema>(name: impl Into<String>) -> Self {
        Self::new(name, T::param_type()).with_required(T::required())
    }

    /// Overrides whether the parameter must be supplied.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind.
    #[must_use]
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Whether callers must supply the parameter.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn to_property(&self) -> Value {
        let mut property = match self.ty.to_json_schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        property.insert("title".into(), Value::String(title_case(&self.name)));
        if let Some(description) = &self.description {
            property.insert("description".into(), Value::String(description.clone()));
        }
        if !self.required && matches!(self.ty, ParamType::Optional(_)) {
            property.insert("default".into(), Value::Null);
        }
        Value::Object(property)
    }
}

/// A parameter as declared by a function signature, before derivation.
///
/// The type is absent when the signature gives no static type for the
/// parameter; such declarations cannot be turned into a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    name: String,
    ty: Option<ParamType>,
    required: bool,
    description: Option<String>,
}

impl ParamDecl {
    /// Declares a parameter of Rust type `T`.
    #[must_use]
    pub fn typed<T: ParamSchema>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(T::param_type()),
            required: T::required(),
            description: None,
        }
    }

    /// Declares a parameter with an explicit kind.
    #[must_use]
    pub fn with_type(name: impl Into<String>, ty: ParamType) -> Self {
        let required = !matches!(ty, ParamType::Optional(_));
        Self {
            name: name.into(),
            ty: Some(ty),
            required,
            description: None,
        }
    }

    /// Declares a parameter whose type is not statically known.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            required: true,
            description: None,
        }
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind, if known.
    #[must_use]
    pub fn ty(&self) -> Option<&ParamType> {
        self.ty.as_ref()
    }
}

/// Structural description of the arguments an agent accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSchema {
    title: String,
    parameters: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Derives a schema from declared parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UntypedParameter`] when a declaration carries no
    /// type, [`SchemaError::EmptyParameterName`] for blank names, and
    /// [`SchemaError::DuplicateParameter`] when a name repeats.
    pub fn derive(title: impl Into<String>, declarations: &[ParamDecl]) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(declarations.len());
        let mut parameters = Vec::with_capacity(declarations.len());

        for decl in declarations {
            if decl.name.trim().is_empty() {
                return Err(SchemaError::EmptyParameterName);
            }
            if !seen.insert(decl.name.as_str()) {
                return Err(SchemaError::DuplicateParameter {
                    parameter: decl.name.clone(),
                });
            }
            let ty = decl.ty.clone().ok_or_else(|| SchemaError::UntypedParameter {
                parameter: decl.name.clone(),
            })?;

            parameters.push(ParameterSpec {
                name: decl.name.clone(),
                ty,
                required: decl.required,
                description: decl.description.clone(),
            });
        }

        Ok(Self {
            title: title.into(),
            parameters,
        })
    }

    /// Title advertised in the schema document.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the agent takes no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Renders the schema as a JSON-schema object document.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut document = Map::new();
        document.insert("title".into(), Value::String(self.title.clone()));
        document.extend(object_schema(&self.parameters));
        Value::Object(document)
    }

    /// Validates and coerces call arguments.
    ///
    /// `null` is treated as an empty argument object. Every failing field is
    /// reported, including missing required arguments and arguments the schema
    /// does not name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when any argument fails.
    pub fn validate(&self, arguments: Value) -> Result<Map<String, Value>, ValidationError> {
        let mut supplied = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ValidationError::single(FieldError::new(
                    "$",
                    "object",
                    format!("arguments must be an object, got {}", coerce::describe(&other)),
                )));
            }
        };

        let mut failures = Vec::new();
        let validated = coerce::coerce_fields(&self.parameters, &mut supplied, "", &mut failures);

        for unexpected in supplied.keys() {
            failures.push(FieldError::new(
                unexpected.as_str(),
                "no such parameter",
                "unexpected argument",
            ));
        }

        if failures.is_empty() {
            Ok(validated)
        } else {
            Err(ValidationError::new(failures))
        }
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_schema().serialize(serializer)
    }
}

pub(crate) fn object_schema(fields: &[ParameterSpec]) -> Map<String, Value> {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|field| (field.name.clone(), field.to_property()))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

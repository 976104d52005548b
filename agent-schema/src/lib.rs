//! Parameter schemas for registered agents.
//!
//! A function signature is first described as a list of [`ParamDecl`]s. Schema
//! derivation turns those declarations into a [`ParameterSchema`], a plain
//! value that can be rendered as a JSON-schema document for remote callers and
//! used to validate and coerce incoming arguments field by field.

#![warn(missing_docs, clippy::pedantic)]

mod coerce;
mod error;
mod schema;
mod types;

pub use error::{FieldError, SchemaError, SchemaResult, ValidationError};
pub use schema::{ParamDecl, ParameterSchema, ParameterSpec};
pub use types::{ParamSchema, ParamType};

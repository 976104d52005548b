//! Errors produced while deriving schemas and validating arguments.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Result alias for schema derivation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Reasons a declared parameter list cannot be turned into a schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter carries no statically known type.
    #[error("parameter `{parameter}` has no declared type")]
    UntypedParameter {
        /// Name of the offending parameter.
        parameter: String,
    },

    /// A parameter was declared with a blank name.
    #[error("parameter name cannot be empty")]
    EmptyParameterName,

    /// Two parameters share a name.
    #[error("parameter `{parameter}` is declared more than once")]
    DuplicateParameter {
        /// Name declared twice.
        parameter: String,
    },
}

impl SchemaError {
    /// Returns the parameter the error refers to, when there is one.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::UntypedParameter { parameter } | Self::DuplicateParameter { parameter } => {
                Some(parameter)
            }
            Self::EmptyParameterName => None,
        }
    }
}

/// A single argument that failed coercion or validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    path: String,
    expected: String,
    reason: String,
}

impl FieldError {
    /// Creates a failure for the argument at `path`.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// Location of the failing value, e.g. `items[2]` or `input.prompt`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable name of the type the schema expected.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Why the value was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {} (expected {})", self.path, self.reason, self.expected)
    }
}

/// Every argument failure found while validating one call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct ValidationError {
    failures: Vec<FieldError>,
}

impl ValidationError {
    /// Builds an error from the collected failures.
    ///
    /// Callers only construct this with at least one failure.
    #[must_use]
    pub fn new(failures: Vec<FieldError>) -> Self {
        debug_assert!(!failures.is_empty());
        Self { failures }
    }

    /// Builds an error for a single failing argument.
    #[must_use]
    pub fn single(failure: FieldError) -> Self {
        Self {
            failures: vec![failure],
        }
    }

    /// Returns every failure, in schema order.
    #[must_use]
    pub fn failures(&self) -> &[FieldError] {
        &self.failures
    }

    /// Returns the failure reported for `path`, if any.
    #[must_use]
    pub fn failure(&self, path: &str) -> Option<&FieldError> {
        self.failures.iter().find(|failure| failure.path == path)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let count = self.failures.len();
        let noun = if count == 1 { "argument" } else { "arguments" };
        write!(f, "{count} {noun} failed validation")?;
        for (idx, failure) in self.failures.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

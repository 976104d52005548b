//! Errors produced by agent registration and invocation.

use std::any::Any;

use agent_schema::{SchemaError, ValidationError};
use thiserror::Error;

/// Result alias for registry operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Boxed error returned by agent bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by agent registration and invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The function could not be turned into a named template.
    #[error("invalid agent template: {reason}")]
    InvalidTemplate {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// The function's parameters could not be described by a schema.
    #[error("cannot derive parameter schema for agent `{agent}`: {source}")]
    SchemaDerivation {
        /// Name the agent would have been registered under.
        agent: String,
        /// Underlying derivation failure.
        #[source]
        source: SchemaError,
    },

    /// Call arguments were rejected before the agent body ran.
    #[error("invalid arguments for agent `{agent}`: {source}")]
    ArgumentValidation {
        /// Name of the invoked agent.
        agent: String,
        /// Every failing argument.
        #[source]
        source: ValidationError,
    },

    /// No agent is registered under the requested name.
    #[error("agent `{name}` is not registered")]
    UnknownAgent {
        /// Name of the missing agent.
        name: String,
    },

    /// The agent body failed.
    #[error("agent `{agent}` failed: {source}")]
    Execution {
        /// Name of the invoked agent.
        agent: String,
        /// Failure raised by the body.
        #[source]
        source: BoxError,
    },
}

impl AgentError {
    /// Returns the argument failures when this is a validation error.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::ArgumentValidation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure recorded when an agent body panics.
#[derive(Debug, Error)]
#[error("agent panicked: {message}")]
pub struct AgentPanic {
    message: String,
}

impl AgentPanic {
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self { message }
    }

    /// The panic message, when the payload was a string.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

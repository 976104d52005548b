//! Schema-bound agent templates.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use agent_primitives::{AgentContext, AgentName};
use agent_schema::ParameterSchema;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AgentError, AgentPanic, AgentResult};
use crate::function::{AgentHandler, Arguments, CallError, Conversions, FunctionSpec};

/// Document advertised to remote callers for one agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Name the agent is invoked by.
    pub name: String,
    /// Human-readable description; may be empty.
    pub description: String,
    /// JSON-schema document of the accepted arguments.
    pub parameters: Value,
}

/// A function bound to its derived parameter schema.
///
/// Templates are immutable once built. Every invocation validates and coerces
/// its arguments against [`AgentTemplate::parameters`] before the wrapped
/// function runs.
pub struct AgentTemplate {
    name: AgentName,
    description: String,
    parameters: ParameterSchema,
    conversions: Conversions,
    handler: Arc<dyn AgentHandler>,
}

impl AgentTemplate {
    /// Builds a template from a function description.
    ///
    /// `name` overrides the function's declared name and `description`, when
    /// non-blank, overrides its documentation.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidTemplate`] when no valid name can be
    /// resolved and [`AgentError::SchemaDerivation`] when a parameter cannot be
    /// described.
    pub fn from_function(
        function: FunctionSpec,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AgentResult<Self> {
        let resolved = name
            .or_else(|| function.name())
            .ok_or_else(|| AgentError::InvalidTemplate {
                reason: "anonymous functions must be registered with an explicit name".into(),
            })?;
        let name = AgentName::new(resolved).map_err(|err| AgentError::InvalidTemplate {
            reason: err.to_string(),
        })?;

        let parameters = ParameterSchema::derive(name.as_str(), function.params()).map_err(
            |source| AgentError::SchemaDerivation {
                agent: name.to_string(),
                source,
            },
        )?;

        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .or_else(|| function.doc())
            .unwrap_or_default()
            .to_owned();

        Ok(Self {
            name,
            description,
            parameters,
            conversions: function.conversions(),
            handler: function.handler(),
        })
    }

    /// Name the template is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Validated name.
    #[must_use]
    pub fn agent_name(&self) -> &AgentName {
        &self.name
    }

    /// Human-readable description; empty when none was available.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Derived parameter schema.
    #[must_use]
    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    /// Document advertised to remote callers.
    #[must_use]
    pub fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor {
            name: self.name.to_string(),
            description: self.description.clone(),
            parameters: self.parameters.to_json_schema(),
        }
    }

    /// Invokes the wrapped function without a context value.
    ///
    /// # Errors
    ///
    /// See [`AgentTemplate::invoke_with_context`].
    pub async fn invoke(&self, arguments: Value) -> AgentResult<Value> {
        self.invoke_with_context(arguments, AgentContext::empty())
            .await
    }

    /// Validates `arguments`, then runs the wrapped function to completion.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ArgumentValidation`] without running the function
    /// when arguments are rejected, and [`AgentError::Execution`] when the
    /// function returns an error or panics.
    pub async fn invoke_with_context(
        &self,
        arguments: Value,
        context: AgentContext,
    ) -> AgentResult<Value> {
        let validated = self
            .parameters
            .validate(arguments)
            .and_then(|validated| self.conversions.check(&validated).map(|()| validated))
            .map_err(|source| {
                debug!(agent = %self.name, error = %source, "agent arguments rejected");
                AgentError::ArgumentValidation {
                    agent: self.name.to_string(),
                    source,
                }
            })?;

        let call = self.handler.call(Arguments::new(validated), context);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(CallError::Arguments(source))) => {
                debug!(agent = %self.name, error = %source, "agent arguments rejected");
                Err(AgentError::ArgumentValidation {
                    agent: self.name.to_string(),
                    source,
                })
            }
            Ok(Err(CallError::Failed(source))) => {
                warn!(agent = %self.name, error = %source, "agent execution failed");
                Err(AgentError::Execution {
                    agent: self.name.to_string(),
                    source,
                })
            }
            Err(payload) => {
                let panic = AgentPanic::from_payload(payload.as_ref());
                warn!(agent = %self.name, error = %panic, "agent panicked");
                Err(AgentError::Execution {
                    agent: self.name.to_string(),
                    source: Box::new(panic),
                })
            }
        }
    }
}

impl fmt::Debug for AgentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTemplate")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

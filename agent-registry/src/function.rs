//! Function descriptions accepted by the registry.
//!
//! A [`FunctionSpec`] is what the registry needs to know about a callable: its
//! declared name (absent for closures), its documentation, its declared
//! parameters, and an erased handler. `#[agent]` builds one from an ordinary
//! `fn` or `async fn`; [`FunctionSpec::sync`] and [`FunctionSpec::asynchronous`]
//! build one from a closure.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use agent_primitives::AgentContext;
use agent_schema::{FieldError, ParamDecl, ParamSchema, ValidationError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BoxError;

/// Outcome of a single handler call.
pub type CallResult = Result<Value, CallError>;

/// Future produced by every handler, whether the wrapped function is
/// synchronous or asynchronous.
pub type AgentFuture = Pin<Box<dyn Future<Output = CallResult> + Send>>;

/// Failure reported by a handler.
#[derive(Debug)]
pub enum CallError {
    /// An argument could not be extracted into the parameter's Rust type.
    /// Generated handlers report this before the function body runs.
    Arguments(ValidationError),
    /// The function body failed. Whatever the body returned is kept as is,
    /// including a [`ValidationError`] of its own.
    Failed(BoxError),
}

impl CallError {
    /// Wraps a body failure.
    #[must_use]
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Failed(error.into())
    }
}

impl From<ValidationError> for CallError {
    fn from(value: ValidationError) -> Self {
        Self::Arguments(value)
    }
}

/// Validated call arguments handed to a handler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Wraps already validated arguments.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Removes the named argument and converts it into `T`.
    ///
    /// Absent arguments are read as `null`, so `Option` parameters may be
    /// omitted by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the argument when the value does not
    /// deserialize into `T`.
    pub fn take<T>(&mut self, name: &str) -> Result<T, ValidationError>
    where
        T: DeserializeOwned,
    {
        let value = self.values.remove(name).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| {
            ValidationError::single(FieldError::new(
                name,
                std::any::type_name::<T>(),
                err.to_string(),
            ))
        })
    }

    /// Borrows the named argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` if the argument was supplied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of remaining arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the remaining arguments.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

/// Check that a validated argument deserializes into a parameter's Rust type.
#[derive(Clone)]
struct Conversion {
    name: String,
    expected: &'static str,
    check: fn(&Value) -> Result<(), String>,
}

fn deserializes_into<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    <T as Deserialize<'_>>::deserialize(value)
        .map(drop)
        .map_err(|err| err.to_string())
}

/// Rust-type checks for the typed parameters of one function.
///
/// Runs after schema validation so that a value the schema accepts but the
/// Rust type cannot hold (`300` for a `u8`) is rejected before the body runs.
#[derive(Clone, Default)]
pub(crate) struct Conversions(Vec<Conversion>);

impl Conversions {
    fn push<T: DeserializeOwned>(&mut self, name: &str) {
        self.0.push(Conversion {
            name: name.to_owned(),
            expected: std::any::type_name::<T>(),
            check: deserializes_into::<T>,
        });
    }

    /// Checks every typed argument, collecting all failures.
    pub(crate) fn check(&self, arguments: &Map<String, Value>) -> Result<(), ValidationError> {
        let null = Value::Null;
        let failures: Vec<FieldError> = self
            .0
            .iter()
            .filter_map(|conversion| {
                let value = arguments.get(&conversion.name).unwrap_or(&null);
                (conversion.check)(value)
                    .err()
                    .map(|reason| FieldError::new(&conversion.name, conversion.expected, reason))
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(failures))
        }
    }
}

/// Erased callable behind a template.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Runs the wrapped function with validated arguments.
    async fn call(&self, arguments: Arguments, context: AgentContext) -> CallResult;
}

#[async_trait]
impl<F, Fut> AgentHandler for F
where
    F: Send + Sync + Fn(Arguments, AgentContext) -> Fut,
    Fut: Future<Output = CallResult> + Send,
{
    async fn call(&self, arguments: Arguments, context: AgentContext) -> CallResult {
        (self)(arguments, context).await
    }
}

/// Description of a callable that can be registered as an agent.
#[derive(Clone)]
pub struct FunctionSpec {
    name: Option<String>,
    doc: Option<String>,
    params: Vec<ParamDecl>,
    conversions: Conversions,
    handler: Arc<dyn AgentHandler>,
}

impl FunctionSpec {
    /// Creates an anonymous spec around an erased handler with no declared
    /// parameters.
    #[must_use]
    pub fn from_handler<H>(handler: H) -> Self
    where
        H: AgentHandler + 'static,
    {
        Self {
            name: None,
            doc: None,
            params: Vec::new(),
            conversions: Conversions::default(),
            handler: Arc::new(handler),
        }
    }

    /// Wraps a synchronous closure.
    ///
    /// The closure runs when the invocation future is first polled and never
    /// suspends.
    #[must_use]
    pub fn sync<F, T, E>(function: F) -> Self
    where
        F: Fn(Arguments, AgentContext) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<BoxError> + 'static,
    {
        let function = Arc::new(function);
        Self::from_handler(
            move |arguments: Arguments, context: AgentContext| -> AgentFuture {
                let function = Arc::clone(&function);
                Box::pin(async move { output_result(function(arguments, context)) })
            },
        )
    }

    /// Wraps a closure returning a future.
    #[must_use]
    pub fn asynchronous<F, Fut, T, E>(function: F) -> Self
    where
        F: Fn(Arguments, AgentContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Serialize + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::from_handler(
            move |arguments: Arguments, context: AgentContext| -> AgentFuture {
                let pending = function(arguments, context);
                Box::pin(async move { output_result(pending.await) })
            },
        )
    }

    /// Sets the declared function name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the function documentation used as the default description.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        let doc = doc.into();
        let trimmed = doc.trim();
        self.doc = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Declares a parameter of Rust type `T`.
    ///
    /// Arguments for it are checked against both the schema of `T` and `T`'s
    /// `Deserialize` impl before the function runs, so
    /// [`Arguments::take`] cannot fail for it inside the body.
    #[must_use]
    pub fn param<T>(mut self, name: impl Into<String>) -> Self
    where
        T: ParamSchema + DeserializeOwned,
    {
        let name = name.into();
        self.conversions.push::<T>(&name);
        self.declare(ParamDecl::typed::<T>(name))
    }

    /// Declares a documented parameter of Rust type `T`.
    #[must_use]
    pub fn param_described<T>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self
    where
        T: ParamSchema + DeserializeOwned,
    {
        let name = name.into();
        self.conversions.push::<T>(&name);
        self.declare(ParamDecl::typed::<T>(name).with_description(description))
    }

    /// Declares a parameter without a static type. Registration of a spec
    /// containing one fails schema derivation.
    #[must_use]
    pub fn untyped_param(self, name: impl Into<String>) -> Self {
        self.declare(ParamDecl::untyped(name))
    }

    /// Appends an arbitrary declaration.
    #[must_use]
    pub fn declare(mut self, decl: ParamDecl) -> Self {
        self.params.push(decl);
        self
    }

    /// Declared function name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Function documentation, if any.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Declared parameters in signature order.
    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    pub(crate) fn handler(&self) -> Arc<dyn AgentHandler> {
        Arc::clone(&self.handler)
    }

    pub(crate) fn conversions(&self) -> Conversions {
        self.conversions.clone()
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Serializes a function's return value.
///
/// # Errors
///
/// Returns [`CallError::Failed`] if the value cannot be represented as JSON.
pub fn output_value<T: Serialize>(value: T) -> CallResult {
    serde_json::to_value(value).map_err(|err| CallError::Failed(Box::new(err)))
}

/// Serializes a fallible function's return value.
///
/// # Errors
///
/// Returns the function's own error as [`CallError::Failed`].
pub fn output_result<T, E>(result: Result<T, E>) -> CallResult
where
    T: Serialize,
    E: Into<BoxError>,
{
    match result {
        Ok(value) => output_value(value),
        Err(err) => Err(CallError::Failed(err.into())),
    }
}

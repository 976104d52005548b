//! Registration and validated dispatch of agent functions.
//!
//! Functions are described by a [`FunctionSpec`], usually generated by the
//! [`agent`] attribute. Registering one with an [`AgentRegistry`] derives its
//! [`ParameterSchema`] and stores an immutable [`AgentTemplate`]; invoking it by
//! name validates and coerces the arguments, then awaits the function whether
//! it is synchronous or asynchronous.
//!
//! ```ignore
//! use agent_registry::{AgentRegistry, agent};
//!
//! /// Adds two numbers.
//! #[agent]
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let registry = AgentRegistry::default();
//! registry.add(add_agent(), None, None)?;
//! let sum = registry.invoke("add", serde_json::json!({ "a": "2", "b": 3 })).await?;
//! assert_eq!(sum, 5);
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod collect;
pub mod error;
pub mod function;
pub mod registry;
pub mod template;

pub use agent_primitives::{AgentContext, AgentName};
pub use agent_registry_macros::{ParamSchema, agent};
pub use agent_schema::{
    FieldError, ParamDecl, ParamSchema, ParamType, ParameterSchema, ParameterSpec, SchemaError,
    ValidationError,
};
pub use collect::AgentDefinition;
pub use error::{AgentError, AgentPanic, AgentResult, BoxError};
pub use function::{AgentFuture, AgentHandler, Arguments, CallError, CallResult, FunctionSpec};
pub use registry::AgentRegistry;
pub use template::{AgentDescriptor, AgentTemplate};

#[doc(hidden)]
pub mod __private {
    pub use crate::function::{output_result, output_value};
    pub use inventory;
}

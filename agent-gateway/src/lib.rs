//! Facade for building agent registries.
//!
//! Depend on this crate to get the registry, its schema model and its
//! configuration loader under one name. Components sit behind feature flags so
//! downstream users can enable only what they need.
//!
//! ```ignore
//! use agent_gateway::prelude::*;
//!
//! #[agent(crate = "agent_gateway::registry")]
//! fn shout(text: String) -> String {
//!     text.to_uppercase()
//! }
//!
//! let registry = AgentRegistry::with_config(&RegistryConfig::from_env()?);
//! registry.add(shout_agent(), None, None)?;
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agent_primitives as primitives;

/// Parameter types, schemas and argument coercion.
pub use agent_schema as schema;

/// Agent registration and dispatch (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use agent_registry as registry;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use agent_config as config;

/// Commonly used items.
pub mod prelude {
    pub use agent_primitives::{AgentContext, AgentName};
    #[cfg(not(feature = "registry"))]
    pub use agent_schema::ParamSchema;
    pub use agent_schema::{ParamType, ParameterSchema, ValidationError};

    #[cfg(feature = "config")]
    pub use agent_config::RegistryConfig;
    #[cfg(feature = "registry")]
    pub use agent_registry::{
        AgentError, AgentRegistry, AgentResult, AgentTemplate, Arguments, FunctionSpec, ParamSchema,
        agent,
    };
}

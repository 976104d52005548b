//! Core shared types for the agent registry.

#![warn(missing_docs, clippy::pedantic)]

mod context;
mod error;
mod name;

/// Opaque value passed through to agents on invocation.
pub use context::AgentContext;
/// Error type and result alias shared across the SDK.
pub use error::{Error, Result};
/// Validated name under which agents are registered.
pub use name::AgentName;

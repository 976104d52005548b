//! Shared error definitions for agent primitives.

use thiserror::Error;

/// Result alias used throughout the agent registry.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating agent primitive types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Agent name failed validation.
    #[error("invalid agent name `{name}`: {reason}")]
    InvalidAgentName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

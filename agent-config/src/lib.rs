//! Configuration management for the agent registry.
//!
//! Settings are plain serde structs so hosts can embed them in their own
//! configuration files; [`RegistryConfig::from_env`] covers the common case of
//! environment-driven deployments.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable controlling [`RegistryConfig::warn_on_duplicate`].
pub const WARN_ON_DUPLICATE_ENV: &str = "AGENT_REGISTRY_WARN_ON_DUPLICATE";

/// Settings applied when constructing an agent registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Log a warning when an agent name is registered twice.
    pub warn_on_duplicate: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            warn_on_duplicate: true,
        }
    }
}

impl RegistryConfig {
    /// Sets the duplicate-registration warning policy.
    #[must_use]
    pub fn with_warn_on_duplicate(mut self, warn: bool) -> Self {
        self.warn_on_duplicate = warn;
        self
    }

    /// Loads settings from the process environment, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(WARN_ON_DUPLICATE_ENV) {
            config.warn_on_duplicate = parse_flag(&raw)
                .with_context(|| format!("invalid value for {WARN_ON_DUPLICATE_ENV}"))?;
        }
        debug!(warn_on_duplicate = config.warn_on_duplicate, "registry config loaded");
        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean flag, got `{other}`"),
    }
}

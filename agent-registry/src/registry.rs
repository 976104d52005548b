//! Runtime registry for agent templates and dispatch.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agent_config::RegistryConfig;
use agent_primitives::AgentContext;
use serde_json::Value;
use tracing::{debug, warn};

use crate::collect;
use crate::error::{AgentError, AgentResult};
use crate::function::FunctionSpec;
use crate::template::{AgentDescriptor, AgentTemplate};

#[derive(Default)]
struct Entries {
    by_name: HashMap<String, Arc<AgentTemplate>>,
    order: Vec<Arc<AgentTemplate>>,
}

/// Registry that stores agent templates keyed by name.
///
/// The first registration of a name wins: adding another function under an
/// existing name returns the template already stored.
pub struct AgentRegistry {
    entries: RwLock<Entries>,
    warn_on_duplicate: bool,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.read();
        let names: Vec<_> = entries.order.iter().map(|t| t.name()).collect();
        f.debug_struct("AgentRegistry")
            .field("registered", &names)
            .field("warn_on_duplicate", &self.warn_on_duplicate)
            .finish()
    }
}

impl AgentRegistry {
    /// Creates an empty registry.
    ///
    /// `warn_on_duplicate` controls whether a repeated name is logged at warn
    /// level.
    #[must_use]
    pub fn new(warn_on_duplicate: bool) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            warn_on_duplicate,
        }
    }

    /// Creates an empty registry from loaded settings.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self::new(config.warn_on_duplicate)
    }

    /// Whether duplicate registrations are logged as warnings.
    #[must_use]
    pub fn warn_on_duplicate(&self) -> bool {
        self.warn_on_duplicate
    }

    /// Registers a function as an agent.
    ///
    /// Returns the stored template. If the resolved name is already taken the
    /// existing template is returned and `function` is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidTemplate`] or
    /// [`AgentError::SchemaDerivation`] when no template can be built; nothing
    /// is stored in that case.
    pub fn add(
        &self,
        function: FunctionSpec,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AgentResult<Arc<AgentTemplate>> {
        let template = AgentTemplate::from_function(function, name, description)?;

        let mut entries = self.write();
        if let Some(existing) = entries.by_name.get(template.name()) {
            if self.warn_on_duplicate {
                warn!(agent = %template.name(), "agent already exists");
            } else {
                debug!(agent = %template.name(), "agent already exists");
            }
            return Ok(Arc::clone(existing));
        }

        let template = Arc::new(template);
        entries
            .by_name
            .insert(template.name().to_owned(), Arc::clone(&template));
        entries.order.push(Arc::clone(&template));
        debug!(
            agent = %template.name(),
            parameters = template.parameters().len(),
            "agent registered"
        );
        Ok(template)
    }

    /// Registers every function annotated with `#[agent(collect)]` that is
    /// linked into the binary.
    ///
    /// # Errors
    ///
    /// Stops at the first function that cannot be turned into a template.
    pub fn add_collected(&self) -> AgentResult<Vec<Arc<AgentTemplate>>> {
        collect::functions()
            .map(|function| self.add(function, None, None))
            .collect()
    }

    /// Returns the template registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<AgentTemplate>> {
        self.read().by_name.get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    /// Snapshot of every registered template in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<AgentTemplate>> {
        self.read().order.clone()
    }

    /// Advertised documents of every registered template.
    #[must_use]
    pub fn descriptors(&self) -> Vec<AgentDescriptor> {
        self.read()
            .order
            .iter()
            .map(|template| template.descriptor())
            .collect()
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().order.is_empty()
    }

    /// Invokes a registered agent by name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAgent`] when the name is not registered and
    /// otherwise propagates the template's errors unchanged.
    pub async fn invoke(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        self.invoke_with_context(name, arguments, AgentContext::empty())
            .await
    }

    /// Invokes a registered agent by name, passing `context` through to
    /// functions that accept it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAgent`] when the name is not registered and
    /// otherwise propagates the template's errors unchanged.
    pub async fn invoke_with_context(
        &self,
        name: &str,
        arguments: Value,
        context: AgentContext,
    ) -> AgentResult<Value> {
        let template = self.get(name).ok_or_else(|| AgentError::UnknownAgent {
            name: name.to_owned(),
        })?;
        debug!(agent = %name, "dispatching agent");
        template.invoke_with_context(arguments, context).await
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

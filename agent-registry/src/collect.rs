//! Link-time collection of `#[agent(collect)]` functions.

use crate::function::FunctionSpec;

/// Entry submitted by `#[agent(collect)]`.
pub struct AgentDefinition {
    build: fn() -> FunctionSpec,
}

impl AgentDefinition {
    /// Creates a definition from a spec constructor.
    #[must_use]
    pub const fn new(build: fn() -> FunctionSpec) -> Self {
        Self { build }
    }

    /// Builds the function description.
    #[must_use]
    pub fn function(&self) -> FunctionSpec {
        (self.build)()
    }
}

inventory::collect!(AgentDefinition);

pub(crate) fn functions() -> impl Iterator<Item = FunctionSpec> {
    inventory::iter::<AgentDefinition>
        .into_iter()
        .map(AgentDefinition::function)
}

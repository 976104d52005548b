//! Opaque per-invocation context.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque value threaded from the caller of an invocation to the agent body.
///
/// The registry never inspects the value; agents that declare a context
/// parameter recover the concrete type with [`AgentContext::downcast_ref`].
#[derive(Clone, Default)]
pub struct AgentContext {
    value: Option<Arc<dyn Any + Send + Sync>>,
}

impl AgentContext {
    /// Wraps the supplied value.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value: Some(Arc::new(value)),
        }
    }

    /// Wraps an already shared value without re-allocating.
    #[must_use]
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { value: Some(value) }
    }

    /// Creates a context that carries nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` when no value was supplied by the caller.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Returns a reference to the carried value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Any,
    {
        self.value.as_deref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns a shared handle to the carried value if it has type `T`.
    #[must_use]
    pub fn downcast_arc<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.value.clone().and_then(|value| value.downcast::<T>().ok())
    }
}

impl fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentContext")
            .field("present", &self.value.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestMeta {
        caller: &'static str,
    }

    #[test]
    fn downcasts_to_carried_type() {
        let ctx = AgentContext::new(RequestMeta { caller: "relay" });
        assert!(!ctx.is_empty());
        assert_eq!(ctx.downcast_ref::<RequestMeta>().map(|m| m.caller), Some("relay"));
        assert!(ctx.downcast_ref::<String>().is_none());

        let shared = ctx.downcast_arc::<RequestMeta>().expect("arc");
        assert_eq!(*shared, RequestMeta { caller: "relay" });
    }

    #[test]
    fn clones_share_the_value() {
        let ctx = AgentContext::new(42_u32);
        let clone = ctx.clone();
        let a = ctx.downcast_arc::<u32>().expect("a");
        let b = clone.downcast_arc::<u32>().expect("b");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn empty_context_yields_nothing() {
        let ctx = AgentContext::empty();
        assert!(ctx.is_empty());
        assert!(ctx.downcast_ref::<u32>().is_none());
        assert_eq!(format!("{ctx:?}"), "AgentContext { present: false }");
    }
}

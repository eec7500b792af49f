//! The push contracts and the registry a component uses to advertise them.

use crate::task::Task;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Accepts a task of a value. Implemented by the destination of a wiring,
/// so wiring runs in the same direction as the data.
///
/// The implementation must not block: it schedules whatever awaiting it
/// needs on the task's run and returns.
pub trait Continuation<T>: Send + Sync + 'static {
    /// Hand a (possibly still pending) task to this component.
    fn push_task(&self, task: Task<T>);
}

/// Accepts an already-resolved value.
pub trait Dataflow<T>: Send + Sync + 'static {
    /// Hand a value to this component.
    fn push(&self, value: T);
}

/// One capability a component implements: the trait object type it can be
/// viewed as, and a shared handle of that type.
pub struct Capability {
    id: TypeId,
    name: &'static str,
    handle: Box<dyn Any + Send + Sync>,
}

impl Capability {
    /// Register `handle` as an implementation of the capability `C`.
    ///
    /// `C` is normally a trait object type such as `dyn Continuation<i32>`.
    pub fn of<C: ?Sized + Send + Sync + 'static>(handle: Arc<C>) -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            handle: Box::new(handle),
        }
    }

    /// The type identifier used as the matching key.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name of the capability type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Recover the handle as `Arc<C>` if this capability is `C`.
    pub fn downcast<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.handle.downcast_ref::<Arc<C>>().cloned()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of capabilities implemented by one component.
#[derive(Debug, Default)]
pub struct Capabilities {
    entries: Vec<Capability>,
}

impl Capabilities {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a capability. Registering the same capability type twice keeps
    /// the first registration.
    pub fn with<C: ?Sized + Send + Sync + 'static>(mut self, handle: Arc<C>) -> Self {
        let capability = Capability::of(handle);
        if !self.implements(capability.id()) {
            self.entries.push(capability);
        }
        self
    }

    /// Whether a capability with the given type id is present.
    pub fn implements(&self, id: TypeId) -> bool {
        self.entries.iter().any(|c| c.id == id)
    }

    /// Look up the capability with the given type id.
    pub fn get(&self, id: TypeId) -> Option<&Capability> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Names of every capability, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|c| c.name).collect()
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the component implements nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the capabilities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Dataflow<i32> for Counter {
        fn push(&self, _value: i32) {}
    }

    impl Dataflow<u8> for Counter {
        fn push(&self, _value: u8) {}
    }

    #[test]
    fn downcast_recovers_handle_for_matching_type_only() {
        let handle: Arc<dyn Dataflow<i32>> = Arc::new(Counter);
        let cap = Capability::of(handle);
        assert!(cap.downcast::<dyn Dataflow<i32>>().is_some());
        assert!(cap.downcast::<dyn Dataflow<u32>>().is_none());
        assert_eq!(cap.id(), TypeId::of::<dyn Dataflow<i32>>());
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let a: Arc<dyn Dataflow<i32>> = Arc::new(Counter);
        let b: Arc<dyn Dataflow<i32>> = Arc::new(Counter);
        let caps = Capabilities::new().with(a).with(b);
        assert_eq!(caps.len(), 1);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let counter = Arc::new(Counter);
        let wide: Arc<dyn Dataflow<i32>> = counter.clone();
        let narrow: Arc<dyn Dataflow<u8>> = counter;
        let caps = Capabilities::new().with(wide).with(narrow);
        let ids: Vec<TypeId> = caps.iter().map(Capability::id).collect();
        assert_eq!(
            ids,
            vec![TypeId::of::<dyn Dataflow<i32>>(), TypeId::of::<dyn Dataflow<u8>>()]
        );
        assert_eq!(caps.names().len(), 2);
    }
}

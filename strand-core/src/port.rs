//! Typed connection slots owned by a component.
//!
//! A [`Port`] holds at most one partner and is set exactly once. A
//! [`ListPort`] holds any number of partners in wiring order; its list does
//! not exist until the first partner is attached. Both use interior
//! mutability so a component that is already shared as somebody else's
//! partner can still have its own ports filled in.

use crate::capability::Capability;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Whether a port holds one partner or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Set once, never reassigned.
    Single,
    /// Grows by one for every wiring.
    List,
}

/// Observable state of a port at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PortStatus {
    /// Nothing wired yet (for a list port: the list does not exist yet).
    Unassigned,
    /// A single-valued port holding its partner.
    Assigned,
    /// A list port holding `len` partners.
    List {
        /// Number of partners attached so far.
        len: usize,
    },
}

impl PortStatus {
    /// True for anything other than `Unassigned`.
    pub fn is_assigned(&self) -> bool {
        !matches!(self, PortStatus::Unassigned)
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatus::Unassigned => f.write_str("unassigned"),
            PortStatus::Assigned => f.write_str("assigned"),
            PortStatus::List { len } => write!(f, "{len} wired"),
        }
    }
}

/// Whether a port is part of the component's public surface.
///
/// Only private ports are wiring targets. Public ports are set directly by
/// application code and are skipped by the wiring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Discoverable by the wiring engine.
    Private,
    /// Ignored by the wiring engine.
    Public,
}

/// Why a partner could not be attached to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// The single-valued slot already holds a partner.
    AlreadyAssigned,
    /// The capability offered is not the one the slot requires.
    Incompatible,
}

/// Type-erased view of a port, used by the wiring engine.
pub trait Slot: Send + Sync {
    /// Type id of the capability this slot requires.
    fn capability_id(&self) -> TypeId;

    /// Human-readable name of the required capability.
    fn capability_name(&self) -> &'static str;

    /// Single or list.
    fn cardinality(&self) -> Cardinality;

    /// Current state.
    fn status(&self) -> PortStatus;

    /// Attach the partner behind `capability`.
    fn attach(&self, capability: &Capability) -> Result<(), AttachError>;
}

/// A single-valued port requiring capability `C`.
pub struct Port<C: ?Sized> {
    cell: OnceLock<Arc<C>>,
}

impl<C: ?Sized> Port<C> {
    /// An unassigned port.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// The wired partner, if any.
    pub fn get(&self) -> Option<&Arc<C>> {
        self.cell.get()
    }

    /// Whether a partner has been wired.
    pub fn is_assigned(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Wire a partner directly, bypassing capability matching.
    ///
    /// Fails with the rejected partner if the port is already assigned.
    pub fn set(&self, partner: Arc<C>) -> Result<(), Arc<C>> {
        self.cell.set(partner)
    }
}

impl<C: ?Sized> Default for Port<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> fmt::Debug for Port<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("capability", &std::any::type_name::<C>())
            .field("assigned", &self.is_assigned())
            .finish()
    }
}

impl<C: ?Sized + Send + Sync + 'static> Slot for Port<C> {
    fn capability_id(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn capability_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::Single
    }

    fn status(&self) -> PortStatus {
        if self.is_assigned() {
            PortStatus::Assigned
        } else {
            PortStatus::Unassigned
        }
    }

    fn attach(&self, capability: &Capability) -> Result<(), AttachError> {
        if self.is_assigned() {
            return Err(AttachError::AlreadyAssigned);
        }
        let partner = capability
            .downcast::<C>()
            .ok_or(AttachError::Incompatible)?;
        self.cell
            .set(partner)
            .map_err(|_| AttachError::AlreadyAssigned)
    }
}

/// A list-valued port requiring capability `C` for every element.
pub struct ListPort<C: ?Sized> {
    items: RwLock<Option<Vec<Arc<C>>>>,
}

impl<C: ?Sized> ListPort<C> {
    /// A port whose list has not been created yet.
    pub const fn new() -> Self {
        Self {
            items: RwLock::new(None),
        }
    }

    /// Partners in wiring order. Empty if the list was never created.
    pub fn snapshot(&self) -> Vec<Arc<C>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|items| items.to_vec())
            .unwrap_or_default()
    }

    /// Number of partners wired so far.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// True if nothing has been wired.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the first partner has been attached (and the list created).
    pub fn is_created(&self) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Append a partner directly, bypassing capability matching.
    pub fn push(&self, partner: Arc<C>) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(Vec::new)
            .push(partner);
    }
}

impl<C: ?Sized> Default for ListPort<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> fmt::Debug for ListPort<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListPort")
            .field("capability", &std::any::type_name::<C>())
            .field("len", &self.len())
            .finish()
    }
}

impl<C: ?Sized + Send + Sync + 'static> Slot for ListPort<C> {
    fn capability_id(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn capability_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::List
    }

    fn status(&self) -> PortStatus {
        if self.is_created() {
            PortStatus::List { len: self.len() }
        } else {
            PortStatus::Unassigned
        }
    }

    fn attach(&self, capability: &Capability) -> Result<(), AttachError> {
        let partner = capability
            .downcast::<C>()
            .ok_or(AttachError::Incompatible)?;
        self.push(partner);
        Ok(())
    }
}

/// One declared port of a component, as listed by [`crate::Component::ports`].
pub struct PortEntry<'a> {
    name: &'static str,
    visibility: Visibility,
    slot: &'a dyn Slot,
}

impl<'a> PortEntry<'a> {
    /// A port the wiring engine may fill.
    pub fn private(name: &'static str, slot: &'a dyn Slot) -> Self {
        Self {
            name,
            visibility: Visibility::Private,
            slot,
        }
    }

    /// A port on the public surface, never auto-wired.
    pub fn public(name: &'static str, slot: &'a dyn Slot) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            slot,
        }
    }

    /// Declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Private or public.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The underlying slot.
    pub fn slot(&self) -> &'a dyn Slot {
        self.slot
    }
}

impl fmt::Debug for PortEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortEntry")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("capability", &self.slot.capability_name())
            .field("status", &self.slot.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Dataflow;

    struct Sink;

    impl Dataflow<u8> for Sink {
        fn push(&self, _value: u8) {}
    }

    fn capability() -> Capability {
        let sink: Arc<dyn Dataflow<u8>> = Arc::new(Sink);
        Capability::of(sink)
    }

    #[test]
    fn single_port_is_set_once() {
        let port: Port<dyn Dataflow<u8>> = Port::new();
        assert_eq!(port.status(), PortStatus::Unassigned);
        port.attach(&capability()).unwrap();
        assert_eq!(port.status(), PortStatus::Assigned);
        assert_eq!(
            port.attach(&capability()),
            Err(AttachError::AlreadyAssigned)
        );
    }

    #[test]
    fn single_port_rejects_other_capability() {
        let port: Port<dyn Dataflow<u16>> = Port::new();
        assert_eq!(port.attach(&capability()), Err(AttachError::Incompatible));
        assert!(!port.is_assigned());
    }

    #[test]
    fn list_port_is_created_lazily() {
        let port: ListPort<dyn Dataflow<u8>> = ListPort::new();
        assert!(!port.is_created());
        assert_eq!(port.status(), PortStatus::Unassigned);
        port.attach(&capability()).unwrap();
        port.attach(&capability()).unwrap();
        assert!(port.is_created());
        assert_eq!(port.status(), PortStatus::List { len: 2 });
    }
}

use crate::engine::Wiring;
use std::sync::Arc;
use strand_core::component::Component;
use strand_core::error::WiringError;

/// Fluent wiring on shared components.
///
/// ```ignore
/// let source = Arc::new(TaskSource::new(1));
/// let sink = source
///     .wire_in(&wiring, &Arc::new(TaskStage::new(add_two)))?
///     .wire_in(&wiring, &Arc::new(TaskSink::new(print)))?;
/// ```
pub trait WireExt {
    /// The owner type handed back by [`wire_to`](WireExt::wire_to).
    type Owner: ?Sized;

    /// Wire `self` to `partner`, returning `self`.
    fn wire_to<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
    ) -> Result<Arc<Self::Owner>, WiringError>;

    /// Wire `self` to `partner` through the port called `port`, returning `self`.
    fn wire_to_port<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
        port: &str,
    ) -> Result<Arc<Self::Owner>, WiringError>;

    /// Wire `self` to `partner`, returning `partner`.
    fn wire_in<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
    ) -> Result<Arc<B>, WiringError>;

    /// Wire `self` to `partner` through the port called `port`, returning `partner`.
    fn wire_in_port<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
        port: &str,
    ) -> Result<Arc<B>, WiringError>;
}

impl<A: Component + ?Sized> WireExt for Arc<A> {
    type Owner = A;

    fn wire_to<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
    ) -> Result<Arc<A>, WiringError> {
        wiring.wire_to(self, partner)
    }

    fn wire_to_port<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
        port: &str,
    ) -> Result<Arc<A>, WiringError> {
        wiring.wire_to_port(self, partner, port)
    }

    fn wire_in<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
    ) -> Result<Arc<B>, WiringError> {
        wiring.wire_in(self, partner)
    }

    fn wire_in_port<B: Component + ?Sized>(
        &self,
        wiring: &Wiring,
        partner: &Arc<B>,
        port: &str,
    ) -> Result<Arc<B>, WiringError> {
        wiring.wire_in_port(self, partner, port)
    }
}

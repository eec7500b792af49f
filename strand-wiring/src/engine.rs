use std::sync::Arc;
use strand_core::capability::Capabilities;
use strand_core::component::{Component, short_type_name};
use strand_core::error::{PortReport, WiringError};
use strand_core::event::WiringEvent;
use strand_core::port::{Cardinality, PortEntry, Visibility};
use strand_diagnostics::Diagnostics;

/// A wiring session.
///
/// Owns the [`Diagnostics`] registry that successful wirings are reported
/// to. Sessions are independent: listeners attached to one never see
/// events from another unless the registry is shared on purpose through
/// [`Wiring::with_diagnostics`].
#[derive(Debug, Clone, Default)]
pub struct Wiring {
    diagnostics: Arc<Diagnostics>,
}

impl Wiring {
    /// A session with its own, initially empty, listener registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session reporting to an existing registry.
    pub fn with_diagnostics(diagnostics: Arc<Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// The listener registry of this session.
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Wire `a` to `b` and return `a`, for chaining further wirings from
    /// the same owner.
    pub fn wire_to<A, B>(&self, a: &Arc<A>, b: &Arc<B>) -> Result<Arc<A>, WiringError>
    where
        A: Component + ?Sized,
        B: Component + ?Sized,
    {
        self.connect(a.as_ref(), b, None)?;
        Ok(Arc::clone(a))
    }

    /// Like [`wire_to`](Self::wire_to), restricted to the port called `port`.
    pub fn wire_to_port<A, B>(
        &self,
        a: &Arc<A>,
        b: &Arc<B>,
        port: &str,
    ) -> Result<Arc<A>, WiringError>
    where
        A: Component + ?Sized,
        B: Component + ?Sized,
    {
        self.connect(a.as_ref(), b, Some(port))?;
        Ok(Arc::clone(a))
    }

    /// Wire `a` to `b` and return `b`, for building a chain left to right.
    pub fn wire_in<A, B>(&self, a: &Arc<A>, b: &Arc<B>) -> Result<Arc<B>, WiringError>
    where
        A: Component + ?Sized,
        B: Component + ?Sized,
    {
        self.connect(a.as_ref(), b, None)?;
        Ok(Arc::clone(b))
    }

    /// Like [`wire_in`](Self::wire_in), restricted to the port called `port`.
    pub fn wire_in_port<A, B>(
        &self,
        a: &Arc<A>,
        b: &Arc<B>,
        port: &str,
    ) -> Result<Arc<B>, WiringError>
    where
        A: Component + ?Sized,
        B: Component + ?Sized,
    {
        self.connect(a.as_ref(), b, Some(port))?;
        Ok(Arc::clone(b))
    }

    /// Fill one port of `owner` with `partner` and return the event that
    /// was broadcast.
    pub fn connect<A, B>(
        &self,
        owner: &A,
        partner: &Arc<B>,
        port: Option<&str>,
    ) -> Result<WiringEvent, WiringError>
    where
        A: Component + ?Sized,
        B: Component + ?Sized,
    {
        let capabilities = Arc::clone(partner).capabilities();
        let ports = owner.ports();
        let candidates: Vec<&PortEntry<'_>> = ports
            .iter()
            .filter(|entry| entry.visibility() == Visibility::Private)
            .filter(|entry| port.is_none_or(|name| entry.name() == name))
            .collect();

        if port.is_some() {
            if let Some(entry) = candidates.iter().find(|entry| {
                entry.slot().cardinality() == Cardinality::Single
                    && entry.slot().status().is_assigned()
            }) {
                return Err(WiringError::PortAlreadyWired {
                    owner: owner.label(),
                    port: entry.name().to_owned(),
                    capability: short_type_name(entry.slot().capability_name()),
                });
            }
        }

        for cardinality in [Cardinality::Single, Cardinality::List] {
            for entry in candidates
                .iter()
                .filter(|entry| entry.slot().cardinality() == cardinality)
            {
                let slot = entry.slot();
                if cardinality == Cardinality::Single && slot.status().is_assigned() {
                    continue;
                }
                let Some(capability) = capabilities.get(slot.capability_id()) else {
                    continue;
                };
                if slot.attach(capability).is_err() {
                    continue;
                }

                let event = WiringEvent {
                    owner: owner.label(),
                    port: entry.name().to_owned(),
                    cardinality,
                    partner: partner.label(),
                    capability: short_type_name(capability.name()),
                };
                tracing::debug!(
                    owner = %event.owner,
                    port = %event.port,
                    partner = %event.partner,
                    capability = %event.capability,
                    "strand.wiring.wired"
                );
                self.diagnostics.emit(&event);
                return Ok(event);
            }
        }

        Err(mismatch(owner, partner.as_ref(), port, &candidates, &capabilities))
    }
}

fn mismatch<A, B>(
    owner: &A,
    partner: &B,
    port: Option<&str>,
    candidates: &[&PortEntry<'_>],
    capabilities: &Capabilities,
) -> WiringError
where
    A: Component + ?Sized,
    B: Component + ?Sized,
{
    let candidates: Vec<PortReport> = candidates
        .iter()
        .map(|entry| PortReport {
            name: entry.name().to_owned(),
            capability: short_type_name(entry.slot().capability_name()),
            cardinality: entry.slot().cardinality(),
            status: entry.slot().status(),
        })
        .collect();
    let capabilities: Vec<String> = capabilities
        .names()
        .into_iter()
        .map(short_type_name)
        .collect();
    let err = WiringError::WiringFailed {
        owner: owner.label(),
        partner: partner.label(),
        port: port.map(str::to_owned),
        candidates,
        capabilities,
    };
    tracing::debug!(error = %err, "strand.wiring.failed");
    err
}

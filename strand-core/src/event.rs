//! Wiring events: what the diagnostics channel broadcasts.

use crate::component::ComponentLabel;
use crate::port::Cardinality;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One successful wiring: `owner.port` now refers to `partner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringEvent {
    /// The component whose port was filled.
    pub owner: ComponentLabel,
    /// The port that was filled.
    pub port: String,
    /// Single or list port.
    pub cardinality: Cardinality,
    /// The component now referenced by the port.
    pub partner: ComponentLabel,
    /// The capability the match was made on (module paths stripped).
    pub capability: String,
}

impl fmt::Display for WiringEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wired {}.{} -> {} as {}",
            self.owner, self.port, self.partner, self.capability
        )
    }
}

/// Observes successful wirings.
///
/// Listeners are purely observational. They are called synchronously on
/// the wiring caller's thread and SHOULD return quickly.
pub trait WiringListener: Send + Sync {
    /// Called once per successful wiring.
    fn on_wired(&self, event: &WiringEvent);
}

impl<F> WiringListener for F
where
    F: Fn(&WiringEvent) + Send + Sync,
{
    fn on_wired(&self, event: &WiringEvent) {
        self(event)
    }
}

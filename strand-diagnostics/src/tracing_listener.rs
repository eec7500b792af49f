//! A [`WiringListener`] that forwards events to [`tracing`].

use strand_core::event::{WiringEvent, WiringListener};

/// Emits one `INFO` event per wiring, with the owner, port and partner as
/// structured fields.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use strand_diagnostics::{Diagnostics, TracingListener};
///
/// let diagnostics = Diagnostics::new();
/// diagnostics.subscribe(Arc::new(TracingListener::new()));
/// ```
#[derive(Debug, Default)]
pub struct TracingListener;

impl TracingListener {
    /// Create a new `TracingListener`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WiringListener for TracingListener {
    fn on_wired(&self, event: &WiringEvent) {
        tracing::info!(
            owner = %event.owner,
            port = %event.port,
            partner = %event.partner,
            capability = %event.capability,
            "strand.diagnostics.wired"
        );
    }
}

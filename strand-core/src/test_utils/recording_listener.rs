//! RecordingListener: keeps every wiring event it sees.

use crate::event::{WiringEvent, WiringListener};
use std::sync::Mutex;

/// A listener that records every event. Use `.events()` to inspect them.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<WiringEvent>>,
}

impl RecordingListener {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, in arrival order.
    pub fn events(&self) -> Vec<WiringEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The recorded events rendered as text.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl WiringListener for RecordingListener {
    fn on_wired(&self, event: &WiringEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

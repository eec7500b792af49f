//! In-memory recorders for testing.
//!
//! Available behind the `test-utils` feature flag.

mod recording_listener;
mod recording_sink;

pub use recording_listener::RecordingListener;
pub use recording_sink::RecordingSink;

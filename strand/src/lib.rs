#![deny(missing_docs)]
//! # strand: umbrella crate
//!
//! A single import surface for strand: capability contracts, the wiring
//! engine with its diagnostics channel, and continuation chains. Each part
//! sits behind a feature flag, plus a `prelude` for the happy path.

#[cfg(feature = "chain")]
pub use strand_chain;
#[cfg(feature = "core")]
pub use strand_core;
#[cfg(feature = "diagnostics")]
pub use strand_diagnostics;
#[cfg(feature = "wiring")]
pub use strand_wiring;

/// Happy-path imports for wiring components and building chains.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use strand_core::{
        Capabilities, ChainHandle, ChainState, Component, Continuation, Dataflow, ListPort, Port,
        PortEntry, StageError, StageFailure, Task, WiringError, WiringEvent, WiringListener,
    };

    #[cfg(feature = "diagnostics")]
    pub use strand_diagnostics::{Diagnostics, TracingListener};

    #[cfg(feature = "wiring")]
    pub use strand_wiring::{WireExt, Wiring};

    #[cfg(feature = "chain")]
    pub use strand_chain::{
        Bindable, Chain, ChainBuilder, ChainConfig, ChainError, Continuable, TaskSink, TaskSource,
        TaskStage, ValueSink, ValueSource, ValueStage, completion,
    };
}

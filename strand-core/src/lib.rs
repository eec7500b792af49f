//! # strand-core: capability contracts for wired continuation chains
//!
//! This crate defines the protocol pieces that independently written
//! components share so they can be wired together without knowing each
//! other's concrete types.
//!
//! ## The Contracts
//!
//! | Contract | Trait | What it does |
//! |----------|-------|-------------|
//! | Push a task | [`Continuation`] | Accept a still-pending [`Task`] of a value |
//! | Push a value | [`Dataflow`] | Accept an already-resolved value |
//!
//! ## The Plumbing
//!
//! | Piece | Types | What it does |
//! |-------|-------|-------------|
//! | Ports | [`Port`], [`ListPort`], [`PortEntry`] | Typed connection slots a component declares |
//! | Components | [`Component`], [`Capabilities`] | What a component exposes and what it implements |
//! | Runs | [`Task`], [`RunContext`], [`ChainHandle`] | One in-flight value and the state of its run |
//! | Diagnostics | [`WiringEvent`], [`WiringListener`] | Observation of successful wirings |
//!
//! ## Design Principle
//!
//! Nothing here uses reflection. A component lists its ports in
//! declaration order and registers the capabilities it implements
//! explicitly; matching is done on the [`std::any::TypeId`] of the
//! capability trait object. `dyn Continuation<i32>` and
//! `dyn Continuation<String>` are different capabilities.
//!
//! Capability methods are synchronous: a push hands work to the run's
//! [`Dispatcher`] and returns. Suspension only happens inside the futures
//! that stage functions produce.

#![deny(missing_docs)]

pub mod capability;
pub mod component;
pub mod error;
pub mod event;
pub mod port;
pub mod task;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use capability::{Capabilities, Capability, Continuation, Dataflow};
pub use component::{Component, ComponentLabel, short_type_name};
pub use error::{PortReport, StageError, StageFailure, WiringError};
pub use event::{WiringEvent, WiringListener};
pub use port::{AttachError, Cardinality, ListPort, Port, PortEntry, PortStatus, Slot, Visibility};
pub use task::{ChainHandle, ChainState, Dispatcher, RunContext, RunId, Task};

#![deny(missing_docs)]
//! Capability-based wiring engine.
//!
//! Wiring connects an *owner* component to a *partner* component by
//! filling one of the owner's private ports with a handle to the partner.
//! The port is chosen by matching its required capability against the
//! capabilities the partner implements:
//!
//! 1. Ports are considered in declaration order, optionally restricted to
//!    one explicit name. Public ports are never considered.
//! 2. The first unassigned single-valued port whose capability the
//!    partner implements wins.
//! 3. Failing that, the first list-valued port whose capability the
//!    partner implements gets the partner appended.
//! 4. Otherwise the wiring fails with [`WiringError::WiringFailed`],
//!    listing every port considered and every capability offered.
//!
//! An explicitly named single-valued port that is already assigned fails
//! with [`WiringError::PortAlreadyWired`] instead.
//!
//! Ports always live on the side that *sends*: the owner pushes into the
//! partner, so wiring runs in the same direction as the data.

mod engine;
mod ext;

pub use engine::Wiring;
pub use ext::WireExt;
pub use strand_core::error::WiringError;

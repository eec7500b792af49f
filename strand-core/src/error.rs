//! Error types for wiring and for chain stages.

use crate::component::ComponentLabel;
use crate::port::{Cardinality, PortStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One port the wiring engine considered, as reported in
/// [`WiringError::WiringFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReport {
    /// Declared port name.
    pub name: String,
    /// Capability the port requires (module paths stripped).
    pub capability: String,
    /// Single or list.
    pub cardinality: Cardinality,
    /// State at the time of the attempt.
    pub status: PortStatus,
}

impl fmt::Display for PortReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.cardinality {
            Cardinality::Single => "single",
            Cardinality::List => "list",
        };
        write!(
            f,
            "{}: {} [{}, {}]",
            self.name, self.capability, kind, self.status
        )
    }
}

/// Wiring errors. Always raised synchronously to the caller doing the wiring.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WiringError {
    /// No unassigned port on the owner matches any capability of the partner.
    #[error(
        "cannot wire {owner} to {partner}{}",
        describe_mismatch(.port, .candidates, .capabilities)
    )]
    WiringFailed {
        /// The component whose port was to be filled.
        owner: ComponentLabel,
        /// The component offered as partner.
        partner: ComponentLabel,
        /// The explicit port name, if one was requested.
        port: Option<String>,
        /// Every port that was considered, in declaration order.
        candidates: Vec<PortReport>,
        /// Every capability the partner implements.
        capabilities: Vec<String>,
    },

    /// The explicitly named single-valued port is already wired.
    #[error("port `{port}` on {owner} is already wired (requires {capability})")]
    PortAlreadyWired {
        /// The component owning the port.
        owner: ComponentLabel,
        /// The port name.
        port: String,
        /// Capability the port requires.
        capability: String,
    },
}

fn describe_mismatch(
    port: &Option<String>,
    candidates: &[PortReport],
    capabilities: &[String],
) -> String {
    let mut out = String::new();
    if let Some(port) = port {
        out.push_str(&format!(" through port `{port}`"));
    }
    out.push_str(": no compatible unassigned port");
    if candidates.is_empty() {
        out.push_str("; no candidate ports");
    } else {
        out.push_str("; candidate ports: ");
        let listed: Vec<String> = candidates.iter().map(ToString::to_string).collect();
        out.push_str(&listed.join(", "));
    }
    if capabilities.is_empty() {
        out.push_str("; partner implements no capabilities");
    } else {
        out.push_str("; partner implements: ");
        out.push_str(&capabilities.join(", "));
    }
    out
}

/// Errors produced while a chain stage evaluates.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage function reported a failure.
    #[error("stage failed: {0}")]
    Failed(String),

    /// The stage function panicked.
    #[error("stage panicked: {0}")]
    Panicked(String),

    /// The stage has no downstream component wired.
    #[error("downstream port is not wired")]
    Disconnected,

    /// A completion was dropped before it was resolved.
    #[error("completion dropped before it was resolved")]
    Abandoned,

    /// No runtime was available to schedule the stage.
    #[error("no dispatcher available to schedule the stage")]
    NoDispatcher,

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StageError {
    /// Shorthand for [`StageError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        StageError::Failed(message.into())
    }
}

/// A stage error tagged with the stage that produced it.
///
/// This is what travels down a chain in place of a value once a stage has
/// failed, and what a failed run reports as its terminal state.
#[derive(Debug, Clone, Error)]
#[error("stage {stage} ({node}) failed: {error}")]
pub struct StageFailure {
    /// Index of the stage in the run (0 is the source).
    pub stage: usize,
    /// Label of the node that produced the error.
    pub node: String,
    /// The underlying error.
    pub error: Arc<StageError>,
}

impl StageFailure {
    /// Tag `error` with the stage that produced it.
    pub fn new(stage: usize, node: impl Into<String>, error: StageError) -> Self {
        Self {
            stage,
            node: node.into(),
            error: Arc::new(error),
        }
    }
}

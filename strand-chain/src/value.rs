//! The value family: nodes that pass already-resolved values through the
//! [`Dataflow`] contract.
//!
//! There is no run context here. A failing stage pushes a [`StageFault`]
//! into its `faults` port, if one is wired, logs it, and pushes nothing
//! downstream.

use crate::error::ChainError;
use crate::stage::{StageFn, apply};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use strand_core::capability::{Capabilities, Dataflow};
use strand_core::component::Component;
use strand_core::error::StageError;
use strand_core::port::{Port, PortEntry};
use strand_core::task::Dispatcher;

/// A value stage failure.
#[derive(Debug, Clone)]
pub struct StageFault {
    /// Label of the failing node.
    pub node: String,
    /// What went wrong.
    pub error: Arc<StageError>,
}

impl StageFault {
    fn new(node: String, error: StageError) -> Self {
        Self {
            node,
            error: Arc::new(error),
        }
    }
}

impl fmt::Display for StageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.node, self.error)
    }
}

/// Holds a constant value and pushes it into `next` when run.
pub struct ValueSource<T> {
    name: Option<String>,
    value: T,
    next: Port<dyn Dataflow<T>>,
}

impl<T: Clone + Send + Sync + 'static> ValueSource<T> {
    /// A source of `value`.
    pub fn new(value: T) -> Self {
        Self {
            name: None,
            value,
            next: Port::new(),
        }
    }

    /// Give the source an instance name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Push the value downstream. Synchronous: returns once `next` has
    /// accepted it.
    pub fn run(&self) -> Result<(), ChainError> {
        let next = self.next.get().ok_or_else(|| ChainError::Disconnected {
            node: self.label().to_string(),
        })?;
        next.push(self.value.clone());
        Ok(())
    }
}

impl<T: Clone + Send + Sync + 'static> Component for ValueSource<T> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn ports(&self) -> Vec<PortEntry<'_>> {
        vec![PortEntry::private("next", &self.next)]
    }
}

/// Applies an asynchronous function to each pushed value and pushes the
/// result into `next`.
///
/// Ports, in declaration order: `next` then `faults`. A partner that
/// accepts both `U` and [`StageFault`] therefore lands on `next` first.
pub struct ValueStage<T, U> {
    name: Option<String>,
    function: Arc<StageFn<T, U>>,
    catch_panics: bool,
    next: Port<dyn Dataflow<U>>,
    faults: Port<dyn Dataflow<StageFault>>,
}

impl<T: Send + 'static, U: Send + 'static> ValueStage<T, U> {
    /// A stage applying `function`.
    pub fn new<F, Fut>(function: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, StageError>> + Send + 'static,
    {
        Self {
            name: None,
            function: Arc::new(move |value: T| function(value).boxed()),
            catch_panics: true,
            next: Port::new(),
            faults: Port::new(),
        }
    }

    /// Give the stage an instance name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether a panic in the function is reported as a fault (default).
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

fn report(faults: Option<&Arc<dyn Dataflow<StageFault>>>, fault: StageFault) {
    tracing::warn!(node = %fault.node, error = %fault.error, "strand.chain.fault");
    if let Some(faults) = faults {
        faults.push(fault);
    }
}

impl<T: Send + 'static, U: Send + 'static> Dataflow<T> for ValueStage<T, U> {
    fn push(&self, value: T) {
        let node = self.label().to_string();
        let next = self.next.get().cloned();
        let faults = self.faults.get().cloned();

        let Some(dispatcher) = Dispatcher::current() else {
            report(faults.as_ref(), StageFault::new(node, StageError::NoDispatcher));
            return;
        };
        let function = Arc::clone(&self.function);
        let catch_panics = self.catch_panics;
        dispatcher.spawn(async move {
            let Some(next) = next else {
                report(faults.as_ref(), StageFault::new(node, StageError::Disconnected));
                return;
            };
            match apply(&*function, value, catch_panics).await {
                Ok(output) => next.push(output),
                Err(error) => report(faults.as_ref(), StageFault::new(node, error)),
            }
        });
    }
}

impl<T: Send + 'static, U: Send + 'static> Component for ValueStage<T, U> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn ports(&self) -> Vec<PortEntry<'_>> {
        vec![
            PortEntry::private("next", &self.next),
            PortEntry::private("faults", &self.faults),
        ]
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        let input: Arc<dyn Dataflow<T>> = self;
        Capabilities::new().with(input)
    }
}

/// Runs an action with every pushed value, synchronously.
pub struct ValueSink<T> {
    name: Option<String>,
    action: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> ValueSink<T> {
    /// A sink invoking `action`.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            name: None,
            action: Arc::new(action),
        }
    }

    /// Give the sink an instance name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<T: Send + 'static> Dataflow<T> for ValueSink<T> {
    fn push(&self, value: T) {
        (self.action)(value);
    }
}

impl<T: Send + 'static> Component for ValueSink<T> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        let input: Arc<dyn Dataflow<T>> = self;
        Capabilities::new().with(input)
    }
}

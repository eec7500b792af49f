use crate::error::ChainError;
use strand_core::capability::Continuation;
use strand_core::component::Component;
use strand_core::port::{Port, PortEntry};
use strand_core::task::{ChainHandle, Dispatcher, RunContext, Task};

/// The start of a task chain: holds a constant value and pushes it
/// downstream, already resolved, every time it is run.
pub struct TaskSource<T> {
    name: Option<String>,
    value: T,
    next: Port<dyn Continuation<T>>,
}

impl<T: Clone + Send + Sync + 'static> TaskSource<T> {
    /// A source of `value`.
    pub fn new(value: T) -> Self {
        Self {
            name: None,
            value,
            next: Port::new(),
        }
    }

    /// Give the source (and therefore its runs) a name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The constant value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Start a new run.
    ///
    /// Captures the current tokio runtime, pushes the value into `next` and
    /// returns without waiting for anything downstream. The returned handle
    /// observes this run only; each call starts an independent run.
    pub fn run(&self) -> Result<ChainHandle, ChainError> {
        let node = self.label().to_string();
        let next = self
            .next
            .get()
            .ok_or_else(|| ChainError::Disconnected { node: node.clone() })?;
        let dispatcher = Dispatcher::current().ok_or(ChainError::NoDispatcher)?;

        let run = RunContext::new(self.name.clone(), dispatcher);
        let handle = run.handle();
        tracing::debug!(run = %run.id(), chain = ?self.name, "strand.chain.started");
        run.start(&node);
        next.push_task(Task::ready(run, self.value.clone()));
        Ok(handle)
    }
}

impl<T: Clone + Send + Sync + 'static> Component for TaskSource<T> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn ports(&self) -> Vec<PortEntry<'_>> {
        vec![PortEntry::private("next", &self.next)]
    }
}

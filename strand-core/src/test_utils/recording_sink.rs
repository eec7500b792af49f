//! RecordingSink: a terminal component that keeps what it receives.

use crate::capability::{Capabilities, Continuation, Dataflow};
use crate::component::Component;
use crate::task::Task;
use std::sync::{Arc, Mutex};

/// Implements both push contracts and records every value it receives.
///
/// Tasks are awaited on the run's dispatcher; a failed task is recorded in
/// `failures()` and the run is marked failed. A successful task completes
/// the run.
pub struct RecordingSink<T> {
    name: Option<String>,
    values: Arc<Mutex<Vec<T>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl<T: Clone + Send + 'static> RecordingSink<T> {
    /// An anonymous sink.
    pub fn new() -> Self {
        Self {
            name: None,
            values: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A sink with an instance name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Values received so far, in arrival order.
    pub fn values(&self) -> Vec<T> {
        self.values.lock().unwrap().clone()
    }

    /// Failures received so far, rendered as text.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl<T: Clone + Send + 'static> Default for RecordingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Dataflow<T> for RecordingSink<T> {
    fn push(&self, value: T) {
        self.values.lock().unwrap().push(value);
    }
}

impl<T: Clone + Send + 'static> Continuation<T> for RecordingSink<T> {
    fn push_task(&self, task: Task<T>) {
        let ctx = task.context().clone();
        let values = Arc::clone(&self.values);
        let failures = Arc::clone(&self.failures);
        let scheduled = ctx.clone().spawn(async move {
            match task.await {
                Ok(value) => {
                    values.lock().unwrap().push(value);
                    ctx.complete();
                }
                Err(failure) => {
                    failures.lock().unwrap().push(failure.to_string());
                    ctx.fail(failure);
                }
            }
        });
        if let Err(e) = scheduled {
            self.failures.lock().unwrap().push(e.to_string());
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Component for RecordingSink<T> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        let as_task: Arc<dyn Continuation<T>> = self.clone();
        let as_value: Arc<dyn Dataflow<T>> = self;
        Capabilities::new().with(as_task).with(as_value)
    }
}

use crate::stage::panic_message;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use strand_core::capability::{Capabilities, Continuation};
use strand_core::component::Component;
use strand_core::error::{StageError, StageFailure};
use strand_core::task::Task;

/// The end of a task chain: awaits the final task and runs a side effect
/// with its value. Has no downstream port.
///
/// If the final task failed, the action is not invoked and the run is
/// marked failed.
pub struct TaskSink<T> {
    name: Option<String>,
    action: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> TaskSink<T> {
    /// A sink invoking `action` with the final value.
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

impl<T: Send + 'static> Continuation<T> for TaskSink<T> {
    fn push_task(&self, task: Task<T>) {
        let run = task.context().clone();
        let node = self.label().to_string();
        let action = Arc::clone(&self.action);

        let worker = run.clone();
        let worker_node = node.clone();
        let scheduled = run.spawn(async move {
            let value = match task.await {
                Ok(value) => value,
                Err(failure) => {
                    worker.fail(failure);
                    return;
                }
            };
            let stage = worker.advance(&worker_node);
            match std::panic::catch_unwind(AssertUnwindSafe(|| action(value))) {
                Ok(()) => worker.complete(),
                Err(panic) => worker.fail(StageFailure::new(
                    stage,
                    worker_node,
                    StageError::Panicked(panic_message(panic)),
                )),
            }
        });

        if let Err(error) = scheduled {
            run.fail(StageFailure::new(run.current_stage(), node, error));
        }
    }
}

impl<T: Send + 'static> Component for TaskSink<T> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        let input: Arc<dyn Continuation<T>> = self;
        Capabilities::new().with(input)
    }
}

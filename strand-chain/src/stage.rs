use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use strand_core::capability::{Capabilities, Continuation};
use strand_core::component::Component;
use strand_core::error::{StageError, StageFailure};
use strand_core::port::{Port, PortEntry};
use strand_core::task::Task;

pub(crate) type StageFn<T, U> =
    dyn Fn(T) -> BoxFuture<'static, Result<U, StageError>> + Send + Sync;

/// A transform stage: awaits its upstream task, applies an asynchronous
/// function and pushes the resulting task downstream.
///
/// The downstream push happens as soon as the upstream value is available;
/// the downstream node then awaits the function's future, so the next
/// stage only ever sees a fully resolved value. A failed upstream is
/// recorded on the run and nothing is pushed.
pub struct TaskStage<T, U> {
    name: Option<String>,
    function: Arc<StageFn<T, U>>,
    catch_panics: bool,
    next: Port<dyn Continuation<U>>,
}

impl<T: Send + 'static, U: Send + 'static> TaskStage<T, U> {
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
        }
    }

    /// Give the stage an instance name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether a panic in the function fails the run (default) or is left to
    /// the runtime, stalling the run.
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// The wired downstream component, if any.
    pub fn next(&self) -> Option<&Arc<dyn Continuation<U>>> {
        self.next.get()
    }
}

impl<T: Send + 'static, U: Send + 'static> Continuation<T> for TaskStage<T, U> {
    fn push_task(&self, task: Task<T>) {
        let run = task.context().clone();
        let node = self.label().to_string();
        let function = Arc::clone(&self.function);
        let catch_panics = self.catch_panics;
        let next = self.next.get().cloned();

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
            let Some(next) = next else {
                worker.fail(StageFailure::new(stage, worker_node, StageError::Disconnected));
                return;
            };

            let output = apply(&*function, value, catch_panics);
            let output = output.map(move |result| {
                result.map_err(|error| StageFailure::new(stage, worker_node, error))
            });
            next.push_task(Task::new(worker, output));
        });

        if let Err(error) = scheduled {
            run.fail(StageFailure::new(run.current_stage(), node, error));
        }
    }
}

impl<T: Send + 'static, U: Send + 'static> Component for TaskStage<T, U> {
    fn instance_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn ports(&self) -> Vec<PortEntry<'_>> {
        vec![PortEntry::private("next", &self.next)]
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        let input: Arc<dyn Continuation<T>> = self;
        Capabilities::new().with(input)
    }
}

/// Call a stage function, optionally turning panics (both while building
/// the future and while polling it) into [`StageError::Panicked`].
pub(crate) fn apply<T, U>(
    function: &StageFn<T, U>,
    value: T,
    catch_panics: bool,
) -> BoxFuture<'static, Result<U, StageError>>
where
    U: Send + 'static,
{
    if !catch_panics {
        return function(value);
    }
    match std::panic::catch_unwind(AssertUnwindSafe(|| function(value))) {
        Ok(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .map(|outcome| {
                outcome.unwrap_or_else(|panic| Err(StageError::Panicked(panic_message(panic))))
            })
            .boxed(),
        Err(panic) => futures::future::ready(Err(StageError::Panicked(panic_message(panic)))).boxed(),
    }
}

pub(crate) fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(_) => "non-string panic payload".to_owned(),
        },
    }
}

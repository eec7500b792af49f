//! Tasks, runs and the observable state of a chain run.
//!
//! A [`Task`] is a one-shot future of a value that belongs to exactly one
//! run. The run is represented by a [`RunContext`], shared by every task
//! created while the same initial value travels down a chain. The context
//! publishes the run's [`ChainState`] on a `watch` channel; a
//! [`ChainHandle`] is the read side.

use crate::error::{StageError, StageFailure};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use tokio::sync::watch;

static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

/// Identifies one run of a chain.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RunId(pub u64);

impl RunId {
    fn next() -> Self {
        Self(NEXT_RUN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Where node work is scheduled. Wraps the tokio runtime the run was
/// started on; with a current-thread runtime every stage of every chain
/// runs on that one thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: tokio::runtime::Handle,
}

impl Dispatcher {
    /// The runtime the caller is currently running in, if any.
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current()
            .ok()
            .map(|handle| Self { handle })
    }

    /// Wrap an explicit runtime handle.
    pub fn from_handle(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Schedule `future` and detach it.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.handle.spawn(future));
    }
}

/// State of one chain run.
#[derive(Debug, Clone)]
pub enum ChainState {
    /// The run context exists but the source has not pushed yet.
    NotStarted,
    /// A value is in flight through `stage` (0 is the source).
    Running {
        /// Index of the stage currently evaluating.
        stage: usize,
        /// Label of that stage's node.
        node: String,
    },
    /// The terminal sink ran.
    Completed,
    /// A stage failed; the sink was not invoked.
    Failed(StageFailure),
}

impl ChainState {
    /// `Completed` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::Completed | ChainState::Failed(_))
    }

    /// True once the sink has run.
    pub fn is_completed(&self) -> bool {
        matches!(self, ChainState::Completed)
    }

    /// The failure, if the run failed.
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            ChainState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

struct RunInner {
    id: RunId,
    chain: Option<String>,
    stage: AtomicUsize,
    state: watch::Sender<ChainState>,
    dispatcher: Option<Dispatcher>,
}

/// Shared state of one run. Cheap to clone.
#[derive(Clone)]
pub struct RunContext {
    inner: Arc<RunInner>,
}

impl RunContext {
    /// A new run of the chain called `chain`, scheduled on `dispatcher`.
    pub fn new(chain: Option<String>, dispatcher: Dispatcher) -> Self {
        Self::build(chain, Some(dispatcher))
    }

    /// A run that belongs to no chain. Uses the current runtime if there is
    /// one; tasks that need scheduling fail with
    /// [`StageError::NoDispatcher`] otherwise.
    pub fn detached() -> Self {
        Self::build(None, Dispatcher::current())
    }

    fn build(chain: Option<String>, dispatcher: Option<Dispatcher>) -> Self {
        let (state, _) = watch::channel(ChainState::NotStarted);
        Self {
            inner: Arc::new(RunInner {
                id: RunId::next(),
                chain,
                stage: AtomicUsize::new(0),
                state,
                dispatcher,
            }),
        }
    }

    /// Identifier of this run.
    pub fn id(&self) -> RunId {
        self.inner.id
    }

    /// Name of the chain this run belongs to, if it has one.
    pub fn chain_name(&self) -> Option<&str> {
        self.inner.chain.as_deref()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ChainState {
        self.inner.state.borrow().clone()
    }

    /// Index of the most recently entered stage.
    pub fn current_stage(&self) -> usize {
        self.inner.stage.load(Ordering::Acquire)
    }

    /// A read-only handle on this run's state.
    pub fn handle(&self) -> ChainHandle {
        ChainHandle {
            id: self.inner.id,
            state: self.inner.state.subscribe(),
        }
    }

    /// Schedule node work for this run.
    pub fn spawn<F>(&self, future: F) -> Result<(), StageError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let dispatcher = self
            .inner
            .dispatcher
            .as_ref()
            .ok_or(StageError::NoDispatcher)?;
        dispatcher.spawn(future);
        Ok(())
    }

    /// Mark the source as running.
    pub fn start(&self, node: &str) {
        self.transition(ChainState::Running {
            stage: 0,
            node: node.to_owned(),
        });
    }

    /// Enter the next stage and return its index (the first stage after the
    /// source is 1).
    pub fn advance(&self, node: &str) -> usize {
        let stage = self.inner.stage.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(run = %self.inner.id, stage, node, "strand.chain.stage");
        self.transition(ChainState::Running {
            stage,
            node: node.to_owned(),
        });
        stage
    }

    /// Mark the run completed. Ignored if the run already ended.
    pub fn complete(&self) {
        if self.transition(ChainState::Completed) {
            tracing::debug!(run = %self.inner.id, chain = ?self.inner.chain, "strand.chain.completed");
        }
    }

    /// Mark the run failed. Ignored if the run already ended, so the first
    /// failure observed is the one reported.
    pub fn fail(&self, failure: StageFailure) {
        let stage = failure.stage;
        let node = failure.node.clone();
        let error = failure.error.to_string();
        if self.transition(ChainState::Failed(failure)) {
            tracing::warn!(
                run = %self.inner.id,
                chain = ?self.inner.chain,
                stage,
                node = %node,
                error = %error,
                "strand.chain.failed"
            );
        }
    }

    fn transition(&self, next: ChainState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            *state = next;
            true
        })
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("id", &self.inner.id)
            .field("chain", &self.inner.chain)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

/// Read side of a run's state. Observational only: dropping it does not
/// affect the run.
#[derive(Debug, Clone)]
pub struct ChainHandle {
    id: RunId,
    state: watch::Receiver<ChainState>,
}

impl ChainHandle {
    /// Identifier of the run.
    pub fn run_id(&self) -> RunId {
        self.id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ChainState {
        self.state.borrow().clone()
    }

    /// Wait for `Completed` or `Failed`.
    ///
    /// A run whose stage never resolves never reaches a terminal state, so
    /// this waits forever for it; bound it with a timeout if that matters.
    /// If every task of the run has been dropped, the last published state
    /// is returned.
    pub async fn finished(&self) -> ChainState {
        let mut state = self.state.clone();
        let outcome = state
            .wait_for(ChainState::is_terminal)
            .await
            .map(|terminal| terminal.clone());
        outcome.unwrap_or_else(|_| state.borrow().clone())
    }
}

/// A one-shot, eventually resolved value belonging to one run.
pub struct Task<T> {
    context: RunContext,
    future: BoxFuture<'static, Result<T, StageFailure>>,
}

impl<T: Send + 'static> Task<T> {
    /// A task that resolves when `future` does.
    pub fn new<F>(context: RunContext, future: F) -> Self
    where
        F: Future<Output = Result<T, StageFailure>> + Send + 'static,
    {
        Self {
            context,
            future: future.boxed(),
        }
    }

    /// An already resolved task.
    pub fn ready(context: RunContext, value: T) -> Self {
        Self::new(context, futures::future::ready(Ok(value)))
    }

    /// An already failed task.
    pub fn failed(context: RunContext, failure: StageFailure) -> Self {
        Self::new(context, futures::future::ready(Err(failure)))
    }
}

impl<T> Task<T> {
    /// The run this task belongs to.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Split into the run and the bare future.
    pub fn into_parts(self) -> (RunContext, BoxFuture<'static, Result<T, StageFailure>>) {
        (self.context, self.future)
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, StageFailure>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("run", &self.context.id())
            .finish_non_exhaustive()
    }
}

//! Assemble a task chain from a value, stage functions and a final action.

use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::sink::TaskSink;
use crate::source::TaskSource;
use crate::stage::TaskStage;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use strand_core::component::Component;
use strand_core::error::StageError;
use strand_core::task::ChainHandle;
use strand_wiring::Wiring;

/// Builds a chain left to right. `S` is the source value type, `T` the
/// output type of the last node added so far.
///
/// ```ignore
/// let chain = ChainBuilder::new(1)
///     .then(|x| async move { Ok(x + 2) })?
///     .finish(|x| println!("{x}"))?;
/// let handle = chain.run()?;
/// ```
pub struct ChainBuilder<S, T> {
    config: ChainConfig,
    wiring: Wiring,
    source: Arc<TaskSource<S>>,
    tail: Arc<dyn Component>,
    stages: usize,
    _output: PhantomData<fn() -> T>,
}

impl<S: Clone + Send + Sync + 'static> ChainBuilder<S, S> {
    /// Start a chain from `value` with the default configuration.
    pub fn new(value: S) -> Self {
        Self::with_config(value, ChainConfig::default())
    }

    /// Start a chain from `value`.
    pub fn with_config(value: S, config: ChainConfig) -> Self {
        let mut source = TaskSource::new(value);
        if let Some(name) = &config.name {
            source = source.named(name.clone());
        }
        let source = Arc::new(source);
        Self {
            config,
            wiring: Wiring::new(),
            tail: source.clone(),
            source,
            stages: 0,
            _output: PhantomData,
        }
    }
}

impl<S: Clone + Send + Sync + 'static, T: Send + 'static> ChainBuilder<S, T> {
    /// Wire through `wiring` instead of a private session, so its
    /// listeners see every wiring the builder makes.
    pub fn wiring(mut self, wiring: Wiring) -> Self {
        self.wiring = wiring;
        self
    }

    /// Append a stage applying `function`.
    pub fn then<U, F, Fut>(self, function: F) -> Result<ChainBuilder<S, U>, ChainError>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, StageError>> + Send + 'static,
    {
        self.append(TaskStage::new(function))
    }

    /// Append a named stage applying `function`.
    pub fn then_named<U, F, Fut>(
        self,
        name: impl Into<String>,
        function: F,
    ) -> Result<ChainBuilder<S, U>, ChainError>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, StageError>> + Send + 'static,
    {
        self.append(TaskStage::new(function).named(name))
    }

    fn append<U: Send + 'static>(
        self,
        stage: TaskStage<T, U>,
    ) -> Result<ChainBuilder<S, U>, ChainError> {
        if let Some(limit) = self.config.max_stages {
            if self.stages >= limit {
                return Err(ChainError::TooManyStages { limit });
            }
        }
        let stage = Arc::new(stage.catch_panics(self.config.catches_panics()));
        self.wiring.connect(self.tail.as_ref(), &stage, None)?;
        Ok(ChainBuilder {
            config: self.config,
            wiring: self.wiring,
            source: self.source,
            tail: stage,
            stages: self.stages + 1,
            _output: PhantomData,
        })
    }

    /// Terminate the chain with `action` and return it, ready to run.
    pub fn finish<F>(self, action: F) -> Result<Chain<S>, ChainError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let sink = Arc::new(TaskSink::new(action));
        self.wiring.connect(self.tail.as_ref(), &sink, None)?;
        tracing::debug!(chain = ?self.config.name, stages = self.stages, "strand.chain.assembled");
        Ok(Chain {
            config: self.config,
            source: self.source,
            stages: self.stages,
        })
    }
}

/// A fully wired chain.
pub struct Chain<S> {
    config: ChainConfig,
    source: Arc<TaskSource<S>>,
    stages: usize,
}

impl<S: Clone + Send + Sync + 'static> Chain<S> {
    /// Start a new run. See [`TaskSource::run`].
    pub fn run(&self) -> Result<ChainHandle, ChainError> {
        self.source.run()
    }

    /// The chain's source.
    pub fn source(&self) -> &Arc<TaskSource<S>> {
        &self.source
    }

    /// Number of transform stages between source and sink.
    pub fn stages(&self) -> usize {
        self.stages
    }

    /// The configuration the chain was built with.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

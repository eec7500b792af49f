//! `bind`: append a stage and wire it in, in one call.

use crate::sink::TaskSink;
use crate::source::TaskSource;
use crate::stage::TaskStage;
use crate::value::{ValueSink, ValueSource, ValueStage};
use std::future::Future;
use std::sync::Arc;
use strand_core::component::Component;
use strand_core::error::{StageError, WiringError};
use strand_wiring::Wiring;

/// A task-family node whose output is `T`. Lets a chain be written as a
/// sequence of functions:
///
/// ```ignore
/// let sink = Arc::new(TaskSource::new(1))
///     .bind(&wiring, |x| async move { Ok(x + 2) })?
///     .into_sink(&wiring, |x| println!("{x}"))?;
/// ```
pub trait Continuable<T: Send + 'static>: Component + Sized {
    /// Create a [`TaskStage`] for `function` and wire it in after `self`.
    fn bind<U, F, Fut>(
        self: &Arc<Self>,
        wiring: &Wiring,
        function: F,
    ) -> Result<Arc<TaskStage<T, U>>, WiringError>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, StageError>> + Send + 'static,
    {
        wiring.wire_in(self, &Arc::new(TaskStage::new(function)))
    }

    /// Create a [`TaskSink`] for `action` and wire it in after `self`.
    fn into_sink<F>(self: &Arc<Self>, wiring: &Wiring, action: F) -> Result<Arc<TaskSink<T>>, WiringError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        wiring.wire_in(self, &Arc::new(TaskSink::new(action)))
    }
}

impl<T: Clone + Send + Sync + 'static> Continuable<T> for TaskSource<T> {}

impl<T: Send + 'static, U: Send + 'static> Continuable<U> for TaskStage<T, U> {}

/// The value-family counterpart of [`Continuable`].
pub trait Bindable<T: Send + 'static>: Component + Sized {
    /// Create a [`ValueStage`] for `function` and wire it in after `self`.
    fn bind<U, F, Fut>(
        self: &Arc<Self>,
        wiring: &Wiring,
        function: F,
    ) -> Result<Arc<ValueStage<T, U>>, WiringError>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, StageError>> + Send + 'static,
    {
        wiring.wire_in(self, &Arc::new(ValueStage::new(function)))
    }

    /// Create a [`ValueSink`] for `action` and wire it in after `self`.
    fn into_action<F>(
        self: &Arc<Self>,
        wiring: &Wiring,
        action: F,
    ) -> Result<Arc<ValueSink<T>>, WiringError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        wiring.wire_in(self, &Arc::new(ValueSink::new(action)))
    }
}

impl<T: Clone + Send + Sync + 'static> Bindable<T> for ValueSource<T> {}

impl<T: Send + 'static, U: Send + 'static> Bindable<U> for ValueStage<T, U> {}

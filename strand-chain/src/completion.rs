//! A completion source for callback-style stage functions.
//!
//! A stage function that registers a callback instead of awaiting can
//! return the [`Completion`] half and resolve it from the callback:
//!
//! ```ignore
//! TaskStage::new(|x: i32| {
//!     let (completer, completion) = completion();
//!     start_timer(move || { completer.resolve(x + 4); });
//!     completion
//! })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use strand_core::error::StageError;
use tokio::sync::oneshot;

/// Create a linked completer/completion pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, Completion { rx })
}

/// The write half. Consumed by resolving or rejecting.
#[derive(Debug)]
pub struct Completer<T> {
    tx: oneshot::Sender<Result<T, StageError>>,
}

impl<T> Completer<T> {
    /// Resolve with a value. Returns false if nobody awaits any more.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Resolve with an error. Returns false if nobody awaits any more.
    pub fn reject(self, error: StageError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

/// The read half. Resolves to [`StageError::Abandoned`] if the completer is
/// dropped unresolved.
#[derive(Debug)]
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T, StageError>>,
}

impl<T> Future for Completion<T> {
    type Output = Result<T, StageError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(StageError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_from_another_task() {
        let (completer, completion) = completion();
        tokio::spawn(async move {
            completer.resolve(5);
        });
        assert_eq!(completion.await.unwrap(), 5);
    }

    #[tokio::test]
    async fn dropped_completer_abandons() {
        let (completer, completion) = completion::<i32>();
        drop(completer);
        assert!(matches!(completion.await, Err(StageError::Abandoned)));
    }

    #[tokio::test]
    async fn reject_carries_error() {
        let (completer, completion) = completion::<i32>();
        assert!(completer.reject(StageError::failed("nope")));
        assert!(matches!(completion.await, Err(StageError::Failed(m)) if m == "nope"));
    }
}

//! Cancellation scoped to a view's lifetime.
//!
//! Every request a view issues runs under its scope; closing the view
//! abandons whatever is still in flight so no result lands afterwards.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{AppError, Result};

/// Cancellation token shared by all requests of one view.
#[derive(Debug)]
pub struct CancelScope {
    cancelled: watch::Sender<bool>,
}

impl CancelScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self { cancelled }
    }

    /// Cancel all current and future work in this scope.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// A handle other tasks can use to observe or trigger cancellation.
    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: self.cancelled.clone(),
        }
    }

    /// Run a future unless the scope is cancelled first.
    pub async fn run<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        guard(self.cancelled.subscribe(), future).await
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Clonable handle onto a [`CancelScope`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

async fn guard<T, F>(mut rx: watch::Receiver<bool>, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if *rx.borrow_and_update() {
        return Err(AppError::Cancelled);
    }
    tokio::select! {
        result = future => result,
        _ = rx.wait_for(|cancelled| *cancelled) => Err(AppError::Cancelled),
    }
}

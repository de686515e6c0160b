//! Cancellable background work owned by a view.
//!
//! A view that starts a request keeps the [`ViewTask`]. When the view goes
//! away it cancels the task; a result that arrives afterwards is dropped
//! instead of being applied to state nobody is looking at.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Handle to a spawned future whose result is discarded once cancelled.
#[derive(Debug)]
pub struct ViewTask<T> {
    token: CancellationToken,
    handle: JoinHandle<Option<T>>,
}

impl<T: Send + 'static> ViewTask<T> {
    /// Spawn `fut` on the current runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancel = token.clone();
        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => return None,
                result = fut => result,
            };
            // Cancellation may land between completion and delivery.
            if cancel.is_cancelled() {
                return None;
            }
            Some(result)
        });
        Self { token, handle }
    }

    /// Stop the work and drop any result.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that cancels this task, for tying it to an outer scope.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the result; `None` when the task was cancelled.
    pub async fn join(self) -> Option<T> {
        match self.handle.await {
            Ok(result) if !self.token.is_cancelled() => result,
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "View task failed");
                None
            }
        }
    }
}

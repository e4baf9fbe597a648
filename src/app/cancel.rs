//! Cooperative cancellation for service operations.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::AppError;

/// Cancellation signal shared between a caller and the operations it starts.
///
/// Clones observe the same signal. Once cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Fails with `AppError::Cancelled` if the token is cancelled
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `operation` unless cancelled before it starts, abandon it if
    /// cancelled while it is pending, and discard its result if cancelled
    /// by the time it finishes.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        self.check()?;
        let result = tokio::select! {
            biased;
            _ = self.cancelled() => return Err(AppError::Cancelled),
            result = operation => result,
        };
        self.check()?;
        result
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let token = CancellationToken::new();
        let value = token.run(async { Ok::<_, AppError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_skips_operation() {
        let token = CancellationToken::new();
        token.cancel();
        let started = AtomicBool::new(false);

        let result = token
            .run(async {
                started.store(true, Ordering::SeqCst);
                Ok::<_, AppError>(())
            })
            .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_while_pending_aborts_wait() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = token
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AppError>(())
            })
            .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[test]
    fn test_clones_share_signal() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(clone.check().is_err());
    }
}

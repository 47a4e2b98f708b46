//! Cooperative cancellation for long-running loops.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation token.
#[async_trait]
pub trait CancellationToken: Send + Sync {
    /// Resolves when cancellation is requested.
    async fn cancelled(&self);

    /// Non-blocking cancellation check.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancellation token that never triggers.
pub struct NeverCancel;

#[async_trait]
impl CancellationToken for NeverCancel {
    async fn cancelled(&self) {
        futures::future::pending::<()>().await;
    }
}

/// Shutdown switch shared by every loop that holds one of its tokens.
///
/// Triggering is sticky: tokens created after [`ShutdownSignal::trigger`]
/// report cancellation immediately.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Request shutdown of every holder of a token.
    pub fn trigger(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Whether shutdown was requested.
    pub fn is_triggered(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Token that resolves once this signal is triggered.
    pub fn token(&self) -> Arc<dyn CancellationToken> {
        Arc::new(WatchCancellationToken {
            shutdown_rx: self.shutdown_tx.subscribe(),
        })
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct WatchCancellationToken {
    shutdown_rx: watch::Receiver<bool>,
}

#[async_trait]
impl CancellationToken for WatchCancellationToken {
    async fn cancelled(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow_and_update() {
                return;
            }
            if shutdown_rx.changed().await.is_err() {
                // Signal dropped without triggering: nothing can cancel us now.
                futures::future::pending::<()>().await;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_resolves_after_trigger() {
        let signal = ShutdownSignal::new();
        let token = signal.token();
        assert!(!token.is_cancelled());

        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            trigger.trigger();
        });

        token.cancelled().await;
        assert!(token.is_cancelled());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_late_token_sees_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        let token = signal.token();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_never_cancel_stays_pending() {
        let token = NeverCancel;
        let outcome = tokio::time::timeout(Duration::from_millis(5), token.cancelled()).await;
        assert!(outcome.is_err());
        assert!(!token.is_cancelled());
    }
}

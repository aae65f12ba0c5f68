//! Cancellation handle for the foreground watcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::task::JoinHandle;

/// Handle to a running foreground watcher.
///
/// `cancel` is idempotent: calling it any number of times produces no
/// error and no further callbacks, including on a subscription that never
/// started (the permission-denied path uses [`Subscription::inert`]).
pub struct Subscription {
    cancelled: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            handle: Mutex::new(Some(handle)),
        }
    }

    /// A subscription that never started; cancelling it is a no-op.
    pub fn inert() -> Self {
        Self {
            cancelled: AtomicBool::new(true),
            handle: Mutex::new(None),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_twice_is_safe() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        let subscription = Subscription::new(handle);
        subscription.cancel();
        subscription.cancel();
        assert!(subscription.is_cancelled());
    }

    #[tokio::test]
    async fn inert_subscription_cancels_without_effect() {
        let subscription = Subscription::inert();
        subscription.cancel();
        subscription.cancel();
        assert!(subscription.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_stops_the_task() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<u32>(4);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                if tx.send(1).await.is_err() {
                    break;
                }
            }
        });
        let subscription = Subscription::new(handle);
        let _ = rx.recv().await;
        subscription.cancel();
        // Drain anything already buffered, then the channel must close.
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }
}

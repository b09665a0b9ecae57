use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::RefreshReason;

/// Something that can run a reconciliation pass.
pub trait Reconcile: Send + Sync + 'static {
    fn reconcile(&self, reason: RefreshReason) -> impl Future<Output = ()> + Send;
}

/// Coalesces refresh requests into at most one pass per debounce window.
///
/// The first request arms a timer and fixes the reason. Requests made while
/// the timer is armed are dropped; they neither extend the window nor change
/// the reason.
pub struct RefreshScheduler<T> {
    pending: Arc<AtomicBool>,
    window: Duration,
    target: Arc<T>,
    cancel: CancellationToken,
}

impl<T> Clone for RefreshScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
            window: self.window,
            target: Arc::clone(&self.target),
            cancel: self.cancel.clone(),
        }
    }
}

impl<T: Reconcile> RefreshScheduler<T> {
    pub fn new(target: Arc<T>, window: Duration, cancel: CancellationToken) -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
            window,
            target,
            cancel,
        }
    }

    /// Request a reconciliation. Returns `true` if this call armed the timer.
    pub fn request_refresh(&self, reason: RefreshReason) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%reason, "refresh already pending");
            return false;
        }

        let pending = Arc::clone(&self.pending);
        let target = Arc::clone(&self.target);
        let cancel = self.cancel.clone();
        let deadline = tokio::time::Instant::now() + self.window;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    pending.store(false, Ordering::Release);
                    return;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }
            pending.store(false, Ordering::Release);
            target.reconcile(reason).await;
        });
        true
    }

    /// `true` while a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

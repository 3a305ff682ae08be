//! Shared shutdown signal for the simulation workers.
//!
//! One [`ShutdownSignal`] is created per run by the coordinator and cloned
//! into each worker at startup. Workers check it at the top of every loop
//! iteration and sleep with `tokio::select!` on [`ShutdownSignal::triggered`]
//! so a trigger wakes them without waiting out a full tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    triggered: AtomicBool,
    notify: Notify,
}

/// Cloneable, one-way shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every task waiting in [`triggered`](Self::triggered).
    ///
    /// Returns `true` if this call was the one that set it.
    pub fn trigger(&self) -> bool {
        let first = !self.inner.triggered.swap(true, Ordering::AcqRel);
        self.inner.notify.notify_waiters();
        first
    }

    /// Whether the flag is set.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Wait until the flag is set. Returns immediately if it already is.
    pub async fn triggered(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a trigger between the check and
            // the await is not missed.
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

//! Run-scoped cancellation signal.
//!
//! One [`Shutdown`] is created per run and cloned into every stage. It fires
//! at most once, either when the total timeout elapses or when enough valid
//! proxies have been found, and never resets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Why a run was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timeout,
    TargetReached,
}

struct Inner {
    fired: AtomicBool,
    trigger: OnceLock<Trigger>,
    tx: watch::Sender<bool>,
}

/// Cloneable handle to the shared cancellation state
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                fired: AtomicBool::new(false),
                trigger: OnceLock::new(),
                tx,
            }),
        }
    }

    /// Fire the signal.
    ///
    /// Returns `true` for the caller that actually fired it; every later or
    /// concurrent call is a no-op returning `false`.
    pub fn cancel(&self, trigger: Trigger) -> bool {
        if self
            .inner
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let _ = self.inner.trigger.set(trigger);
        self.inner.tx.send_replace(true);
        tracing::info!(?trigger, "run cancelled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// What fired the signal, if it has fired
    pub fn trigger(&self) -> Option<Trigger> {
        self.inner.trigger.get().copied()
    }

    /// Resolve once the signal has fired.
    ///
    /// Safe to use as a `tokio::select!` branch; never resolves otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.tx.subscribe();
        // The sender lives inside `inner`, which we hold, so this only
        // returns once the value is `true`.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Fire with [`Trigger::Timeout`] after `after` unless fired earlier.
    ///
    /// The returned handle should be aborted once the run is over.
    pub fn arm_timeout(&self, after: Duration) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => {
                    this.cancel(Trigger::Timeout);
                }
                _ = this.cancelled() => {}
            }
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown")
            .field("cancelled", &self.is_cancelled())
            .field("trigger", &self.trigger())
            .finish()
    }
}

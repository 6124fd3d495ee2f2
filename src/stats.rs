//! Run-wide counters shared by every pipeline stage

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters updated concurrently by fetchers, the dispatcher and
/// the validation workers.
///
/// A fresh instance is created per run and passed by reference, so tests can
/// observe one run in isolation.
#[derive(Debug, Default)]
pub struct RunStats {
    fetched_ok: AtomicU64,
    lines_read: AtomicU64,
    found: AtomicU64,
    enqueued: AtomicU64,
    valid: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source answered with a success status
    pub fn record_fetched(&self) {
        self.fetched_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    /// A syntactically valid candidate was extracted
    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    /// A previously unseen candidate was admitted to validation
    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_valid(&self) {
        self.valid.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    ///
    /// Only meaningful as a final report once every stage has returned.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fetched_ok: self.fetched_ok.load(Ordering::Relaxed),
            lines_read: self.lines_read.load(Ordering::Relaxed),
            found: self.found.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            valid: self.valid.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`RunStats`] for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub fetched_ok: u64,
    pub lines_read: u64,
    pub found: u64,
    pub enqueued: u64,
    pub valid: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched_ok: {} | lines: {} | found: {} | enqueued: {} | valid: {}",
            self.fetched_ok, self.lines_read, self.found, self.enqueued, self.valid
        )
    }
}

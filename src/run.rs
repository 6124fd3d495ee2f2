//! Run coordinator: wires the pipeline stages together for one run.
//!
//! ```text
//! sources --crawl_all--> raw --dispatch--> jobs --validate_all--> results --collect--> file
//! ```
//!
//! Each arrow is a bounded channel. A stage closes its outbound channel by
//! dropping the sender when it returns, and the shared [`Shutdown`] lets any
//! stage be preempted by the total timeout or the target count.

use crate::config::RunConfig;
use crate::error::Result;
use crate::proxy::checker::{CheckerConfig, ProxyChecker};
use crate::proxy::crawler::{self, CrawlerConfig, ProxyCrawler};
use crate::proxy::models::Source;
use crate::proxy::pool::{self, PoolConfig};
use crate::proxy::{dispatcher, output, SeenSet};
use crate::shutdown::{Shutdown, Trigger};
use crate::stats::{RunStats, StatsSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every candidate was checked
    Exhausted,
    /// The configured number of valid proxies was reached
    TargetReached,
    /// The total timeout elapsed
    TimedOut,
}

impl From<Option<Trigger>> for StopReason {
    fn from(trigger: Option<Trigger>) -> Self {
        match trigger {
            None => StopReason::Exhausted,
            Some(Trigger::TargetReached) => StopReason::TargetReached,
            Some(Trigger::Timeout) => StopReason::TimedOut,
        }
    }
}

/// Final report of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Number of sources the run started with
    pub sources: usize,
    pub stats: StatsSnapshot,
    /// Lines written to the output file
    pub written: usize,
    pub elapsed_ms: u64,
    pub stop_reason: StopReason,
}

impl RunReport {
    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Sources: {} | {} | wrote: {}",
            self.sources, self.stats, self.written
        )
    }
}

/// Harvest `sources`, validate what they publish, and write the working
/// proxies to `config.output`.
///
/// Returns once every stage has stopped. Reaching the target count or the
/// total timeout is a normal completion. Counters go to the caller-supplied
/// `stats` so they remain readable when writing the output fails.
pub async fn run(
    config: &RunConfig,
    sources: Vec<Source>,
    stats: Arc<RunStats>,
) -> Result<RunReport> {
    let started = Instant::now();
    let source_count = sources.len();

    let crawler = Arc::new(ProxyCrawler::with_config(
        CrawlerConfig::new()
            .with_timeout(config.http_timeout)
            .with_user_agent(config.user_agent.clone()),
    )?);
    let checker = Arc::new(ProxyChecker::with_config(
        CheckerConfig::new()
            .with_mode(config.mode)
            .with_test_host(config.test_host.clone())
            .with_dial_timeout(config.dial_timeout)
            .with_rw_timeout(config.rw_timeout),
    ));

    let shutdown = Shutdown::new();
    let timer = shutdown.arm_timeout(config.total_timeout);

    let capacity = config.channel_capacity.max(1);
    let (raw_tx, raw_rx) = mpsc::channel(capacity);
    let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
    let (results_tx, results_rx) = mpsc::channel(capacity);

    info!(
        sources = source_count,
        workers = config.workers,
        fetchers = config.fetchers,
        mode = %config.mode,
        "starting run"
    );

    let fetch = tokio::spawn(crawler::crawl_all(
        crawler,
        sources,
        config.fetchers,
        raw_tx,
        Arc::clone(&stats),
        shutdown.clone(),
    ));
    let dispatch = tokio::spawn(dispatcher::dispatch(
        raw_rx,
        Arc::new(SeenSet::new()),
        jobs_tx,
        Arc::clone(&stats),
        shutdown.clone(),
    ));
    let validate = tokio::spawn(pool::validate_all(
        jobs_rx,
        results_tx,
        checker,
        PoolConfig {
            workers: config.workers,
            max_valid: config.max_valid,
        },
        Arc::clone(&stats),
        shutdown.clone(),
    ));

    let collector = tokio::spawn(output::collect(results_rx));

    for (stage, handle) in [("fetch", fetch), ("dispatch", dispatch), ("validate", validate)] {
        if let Err(e) = handle.await {
            warn!(stage, error = %e, "stage task failed");
        }
    }
    let results = collector.await.unwrap_or_else(|e| {
        warn!(error = %e, "collector task failed");
        Vec::new()
    });
    timer.abort();

    let stop_reason = StopReason::from(shutdown.trigger());
    info!(?stop_reason, valid = results.len(), "pipeline finished");

    output::write_lines(&config.output, &results)?;

    Ok(RunReport {
        sources: source_count,
        stats: stats.snapshot(),
        written: results.len(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        stop_reason,
    })
}

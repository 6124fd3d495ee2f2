//! Proxy crawler module for fetching proxies from list sources
//!
//! This module provides functionality for:
//! - Downloading one source under a fetch timeout
//! - Streaming the body line by line through the extractor
//! - Running many sources with a bounded number in flight

use crate::config::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::error::Result;
use crate::proxy::extractor;
use crate::proxy::models::{Candidate, Source};
use crate::shutdown::Shutdown;
use crate::stats::RunStats;
use futures::future::join_all;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// Accept header sent with every list request
const ACCEPT_TEXT: &str = "text/plain,*/*;q=0.9";

/// Longest line buffered from a source body before the source is abandoned
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Configuration for proxy crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for the whole download of one source
    pub timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
    /// Longest accepted line
    pub max_line_bytes: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_line_bytes: MAX_LINE_BYTES,
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max.max(1);
        self
    }
}

/// Splits a chunked byte stream into text lines.
///
/// Partial lines are carried between chunks. A line growing past the limit
/// is reported as `None` from [`LineSplitter::push`].
struct LineSplitter {
    pending: Vec<u8>,
    max: usize,
}

impl LineSplitter {
    fn new(max: usize) -> Self {
        Self {
            pending: Vec::new(),
            max,
        }
    }

    fn push(&mut self, chunk: &[u8]) -> Option<Vec<String>> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            if self.pending.len() > self.max {
                return None;
            }
            lines.push(Self::decode(&self.pending));
            self.pending.clear();
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);
        if self.pending.len() > self.max {
            return None;
        }
        Some(lines)
    }

    fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| Self::decode(&self.pending))
    }

    fn decode(raw: &[u8]) -> String {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        String::from_utf8_lossy(raw).into_owned()
    }
}

/// Proxy crawler for fetching candidates from list sources
pub struct ProxyCrawler {
    config: CrawlerConfig,
    client: Client,
}

impl ProxyCrawler {
    /// Create a new proxy crawler with custom configuration
    pub fn with_config(config: CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Fetch one source and forward every candidate found in it.
    ///
    /// Returns `true` if the source answered with a success status. Every
    /// failure (transport, status, timeout, cancellation) is swallowed here.
    pub async fn crawl_source(
        &self,
        source: &Source,
        out: &mpsc::Sender<Candidate>,
        stats: &RunStats,
        shutdown: &Shutdown,
    ) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(source = %source, "fetch cancelled");
                false
            }
            fetched = self.stream_source(source, out, stats, shutdown) => fetched,
        }
    }

    async fn stream_source(
        &self,
        source: &Source,
        out: &mpsc::Sender<Candidate>,
        stats: &RunStats,
        shutdown: &Shutdown,
    ) -> bool {
        let mut response = match self
            .client
            .get(&source.url)
            .header(ACCEPT, ACCEPT_TEXT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(source = %source, error = %e, "fetch failed");
                return false;
            }
        };

        if !response.status().is_success() {
            debug!(source = %source, status = %response.status(), "fetch rejected");
            return false;
        }
        stats.record_fetched();

        let mut splitter = LineSplitter::new(self.config.max_line_bytes);
        let mut found = 0usize;
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    debug!(source = %source, error = %e, "body read aborted");
                    return true;
                }
            };
            let Some(lines) = splitter.push(&chunk) else {
                debug!(source = %source, "line exceeds limit, abandoning source");
                return true;
            };
            for line in lines {
                match Self::forward_line(&line, out, stats, shutdown).await {
                    Some(n) => found += n,
                    None => return true,
                }
            }
        }
        if let Some(line) = splitter.finish() {
            if let Some(n) = Self::forward_line(&line, out, stats, shutdown).await {
                found += n;
            }
        }

        debug!(source = %source, found, "source done");
        true
    }

    /// Extract and send the candidates of one line.
    ///
    /// `None` means the run was cancelled or the receiver went away.
    async fn forward_line(
        line: &str,
        out: &mpsc::Sender<Candidate>,
        stats: &RunStats,
        shutdown: &Shutdown,
    ) -> Option<usize> {
        stats.record_line();
        let candidates = extractor::extract(line);
        let n = candidates.len();
        for candidate in candidates {
            stats.record_found();
            let sent = tokio::select! {
                _ = shutdown.cancelled() => false,
                res = out.send(candidate) => res.is_ok(),
            };
            if !sent {
                return None;
            }
        }
        Some(n)
    }
}

/// Fetch every source with at most `fetchers` downloads in flight.
///
/// `out` is dropped once every source task has finished, which closes the
/// candidate channel for the consumer. Cancellation releases tasks still
/// waiting for a slot as well as those mid-download.
pub async fn crawl_all(
    crawler: Arc<ProxyCrawler>,
    sources: Vec<Source>,
    fetchers: usize,
    out: mpsc::Sender<Candidate>,
    stats: Arc<RunStats>,
    shutdown: Shutdown,
) {
    let gate = Arc::new(Semaphore::new(fetchers.max(1)));
    let total = sources.len();

    let tasks: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let crawler = Arc::clone(&crawler);
            let gate = Arc::clone(&gate);
            let out = out.clone();
            let stats = Arc::clone(&stats);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let _permit = tokio::select! {
                    permit = gate.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                    _ = shutdown.cancelled() => return,
                };
                crawler.crawl_source(&source, &out, &stats, &shutdown).await;
            })
        })
        .collect();

    for result in join_all(tasks).await {
        if let Err(e) = result {
            warn!(error = %e, "fetch task failed");
        }
    }
    drop(out);
    info!(sources = total, "all sources finished");
}

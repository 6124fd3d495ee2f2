//! Run configuration

use crate::proxy::models::ValidationMode;
use std::path::PathBuf;
use std::time::Duration;

/// Default output file
pub const DEFAULT_OUTPUT: &str = "proxies.txt";

/// Default number of validation workers
pub const DEFAULT_WORKERS: usize = 300;

/// Default number of sources fetched at once
pub const DEFAULT_FETCHERS: usize = 20;

/// Default total run time in seconds
pub const DEFAULT_TOTAL_TIMEOUT_SECS: u64 = 120;

/// Default per-source fetch timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Default TCP dial timeout for a validation in seconds
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 4;

/// Default read/write deadline for a validation in seconds
pub const DEFAULT_RW_TIMEOUT_SECS: u64 = 4;

/// Default host proxies are asked to reach
pub const DEFAULT_TEST_HOST: &str = "example.com";

/// Default User-Agent for list downloads
pub const DEFAULT_USER_AGENT: &str = "proxy-scraper/1.0 (+github)";

/// Default capacity of each inter-stage channel.
///
/// Larger values let fetching run further ahead of validation at the cost of
/// memory.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 20_000;

/// Tunables for one run. Built once, then only read.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where the sorted results are written
    pub output: PathBuf,
    /// Which checks a proxy must pass
    pub mode: ValidationMode,
    /// Number of concurrent validation workers
    pub workers: usize,
    /// Maximum sources fetched at once
    pub fetchers: usize,
    /// Stop once this many proxies validated; `None` for no limit
    pub max_valid: Option<usize>,
    /// Hard bound on the whole run
    pub total_timeout: Duration,
    /// Timeout for downloading one source
    pub http_timeout: Duration,
    /// TCP connect timeout for one check
    pub dial_timeout: Duration,
    /// Deadline for the request/response exchange of one check
    pub rw_timeout: Duration,
    /// Host used by both the GET and the CONNECT check
    pub test_host: String,
    /// User-Agent sent to list sources
    pub user_agent: String,
    /// Capacity of the candidate, job and result channels
    pub channel_capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            mode: ValidationMode::default(),
            workers: DEFAULT_WORKERS,
            fetchers: DEFAULT_FETCHERS,
            max_valid: None,
            total_timeout: Duration::from_secs(DEFAULT_TOTAL_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            dial_timeout: Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS),
            rw_timeout: Duration::from_secs(DEFAULT_RW_TIMEOUT_SECS),
            test_host: DEFAULT_TEST_HOST.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_fetchers(mut self, fetchers: usize) -> Self {
        self.fetchers = fetchers.max(1);
        self
    }

    /// `0` means no limit
    pub fn with_max_valid(mut self, max_valid: usize) -> Self {
        self.max_valid = (max_valid > 0).then_some(max_valid);
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_rw_timeout(mut self, timeout: Duration) -> Self {
        self.rw_timeout = timeout;
        self
    }

    pub fn with_test_host(mut self, host: String) -> Self {
        self.test_host = host;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

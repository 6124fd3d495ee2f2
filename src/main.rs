use anyhow::{Context, Result};
use clap::Parser;
use proxy_harvest::{
    config::{self, RunConfig},
    proxy::{sources, ValidationMode},
    RunStats,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Collect proxies from public lists and keep the ones that work
#[derive(Parser, Debug)]
#[command(name = "proxy-harvest")]
#[command(version, about = "Collect proxies from public lists and keep the ones that work")]
struct Cli {
    /// Output file for working proxies
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    out: PathBuf,

    /// File with sources to crawl (one URL per line, optional NAME=URL)
    #[arg(short, long)]
    sources: Option<PathBuf>,

    /// Validation mode (http, connect, both)
    #[arg(short, long, default_value = "both")]
    mode: ValidationMode,

    /// Number of concurrent validation workers
    #[arg(short = 'w', long, default_value_t = config::DEFAULT_WORKERS)]
    workers: usize,

    /// Maximum sources downloaded at once
    #[arg(short = 'f', long, default_value_t = config::DEFAULT_FETCHERS)]
    fetchers: usize,

    /// Stop after this many working proxies (0 = no limit)
    #[arg(long, default_value_t = 0)]
    max: usize,

    /// Total run time limit in seconds
    #[arg(long, default_value_t = config::DEFAULT_TOTAL_TIMEOUT_SECS)]
    total_timeout: u64,

    /// Timeout in seconds for downloading one source
    #[arg(long, default_value_t = config::DEFAULT_HTTP_TIMEOUT_SECS)]
    http_timeout: u64,

    /// TCP connect timeout in seconds for one check
    #[arg(long, default_value_t = config::DEFAULT_DIAL_TIMEOUT_SECS)]
    dial_timeout: u64,

    /// Read/write timeout in seconds for one check
    #[arg(long, default_value_t = config::DEFAULT_RW_TIMEOUT_SECS)]
    rw_timeout: u64,

    /// Host requested through each proxy (GET and CONNECT)
    #[arg(long, default_value = config::DEFAULT_TEST_HOST)]
    test_host: String,

    /// User-Agent for downloading lists
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    ua: String,

    /// Capacity of each queue between pipeline stages
    #[arg(long, default_value_t = config::DEFAULT_CHANNEL_CAPACITY)]
    channel_capacity: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig::new()
            .with_output(self.out.clone())
            .with_mode(self.mode)
            .with_workers(self.workers)
            .with_fetchers(self.fetchers)
            .with_max_valid(self.max)
            .with_total_timeout(Duration::from_secs(self.total_timeout))
            .with_http_timeout(Duration::from_secs(self.http_timeout))
            .with_dial_timeout(Duration::from_secs(self.dial_timeout))
            .with_rw_timeout(Duration::from_secs(self.rw_timeout))
            .with_test_host(self.test_host.clone())
            .with_user_agent(self.ua.clone())
            .with_channel_capacity(self.channel_capacity)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match harvest(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn harvest(cli: &Cli) -> Result<()> {
    let config = cli.run_config();
    let sources = sources::resolve_sources(cli.sources.as_ref())?;

    let stats = Arc::new(RunStats::new());
    let report = match proxy_harvest::run(&config, sources, Arc::clone(&stats)).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(stats = %stats.snapshot(), "run failed");
            return Err(e).context("run aborted");
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("Done.");
        println!("{}", report.summary());
    }
    Ok(())
}

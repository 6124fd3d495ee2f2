//! Proxy Harvest - Proxy list aggregator and checker
//!
//! Downloads public proxy lists concurrently, deduplicates the endpoints
//! they publish and keeps the ones that relay a real HTTP `GET` or
//! `CONNECT`, all within a bounded total run time.

pub mod config;
pub mod error;
pub mod proxy;
pub mod run;
pub mod shutdown;
pub mod stats;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use proxy::*;
pub use run::{run, RunReport, StopReason};
pub use stats::{RunStats, StatsSnapshot};

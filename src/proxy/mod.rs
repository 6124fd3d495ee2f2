//! Proxy module for harvesting and checking proxies
//!
//! This module provides functionality for:
//! - Extracting `IPv4:PORT` endpoints from arbitrary text
//! - Loading list sources and crawling them concurrently
//! - Deduplicating candidates before validation
//! - Checking proxies with raw HTTP `GET` and `CONNECT` requests
//! - Collecting and writing the working proxies

pub mod checker;
pub mod crawler;
pub mod dispatcher;
pub mod extractor;
pub mod models;
pub mod output;
pub mod pool;
pub mod sources;

pub use checker::{CheckerConfig, ProxyChecker};
pub use crawler::{CrawlerConfig, ProxyCrawler};
pub use dispatcher::SeenSet;
pub use extractor::extract;
pub use models::{Candidate, Source, ValidationMode};
pub use pool::PoolConfig;

//! Proxy checker module for checking proxy validity
//!
//! Checks speak raw HTTP/1.1 over a plain TCP connection so that only the
//! first status line has to be read.

use crate::config::{DEFAULT_DIAL_TIMEOUT_SECS, DEFAULT_RW_TIMEOUT_SECS, DEFAULT_TEST_HOST};
use crate::proxy::models::{Candidate, ValidationMode};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Longest status line read from a proxy
const MAX_STATUS_LINE: u64 = 4096;

const CHECK_USER_AGENT: &str = "proxy-scraper/1.0";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Which checks must pass
    pub mode: ValidationMode,
    /// Host requested through the proxy
    pub test_host: String,
    /// Timeout for establishing the TCP connection
    pub dial_timeout: Duration,
    /// Deadline for writing the request and reading the status line
    pub rw_timeout: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            test_host: DEFAULT_TEST_HOST.to_string(),
            dial_timeout: Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS),
            rw_timeout: Duration::from_secs(DEFAULT_RW_TIMEOUT_SECS),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_test_host(mut self, host: String) -> Self {
        self.test_host = host;
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
}

/// Proxy checker for validating proxies
#[derive(Debug, Clone, Default)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check a candidate according to the configured mode.
    ///
    /// In `Both` mode the CONNECT check only runs if the HTTP check failed.
    pub async fn check(&self, candidate: &Candidate) -> bool {
        match self.config.mode {
            ValidationMode::Http => self.check_http(candidate).await,
            ValidationMode::Connect => self.check_connect(candidate).await,
            ValidationMode::Both => {
                self.check_http(candidate).await || self.check_connect(candidate).await
            }
        }
    }

    /// Relay a plain `GET` for the test host; pass on any 2xx or 3xx status
    pub async fn check_http(&self, candidate: &Candidate) -> bool {
        let host = &self.config.test_host;
        let request = format!(
            "GET http://{host}/ HTTP/1.1\r\nHost: {host}\r\nUser-Agent: {CHECK_USER_AGENT}\r\nConnection: close\r\n\r\n"
        );
        match self.exchange(candidate, &request).await {
            Some(line) => http_status_ok(&line),
            None => false,
        }
    }

    /// Open a tunnel to port 443 of the test host; pass on a `200` reply
    pub async fn check_connect(&self, candidate: &Candidate) -> bool {
        let host = &self.config.test_host;
        let request = format!(
            "CONNECT {host}:443 HTTP/1.1\r\nHost: {host}:443\r\nProxy-Connection: keep-alive\r\n\r\n"
        );
        match self.exchange(candidate, &request).await {
            Some(line) => connect_established(&line),
            None => false,
        }
    }

    /// Dial, send `request`, and return the first response line.
    ///
    /// Any error, timeout or unterminated line yields `None`.
    async fn exchange(&self, candidate: &Candidate, request: &str) -> Option<String> {
        let stream = match tokio::time::timeout(
            self.config.dial_timeout,
            TcpStream::connect(candidate.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            _ => return None,
        };

        match tokio::time::timeout(self.config.rw_timeout, send_and_read_line(stream, request))
            .await
        {
            Ok(Ok(line)) => Some(line),
            _ => None,
        }
    }
}

async fn send_and_read_line(mut stream: TcpStream, request: &str) -> io::Result<String> {
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let mut reader = BufReader::new(stream.take(MAX_STATUS_LINE));
    let mut raw = Vec::new();
    reader.read_until(b'\n', &mut raw).await?;
    if raw.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete status line",
        ));
    }
    Ok(String::from_utf8_lossy(&raw).trim().to_string())
}

/// `HTTP/1.x <code> ...` with a code in `200..400`
fn http_status_ok(line: &str) -> bool {
    if !(line.starts_with("HTTP/1.1 ") || line.starts_with("HTTP/1.0 ")) {
        return false;
    }
    line.split(' ')
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .is_some_and(|code| (200..400).contains(&code))
}

/// `HTTP/1.0 200` or `HTTP/1.1 200` prefix
fn connect_established(line: &str) -> bool {
    line.starts_with("HTTP/1.1 200") || line.starts_with("HTTP/1.0 200")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_config_default() {
        let config = CheckerConfig::default();
        assert_eq!(config.mode, ValidationMode::Both);
        assert_eq!(config.test_host, DEFAULT_TEST_HOST);
        assert_eq!(config.dial_timeout, Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS));
        assert_eq!(config.rw_timeout, Duration::from_secs(DEFAULT_RW_TIMEOUT_SECS));
    }

    #[test]
    fn test_checker_config_builder() {
        let config = CheckerConfig::new()
            .with_mode(ValidationMode::Http)
            .with_test_host("test.local".to_string())
            .with_dial_timeout(Duration::from_secs(1))
            .with_rw_timeout(Duration::from_secs(2));

        assert_eq!(config.mode, ValidationMode::Http);
        assert_eq!(config.test_host, "test.local");
        assert_eq!(config.dial_timeout, Duration::from_secs(1));
        assert_eq!(config.rw_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_proxy_checker_with_config() {
        let config = CheckerConfig::new().with_mode(ValidationMode::Connect);
        let checker = ProxyChecker::with_config(config);
        assert_eq!(checker.config().mode, ValidationMode::Connect);
    }

    #[test]
    fn test_http_status_ok() {
        assert!(http_status_ok("HTTP/1.1 200 OK"));
        assert!(http_status_ok("HTTP/1.0 301 Moved Permanently"));
        assert!(http_status_ok("HTTP/1.1 399"));
        assert!(!http_status_ok("HTTP/1.1 400 Bad Request"));
        assert!(!http_status_ok("HTTP/1.1 199 Weird"));
        assert!(!http_status_ok("HTTP/2 200"));
        assert!(!http_status_ok("HTTP/1.1 abc"));
        assert!(!http_status_ok("SSH-2.0-OpenSSH_8.9"));
        assert!(!http_status_ok(""));
    }

    #[test]
    fn test_connect_established() {
        assert!(connect_established("HTTP/1.1 200 Connection established"));
        assert!(connect_established("HTTP/1.0 200"));
        assert!(!connect_established("HTTP/1.1 407 Proxy Authentication Required"));
        assert!(!connect_established("HTTP/1.1 302 Found"));
        assert!(!connect_established("200 OK"));
    }

    #[tokio::test]
    async fn test_check_refused_connection_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = ProxyChecker::with_config(
            CheckerConfig::new().with_dial_timeout(Duration::from_millis(500)),
        );
        assert!(!checker.check(&Candidate::new(addr.to_string())).await);
    }
}

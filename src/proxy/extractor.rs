//! Extraction of `IPv4:PORT` endpoints from free-form text

use crate::proxy::models::Candidate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;

/// Regex pattern to match IP:PORT patterns in text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,3}(?:\.\d{1,3}){3}:\d{2,5}\b").expect("Invalid IP:PORT regex")
});

/// Extract every valid endpoint from a single line of text.
///
/// Matches are returned in the order they appear. Each textual match is
/// re-checked: the host must parse as an IPv4 address and the port must be
/// in `1..=65535`.
pub fn extract(line: &str) -> Vec<Candidate> {
    IP_PORT_REGEX
        .find_iter(line)
        .map(|m| m.as_str())
        .filter(|m| is_valid_host_port(m))
        .map(Candidate::from)
        .collect()
}

/// Check that `host:port` has an IPv4 host and a non-zero 16-bit port
pub fn is_valid_host_port(s: &str) -> bool {
    let Some((host, port)) = s.trim().rsplit_once(':') else {
        return false;
    };
    if host.parse::<Ipv4Addr>().is_err() {
        return false;
    }
    matches!(port.parse::<u16>(), Ok(p) if p >= 1)
}

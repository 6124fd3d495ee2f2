//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which connectivity check(s) a candidate must pass to be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Plain proxied `GET` only
    Http,
    /// `CONNECT` tunnel only
    Connect,
    /// Either check may pass
    #[default]
    Both,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Http => write!(f, "http"),
            ValidationMode::Connect => write!(f, "connect"),
            ValidationMode::Both => write!(f, "both"),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ValidationMode::Http),
            "connect" => Ok(ValidationMode::Connect),
            "both" => Ok(ValidationMode::Both),
            other => Err(format!(
                "Invalid validation mode: {}. Use: http, connect, both",
                other
            )),
        }
    }
}

/// A remote endpoint believed to publish a list of proxies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display name of the source
    pub name: String,
    /// URL the list is fetched from
    pub url: String,
}

impl Source {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// An unvalidated `host:port` endpoint discovered from a source.
///
/// Identity is the exact text, so ordering and equality are those of the
/// underlying string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    /// Wrap already-normalized `host:port` text
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for Candidate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

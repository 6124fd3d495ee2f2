//! Errors that end a run.
//!
//! Everything that can go wrong with a single source or a single candidate is
//! absorbed where it happens; only the conditions below reach the caller.

use std::path::PathBuf;

/// Fatal run errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load sources from {}: {source}", .path.display())]
    SourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed writing output to {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Library result type
pub type Result<T> = std::result::Result<T, Error>;

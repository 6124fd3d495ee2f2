//! Collecting validated proxies and writing the result file

use crate::error::{Error, Result};
use crate::proxy::models::Candidate;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tokio::sync::mpsc;

/// Drain `results` until it closes and return the candidates sorted
/// ascending by their `host:port` text.
pub async fn collect(mut results: mpsc::Receiver<Candidate>) -> Vec<Candidate> {
    let mut out = Vec::new();
    while let Some(candidate) = results.recv().await {
        out.push(candidate);
    }
    out.sort();
    out
}

/// Write one candidate per line, replacing any existing file.
///
/// The data is flushed and synced before returning.
pub fn write_lines<P: AsRef<Path>>(path: P, lines: &[Candidate]) -> Result<()> {
    let path = path.as_ref();
    let to_err = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_err)?;
    let mut writer = BufWriter::with_capacity(256 * 1024, file);
    for line in lines {
        writer.write_all(line.as_str().as_bytes()).map_err(to_err)?;
        writer.write_all(b"\n").map_err(to_err)?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| to_err(e.into_error()))?;
    file.sync_all().map_err(to_err)?;
    Ok(())
}

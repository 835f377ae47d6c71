//! Output Writer (C7, §4.7): a single writer lock guarding serialized appends of
//! `term\tcount\n` records. Truncated once at startup, appended to by every batch thereafter.

use crate::error::WikiFilterError;
use crate::types::Term;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared across worker threads via `Arc`; each batch holds the lock only for the duration of
/// its own append, matching §5's "mutated only under the writer lock."
pub struct OutputWriter {
    path: PathBuf,
    inner: Mutex<BufWriter<std::fs::File>>,
}

impl OutputWriter {
    /// Open (truncating) the output file at `path` and wrap it for shared, serialized appends.
    pub fn create(path: &Path) -> Result<Arc<Self>> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)
            .map_err(|e| WikiFilterError::io("create output", path, e))?;

        Ok(Arc::new(OutputWriter {
            path: path.to_path_buf(),
            inner: Mutex::new(BufWriter::new(file)),
        }))
    }

    /// Append one batch's records, formatted as `term\tcount\n` for every counter > 0 in
    /// `terms[range]`/`counts` term-index order. A write failure is logged and does not
    /// propagate — the batch's in-memory counts aren't lost, only the append is (§4.7, §7).
    pub fn append_batch(&self, terms: &[Term], counts: &[u32]) {
        let mut buf = String::new();
        for (term, &count) in terms.iter().zip(counts) {
            if count == 0 {
                continue;
            }
            // Dictionary terms are arbitrary bytes (§1 Non-goals: byte-level, no UTF-8
            // normalization); a lossy conversion here only affects how the record displays
            // for rare invalid-UTF-8 input, never which terms are matched or counted.
            buf.push_str(&String::from_utf8_lossy(term));
            buf.push('\t');
            buf.push_str(&count.to_string());
            buf.push('\n');
        }
        if buf.is_empty() {
            return;
        }

        let result = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("output writer lock poisoned"))
            .and_then(|mut w| w.write_all(buf.as_bytes()).context("appending output records"));
        if let Err(e) = result {
            log::error!("output append failed for {}: {e:#}", self.path.display());
        }
    }

    /// Flush the buffered writer; called once after the last batch completes.
    pub fn flush(&self) -> Result<()> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("output writer lock poisoned"))?
            .flush()
            .with_context(|| format!("flushing output {}", self.path.display()))
    }
}

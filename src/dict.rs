//! Dictionary Loader (C2, §4.2): read the dictionary file, collapse whitespace, drop short terms.

use crate::error::WikiFilterError;
use crate::types::Dictionary;
use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

/// Load the dictionary at `path`. Streams line-by-line (`BufRead::read_until`) rather than
/// reading the whole file at once, so a pathological multi-GB dictionary doesn't itself blow the
/// memory budget before the planner ever runs — only the raw-line scratch buffer is reused.
///
/// Each line has any internal run of whitespace (space, tab, CR, LF) collapsed to nothing; lines
/// yielding ≤1 byte after collapse are dropped. Input order is preserved; duplicates are kept
/// (§4.2: "Deduplication is not performed").
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let file = std::fs::File::open(path)
        .map_err(|e| WikiFilterError::io("open dictionary", path, e))?;
    let mut reader = std::io::BufReader::new(file);

    let mut terms = Vec::new();
    let mut raw_line = Vec::new();
    let mut lines_read = 0usize;

    loop {
        raw_line.clear();
        let n = reader
            .read_until(b'\n', &mut raw_line)
            .with_context(|| format!("reading dictionary {}", path.display()))?;
        if n == 0 {
            break;
        }
        lines_read += 1;

        let term = collapse_whitespace(&raw_line);
        if term.len() > 1 {
            terms.push(term);
        }
    }

    log::info!(
        "dictionary: {} lines read, {} terms retained ({} dropped as ≤1 byte)",
        lines_read,
        terms.len(),
        lines_read.saturating_sub(terms.len())
    );

    Ok(Dictionary { terms })
}

/// Remove every whitespace byte (space, tab, CR, LF) from `line`, regardless of position —
/// §4.2 says "collapse any internal run of whitespace ... to empty", i.e. whitespace is deleted,
/// not merged into a single separator.
fn collapse_whitespace(line: &[u8]) -> Vec<u8> {
    line.iter()
        .copied()
        .filter(|b| !is_whitespace_byte(*b))
        .collect()
}

fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

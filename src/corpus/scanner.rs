//! Two-pass chunk scanner (§4.3). Pass 1 walks the file once to find line-aligned chunk
//! boundaries sized to the caller's chunk budget; pass 2 replays those boundaries, once per
//! batch, either from a cached mmap (single-chunk corpora) or via positioned reads.

use crate::error::WikiFilterError;
use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A line-aligned byte range within the corpus file. No line straddles two boundaries: the
/// chunk always ends right after a `\n`, except the final chunk, which ends at EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBoundary {
    pub start: u64,
    pub end: u64,
    pub line_count: u64,
}

impl ChunkBoundary {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Holds the pass-1 boundary table and, for single-chunk corpora, a cached mmap so pass 2 never
/// touches the disk more than once regardless of how many batches replay it.
pub struct CorpusScanner {
    path: PathBuf,
    chunks: Vec<ChunkBoundary>,
    cache: Option<Mmap>,
}

impl CorpusScanner {
    /// Run pass 1: walk `path` once, producing line-aligned chunks each at most `chunk_size_bytes`
    /// (a single pathologically long line may exceed it; §4.3 only promises "never splits a
    /// line", not an upper bound on an individual line's length).
    pub fn scan(path: &Path, chunk_size_bytes: u64) -> Result<Self> {
        let chunk_size_bytes = chunk_size_bytes.max(1);
        let file =
            File::open(path).map_err(|e| WikiFilterError::io("open corpus", path, e))?;
        let file_size = file
            .metadata()
            .with_context(|| format!("stat corpus {}", path.display()))?
            .len();

        let chunks = scan_boundaries(&file, path, file_size, chunk_size_bytes)?;

        let cache = if chunks.len() == 1 {
            // Safety: we only ever read this mapping; the file is not modified by this process
            // afterward, and a concurrently-modified corpus is out of scope (§5 Non-goals).
            unsafe { Mmap::map(&file) }.ok()
        } else {
            None
        };

        Ok(CorpusScanner {
            path: path.to_path_buf(),
            chunks,
            cache,
        })
    }

    pub fn chunks(&self) -> &[ChunkBoundary] {
        &self.chunks
    }

    pub fn total_lines(&self) -> u64 {
        self.chunks.iter().map(|c| c.line_count).sum()
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Pass 2: replay every chunk in order, invoking `visitor` once per non-empty line with
    /// `(line_bytes, chunk_index, global_line_index)`. `visitor` returns `false` to stop the
    /// scan early (cooperative cancellation).
    pub fn stream<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&[u8], usize, u64) -> bool,
    {
        let mut global_line_index: u64 = 0;

        if let Some(mmap) = &self.cache {
            for (chunk_idx, chunk) in self.chunks.iter().enumerate() {
                let bytes = &mmap[chunk.start as usize..chunk.end as usize];
                if !visit_lines(bytes, chunk_idx, &mut global_line_index, &mut visitor) {
                    return Ok(());
                }
            }
            return Ok(());
        }

        let mut file = File::open(&self.path)
            .map_err(|e| WikiFilterError::io("open corpus", &self.path, e))?;
        let mut buf = Vec::new();
        for (chunk_idx, chunk) in self.chunks.iter().enumerate() {
            let len = chunk.len() as usize;
            buf.resize(len, 0);
            file.seek(SeekFrom::Start(chunk.start))
                .with_context(|| format!("seeking corpus {}", self.path.display()))?;
            file.read_exact(&mut buf)
                .with_context(|| format!("reading corpus {}", self.path.display()))?;
            if !visit_lines(&buf, chunk_idx, &mut global_line_index, &mut visitor) {
                return Ok(());
            }
        }
        Ok(())
    }
}

fn visit_lines<F>(
    bytes: &[u8],
    chunk_idx: usize,
    global_line_index: &mut u64,
    visitor: &mut F,
) -> bool
where
    F: FnMut(&[u8], usize, u64) -> bool,
{
    for line in bytes.split(|&b| b == b'\n') {
        // `split` yields a trailing empty slice when the chunk ends in `\n`, and yields empty
        // slices for genuinely blank lines; §4.2/§4.3 skip zero-length lines either way.
        if line.is_empty() {
            continue;
        }
        let keep_going = visitor(line, chunk_idx, *global_line_index);
        *global_line_index += 1;
        if !keep_going {
            return false;
        }
    }
    true
}

/// Grow a read window forward from `pos` by `chunk_size_bytes` increments until either a
/// newline appears in the most recently appended bytes or EOF is reached, so a single line
/// longer than `chunk_size_bytes` never gets split.
fn scan_boundaries(
    file: &File,
    path: &Path,
    file_size: u64,
    chunk_size_bytes: u64,
) -> Result<Vec<ChunkBoundary>> {
    let mut chunks = Vec::new();
    let mut pos: u64 = 0;
    let mut window: Vec<u8> = Vec::with_capacity(chunk_size_bytes as usize);

    while pos < file_size {
        window.clear();
        let mut reached_eof;
        loop {
            let already_read = window.len() as u64;
            let remaining = file_size - pos - already_read;
            let want = remaining.min(chunk_size_bytes);
            let old_len = window.len();
            window.resize(old_len + want as usize, 0);
            read_exact_at(file, path, pos + old_len as u64, &mut window[old_len..])?;

            reached_eof = pos + window.len() as u64 == file_size;
            if reached_eof {
                break;
            }
            if window.iter().rposition(|&b| b == b'\n').is_some() {
                break;
            }
            // No newline anywhere in the window yet; grow it and try again.
        }

        let end = if reached_eof {
            pos + window.len() as u64
        } else {
            let nl_idx = window
                .iter()
                .rposition(|&b| b == b'\n')
                .expect("loop only exits without reaching EOF when a newline was found");
            pos + nl_idx as u64 + 1
        };

        let chunk_bytes = &window[..(end - pos) as usize];
        let line_count = chunk_bytes.iter().filter(|&&b| b == b'\n').count() as u64;
        chunks.push(ChunkBoundary {
            start: pos,
            end,
            line_count,
        });
        pos = end;
    }

    Ok(chunks)
}

fn read_exact_at(file: &File, path: &Path, offset: u64, buf: &mut [u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_exact_at(buf, offset)
            .with_context(|| format!("reading corpus {} at offset {offset}", path.display()))?;
        Ok(())
    }
    #[cfg(not(unix))]
    {
        let mut file = file.try_clone().with_context(|| "cloning corpus handle")?;
        file.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seeking corpus {}", path.display()))?;
        file.read_exact(buf)
            .with_context(|| format!("reading corpus {} at offset {offset}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(contents: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_corpus_has_no_chunks() {
        let (_dir, path) = write_tmp(b"");
        let scanner = CorpusScanner::scan(&path, 4096).unwrap();
        assert!(scanner.chunks().is_empty());
        assert_eq!(scanner.total_lines(), 0);
    }

    #[test]
    fn single_chunk_covers_whole_file_and_uses_cache() {
        let (_dir, path) = write_tmp(b"one\ntwo\nthree\n");
        let scanner = CorpusScanner::scan(&path, 4096).unwrap();
        assert_eq!(scanner.chunks().len(), 1);
        assert_eq!(scanner.total_lines(), 3);

        let mut seen = Vec::new();
        scanner
            .stream(|line, _chunk, _idx| {
                seen.push(line.to_vec());
                true
            })
            .unwrap();
        assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn no_trailing_newline_still_yields_last_line() {
        let (_dir, path) = write_tmp(b"one\ntwo");
        let scanner = CorpusScanner::scan(&path, 4096).unwrap();
        let mut seen = Vec::new();
        scanner
            .stream(|line, _c, _i| {
                seen.push(line.to_vec());
                true
            })
            .unwrap();
        assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn never_splits_a_line_across_chunks() {
        let mut contents = Vec::new();
        for i in 0..200 {
            contents.extend_from_slice(format!("line-{i:04}\n").as_bytes());
        }
        let (_dir, path) = write_tmp(&contents);
        // Small chunk budget forces many chunk boundaries.
        let scanner = CorpusScanner::scan(&path, 64).unwrap();
        assert!(scanner.chunks().len() > 1);

        let mut seen = Vec::new();
        scanner
            .stream(|line, _c, _i| {
                seen.push(line.to_vec());
                true
            })
            .unwrap();
        let expected: Vec<Vec<u8>> = (0..200)
            .map(|i| format!("line-{i:04}").into_bytes())
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn a_line_longer_than_the_chunk_budget_is_not_split() {
        let long_line = vec![b'x'; 1000];
        let mut contents = long_line.clone();
        contents.push(b'\n');
        contents.extend_from_slice(b"short\n");
        let (_dir, path) = write_tmp(&contents);

        let scanner = CorpusScanner::scan(&path, 64).unwrap();
        let mut seen = Vec::new();
        scanner
            .stream(|line, _c, _i| {
                seen.push(line.to_vec());
                true
            })
            .unwrap();
        assert_eq!(seen, vec![long_line, b"short".to_vec()]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (_dir, path) = write_tmp(b"a\n\nb\n\n\nc\n");
        let scanner = CorpusScanner::scan(&path, 4096).unwrap();
        let mut seen = Vec::new();
        scanner
            .stream(|line, _c, _i| {
                seen.push(line.to_vec());
                true
            })
            .unwrap();
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn stream_stops_early_when_visitor_returns_false() {
        let (_dir, path) = write_tmp(b"a\nb\nc\nd\n");
        let scanner = CorpusScanner::scan(&path, 4096).unwrap();
        let mut seen = Vec::new();
        scanner
            .stream(|line, _c, _i| {
                seen.push(line.to_vec());
                seen.len() < 2
            })
            .unwrap();
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}

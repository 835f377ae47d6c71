//! Corpus Scanner (C3, §4.3): two-pass streaming reader. Pass 1 computes line-aligned chunk
//! boundaries once; pass 2 is replayed, read-only, once per batch.

mod scanner;

pub use scanner::{ChunkBoundary, CorpusScanner};

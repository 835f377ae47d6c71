//! CLI surface (§6.1): exactly three positional arguments, no flags, no subcommands.

use clap::Parser;
use std::path::PathBuf;

/// Count, for each dictionary term, the number of corpus lines containing it as a substring.
#[derive(Clone, Parser)]
#[command(name = "wikifilter")]
#[command(about = "Batched Aho-Corasick substring counting over a large dictionary and corpus.")]
pub struct Cli {
    /// Path to the dictionary file, one term per line.
    pub dict_path: PathBuf,

    /// Path to the corpus file to scan.
    pub text_path: PathBuf,

    /// Worker thread count. Absent or ≤0: auto-detect (capped at 64, falling back to 2).
    pub thread_count: Option<i64>,
}

impl Cli {
    /// Output path is always `<text_path>.filted.csv` (§6.4).
    pub fn output_path(&self) -> PathBuf {
        let mut name = self.text_path.as_os_str().to_os_string();
        name.push(".filted.csv");
        PathBuf::from(name)
    }

    /// Resolve `thread_count` per §6.1: `None`/`<=0` auto-detects, `>0` is honored verbatim.
    pub fn resolve_thread_count(&self) -> usize {
        match self.thread_count {
            Some(n) if n > 0 => n as usize,
            _ => auto_detect_thread_count(),
        }
    }
}

fn auto_detect_thread_count() -> usize {
    let detected = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(crate::config::FALLBACK_THREADS);
    if detected == 0 || detected > crate::config::MAX_THREADS {
        crate::config::FALLBACK_THREADS
    } else {
        detected
    }
}

//! Typed error taxonomy (§7). Internal functions return `anyhow::Result`; `main` downcasts
//! the terminal error to pick an exit code.

use std::path::PathBuf;

/// The fatal error kinds §7 names. `LocaleWarning` is not a variant here: this engine is
/// byte-level throughout (§4.3/§9) and never imbues a stream with a locale, so that source
/// condition has no reachable path in this implementation.
#[derive(Debug, thiserror::Error)]
pub enum WikiFilterError {
    #[error("{0}")]
    ArgError(String),

    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "cannot fit a single term per batch within the usable AC budget ({usable_ac_mb} MB for {requested_terms} terms)"
    )]
    MemoryBudget {
        requested_terms: usize,
        usable_ac_mb: u64,
    },
}

impl WikiFilterError {
    /// Exit code §7 maps this error kind to. `main` uses this after downcasting an
    /// `anyhow::Error` chain; anything that doesn't downcast to `WikiFilterError` (a bug, or an
    /// error from a dependency we didn't wrap) is treated as a generic processing failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            WikiFilterError::ArgError(_) => 1,
            WikiFilterError::Io { .. } | WikiFilterError::MemoryBudget { .. } => 2,
        }
    }

    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WikiFilterError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Exit code for a fatal `anyhow::Error` chain produced anywhere in the run. §9 resolves the
/// spec's "≤ −1" to the concrete Unix code 2, since `std::process::exit` truncates to `u8` and
/// cannot portably carry a negative value.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<WikiFilterError>() {
        Some(e) => e.exit_code(),
        None => 2,
    }
}

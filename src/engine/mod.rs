//! CLI surface and run orchestration: argument parsing (§6.1), the progress sink (A4), and the
//! top-level `run` that wires C1-C8 together end to end.

pub mod cli;
pub mod progress;
mod run;

pub use cli::Cli;
pub use run::{run, run_with_cancel};

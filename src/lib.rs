//! WikiFilter: counts, for each term in a large dictionary, the number of corpus lines that
//! contain it as a substring. A batch planner partitions the dictionary so a compact
//! Aho-Corasick automaton fits a memory budget per batch; a two-pass corpus scanner streams the
//! corpus once per batch; a scheduler runs batches across a worker pool.

pub mod ac;
pub mod config;
pub mod corpus;
pub mod dict;
pub mod engine;
pub mod error;
pub mod executor;
pub mod logger;
pub mod memory;
pub mod output;
pub mod plan;
pub mod scheduler;
pub mod types;

pub use error::WikiFilterError;

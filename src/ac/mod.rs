//! Aho-Corasick Engine (C4, §4.4): compact arena automaton, built fresh per batch and owned by
//! the executing worker for its lifetime only.

mod build;
mod node;
mod search;

pub use build::Automaton;
pub use node::NodeId;

//! Per-line search (§4.4 "Search over a line"). Given one line's bytes, walks the automaton
//! byte by byte, following failure links on mismatch, and collects the merged output set at
//! every node visited; the caller gets back the sorted, deduplicated set of batch-local term
//! indices that occur as a substring of the line.

use super::build::Automaton;
use super::node::NodeId;

impl Automaton {
    /// Search `line` and append every matching batch-local term index to `matches` (cleared
    /// first). Returns a sorted, deduplicated slice view via `matches.as_slice()` for callers
    /// that want it, but the primary contract is the side effect on `matches` — reused across
    /// calls so a scan over millions of lines allocates once.
    pub fn search_line(&self, line: &[u8], matches: &mut Vec<u32>) {
        matches.clear();
        let nodes = self.nodes();
        let outputs = self.outputs();

        let mut current = NodeId::ROOT;
        for &byte in line {
            loop {
                if let Some(next) = nodes[current.index()].child(byte) {
                    current = next;
                    break;
                }
                if current == NodeId::ROOT {
                    break;
                }
                current = nodes[current.index()].fail;
            }

            let node = &nodes[current.index()];
            if node.output_count > 0 {
                let start = node.output_start as usize;
                let end = start + node.output_count as usize;
                matches.extend_from_slice(&outputs[start..end]);
            }
        }

        matches.sort_unstable();
        matches.dedup();
    }
}

//! Automaton construction (§4.4 Insert / Build failure links). Built fresh per batch, owned by
//! the executing worker, dropped at batch end — never shared across threads (§5).

use super::node::{Node, NodeId};
use std::collections::VecDeque;

/// A compact Aho-Corasick automaton over one batch of terms. `term_start` is the batch's
/// offset into the dictionary's global term index, so callers can translate a batch-local
/// output index back to `terms[term_start + local_index]`.
pub struct Automaton {
    nodes: Vec<Node>,
    outputs: Vec<u32>,
    pub term_start: usize,
}

impl Automaton {
    /// Build an automaton over `terms`, whose global index `term_start + i` corresponds to
    /// `terms[i]`.
    pub fn build(terms: &[Vec<u8>], term_start: usize) -> Self {
        let mut automaton = Automaton {
            nodes: vec![Node::root()],
            outputs: Vec::new(),
            term_start,
        };
        for (local_index, term) in terms.iter().enumerate() {
            automaton.insert(term, local_index as u32);
        }
        automaton.build_failure_links();
        automaton
    }

    fn insert(&mut self, term: &[u8], local_index: u32) {
        let mut current = NodeId::ROOT;
        for &byte in term {
            current = match self.nodes[current.index()].child(byte) {
                Some(next) => next,
                None => {
                    let new_id = NodeId(self.nodes.len() as u32);
                    self.nodes.push(Node::leaf(NodeId::ROOT));
                    self.nodes[current.index()].insert_child(byte, new_id);
                    new_id
                }
            };
        }
        let node = &mut self.nodes[current.index()];
        let start = self.outputs.len() as u32;
        self.outputs.push(local_index);
        node.output_start = start;
        node.output_count = 1;
    }

    /// Breadth-first failure link assignment plus output-set merging (§4.4). BFS visits nodes
    /// in non-decreasing depth order, so by the time a node `u` is processed, `u.fail` (which
    /// always has strictly smaller depth) already carries its fully merged output set.
    fn build_failure_links(&mut self) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        let root_children: Vec<(u8, NodeId)> = self.nodes[NodeId::ROOT.index()].children.clone();
        for (_, child) in &root_children {
            self.nodes[child.index()].fail = NodeId::ROOT;
            queue.push_back(*child);
        }

        while let Some(u) = queue.pop_front() {
            let children: Vec<(u8, NodeId)> = self.nodes[u.index()].children.clone();
            for (byte, v) in children {
                let mut f = self.nodes[u.index()].fail;
                loop {
                    if let Some(next) = self.nodes[f.index()].child(byte) {
                        f = next;
                        break;
                    }
                    if f == NodeId::ROOT {
                        break;
                    }
                    f = self.nodes[f.index()].fail;
                }
                self.nodes[v.index()].fail = f;
                self.merge_outputs(v, f);
                queue.push_back(v);
            }
        }
    }

    /// Fold `fail`'s output set into `node`'s, materializing the union at a fresh tail region of
    /// the outputs vector so search never needs to walk the failure chain to collect matches.
    fn merge_outputs(&mut self, node: NodeId, fail: NodeId) {
        let fail_node = &self.nodes[fail.index()];
        if fail_node.output_count == 0 {
            return;
        }
        let fail_range =
            fail_node.output_start as usize..(fail_node.output_start + fail_node.output_count) as usize;
        let fail_outputs: Vec<u32> = self.outputs[fail_range].to_vec();

        let own_node = &self.nodes[node.index()];
        let own_range =
            own_node.output_start as usize..(own_node.output_start + own_node.output_count) as usize;
        let own_outputs: Vec<u32> = self.outputs[own_range].to_vec();

        let merged_start = self.outputs.len() as u32;
        self.outputs.extend_from_slice(&own_outputs);
        self.outputs.extend_from_slice(&fail_outputs);
        let merged_count = (own_outputs.len() + fail_outputs.len()) as u32;

        let node_mut = &mut self.nodes[node.index()];
        node_mut.output_start = merged_start;
        node_mut.output_count = merged_count;
    }

    pub(super) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(super) fn outputs(&self) -> &[u32] {
        &self.outputs
    }

    /// Rough resident footprint, for the planner's actual-vs-predicted logging; not used to
    /// re-derive the budget mid-run.
    pub fn approx_bytes(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<Node>()
            + self
                .nodes
                .iter()
                .map(|n| n.children.capacity() * std::mem::size_of::<(u8, NodeId)>())
                .sum::<usize>()
            + self.outputs.capacity() * std::mem::size_of::<u32>()
    }
}

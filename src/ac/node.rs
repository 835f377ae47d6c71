//! Arena node representation (§4.4 Expansion). Plain index types, no pointer graph: a node is an
//! index into `Automaton::nodes`, children are `(byte, NodeId)` pairs sorted by byte.

/// Index into an [`Automaton`](super::build::Automaton)'s node arena. A newtype rather than a
/// bare `u32` so a node index can never be passed where a term index is expected, or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One trie node: a sorted child list, a failure link, and a span into the shared outputs
/// vector. `fail` is `NodeId::ROOT` for the root itself, by convention (§4.1 node doc).
#[derive(Debug, Clone)]
pub struct Node {
    pub children: Vec<(u8, NodeId)>,
    pub fail: NodeId,
    pub output_start: u32,
    pub output_count: u32,
}

impl Node {
    pub fn root() -> Self {
        Node {
            children: Vec::new(),
            fail: NodeId::ROOT,
            output_start: 0,
            output_count: 0,
        }
    }

    pub fn leaf(fail: NodeId) -> Self {
        Node {
            children: Vec::new(),
            fail,
            output_start: 0,
            output_count: 0,
        }
    }

    /// Binary search child by byte; `None` if there's no transition on `c`.
    pub fn child(&self, c: u8) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&c, |(byte, _)| *byte)
            .ok()
            .map(|i| self.children[i].1)
    }

    /// Insert-sorted child addition. Caller guarantees `c` is not already present.
    pub fn insert_child(&mut self, c: u8, id: NodeId) {
        let pos = self
            .children
            .binary_search_by_key(&c, |(byte, _)| *byte)
            .unwrap_err();
        self.children.insert(pos, (c, id));
    }
}

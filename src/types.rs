//! Shared data model (§3): terms, batch ranges, and the run-wide dictionary they index into.

use std::ops::Range;

/// An immutable dictionary term: a byte sequence of length ≥2 after whitespace collapse (§4.2).
/// Stored as raw bytes, never `String` — matching is byte-level per the Non-goals in §1.
pub type Term = Vec<u8>;

/// The full term list for the process lifetime. Indices into `terms` are term identifiers;
/// read-only after [`crate::dict::load_dictionary`] returns, shared freely across workers.
#[derive(Debug, Default)]
pub struct Dictionary {
    pub terms: Vec<Term>,
}

impl Dictionary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A half-open interval `[start, end)` of term indices (§3). Owned by the Batch Planner,
/// consumed by one Batch Executor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchRange {
    pub start: usize,
    pub end: usize,
}

impl BatchRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

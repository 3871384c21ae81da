//! Per-call identity arena: the clone cache.
//!
//! Originals are keyed by allocation address, indirected through a dense
//! integer token assigned at first sight. Every interned original is pinned
//! in the arena, so an address cannot be freed and reused — and thereby
//! alias a second node — within one clone call.

use regraft_model::NodeRef;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheToken(usize);

/// Identity-keyed mapping from an original node to its in-progress or
/// finished copy. One instance per top-level clone call, never reused.
#[derive(Default)]
pub(crate) struct CloneCache {
    tokens: HashMap<usize, CacheToken>,
    originals: Vec<NodeRef>,
    copies: HashMap<CacheToken, NodeRef>,
}

impl CloneCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Token for `original`, assigned at first sight. Pins the handle.
    fn intern(&mut self, original: &NodeRef) -> CacheToken {
        let addr = original.addr();
        if let Some(token) = self.tokens.get(&addr) {
            return *token;
        }
        let token = CacheToken(self.originals.len());
        self.originals.push(original.clone());
        self.tokens.insert(addr, token);
        token
    }

    /// The copy recorded for `original`, if one exists.
    pub(crate) fn get(&self, original: &NodeRef) -> Option<NodeRef> {
        let token = self.tokens.get(&original.addr())?;
        self.copies.get(token).cloned()
    }

    /// Records `copy` as the one copy of `original`.
    pub(crate) fn insert(&mut self, original: &NodeRef, copy: &NodeRef) {
        let token = self.intern(original);
        self.copies.insert(token, copy.clone());
    }

    /// Number of originals with a recorded copy.
    pub(crate) fn len(&self) -> usize {
        self.copies.len()
    }
}

//! Unique edge collection.

use std::collections::HashSet;

use parking_lot::RwLock;

use super::edge::{edge_key, EdgeKey, IndexedEdge};

/// Edges gated by their canonical key. Keeps first-insertion order.
#[derive(Clone, Debug, Default)]
pub struct EdgeSet {
  seen: HashSet<EdgeKey>,
  edges: Vec<IndexedEdge>,
}

impl EdgeSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      seen: HashSet::with_capacity(capacity),
      edges: Vec::with_capacity(capacity),
    }
  }

  /// Record `(a, b)` unless the same unordered pair was seen.
  /// Returns whether it was new.
  pub fn insert(&mut self, a: u32, b: u32) -> bool {
    if !self.seen.insert(edge_key(a, b)) {
      return false;
    }
    self.edges.push(IndexedEdge::new(a, b));
    true
  }

  pub fn contains(&self, a: u32, b: u32) -> bool {
    self.seen.contains(&edge_key(a, b))
  }

  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  pub fn edges(&self) -> &[IndexedEdge] {
    &self.edges
  }

  pub fn into_edges(self) -> Vec<IndexedEdge> {
    self.edges
  }

  /// Order edges by canonical key.
  pub fn sort_by_key(&mut self) {
    self.edges.sort_unstable_by_key(IndexedEdge::key);
  }
}

/// [`EdgeSet`] shared by concurrent extraction tasks.
///
/// Most links are seen twice (once from each endpoint), so lookups go
/// through the read lock first; only misses take the write lock, where the
/// key is checked again before inserting.
#[derive(Debug, Default)]
pub struct SharedEdgeSet {
  inner: RwLock<EdgeSet>,
}

impl SharedEdgeSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&self, a: u32, b: u32) -> bool {
    if self.inner.read().contains(a, b) {
      return false;
    }
    self.inner.write().insert(a, b)
  }

  pub fn len(&self) -> usize {
    self.inner.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().is_empty()
  }

  pub fn into_inner(self) -> EdgeSet {
    self.inner.into_inner()
  }

  /// Move the collected edges out, leaving the set empty.
  pub fn take(&self) -> EdgeSet {
    std::mem::take(&mut *self.inner.write())
  }
}

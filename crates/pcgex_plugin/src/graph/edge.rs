//! Undirected edges and their canonical 64-bit key.

/// Canonical key of an undirected edge.
pub type EdgeKey = u64;

/// `(min << 32) | max`. Symmetric, and injective over unordered `u32` pairs.
#[inline]
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
  let (low, high) = if a <= b { (a, b) } else { (b, a) };
  (u64::from(low) << 32) | u64::from(high)
}

/// Inverse of [`edge_key`], smaller index first.
#[inline]
pub fn unpack_edge_key(key: EdgeKey) -> (u32, u32) {
  ((key >> 32) as u32, key as u32)
}

/// An edge between two point indices of the same collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexedEdge {
  pub start: u32,
  pub end: u32,
  /// Cleared when an endpoint no longer exists.
  pub valid: bool,
}

impl IndexedEdge {
  pub fn new(start: u32, end: u32) -> Self {
    Self {
      start,
      end,
      valid: true,
    }
  }

  #[inline]
  pub fn key(&self) -> EdgeKey {
    edge_key(self.start, self.end)
  }

  /// The endpoint opposite `index`, if `index` is an endpoint.
  pub fn other(&self, index: u32) -> Option<u32> {
    if index == self.start {
      Some(self.end)
    } else if index == self.end {
      Some(self.start)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn test_key_layout() {
    assert_eq!(edge_key(1, 2), (1u64 << 32) | 2);
    assert_eq!(edge_key(2, 1), edge_key(1, 2));
    assert_eq!(unpack_edge_key(edge_key(9, 4)), (4, 9));
    assert_eq!(edge_key(u32::MAX, 0), u64::from(u32::MAX));
  }

  #[test]
  fn test_other_endpoint() {
    let edge = IndexedEdge::new(3, 8);
    assert_eq!(edge.other(3), Some(8));
    assert_eq!(edge.other(8), Some(3));
    assert_eq!(edge.other(5), None);
  }

  proptest! {
    #[test]
    fn prop_key_is_symmetric(a in any::<u32>(), b in any::<u32>()) {
      prop_assert_eq!(edge_key(a, b), edge_key(b, a));
    }

    #[test]
    fn prop_distinct_pairs_never_collide(
      a in any::<u32>(), b in any::<u32>(), c in any::<u32>(), d in any::<u32>(),
    ) {
      let same_pair = (a.min(b), a.max(b)) == (c.min(d), c.max(d));
      prop_assert_eq!(edge_key(a, b) == edge_key(c, d), same_pair);
    }

    #[test]
    fn prop_unpack_inverts(a in any::<u32>(), b in any::<u32>()) {
      prop_assert_eq!(unpack_edge_key(edge_key(a, b)), (a.min(b), a.max(b)));
    }
  }
}

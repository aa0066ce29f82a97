//! Edge endpoint repair after points were removed or reordered.

use std::collections::HashMap;

use super::edge::IndexedEdge;

/// Old indices may exceed the pair count by this factor before the table
/// switches to a map.
const DENSE_SPREAD: usize = 4;

/// Old index -> new index table.
///
/// Dense while the old indices are compact, a hash map otherwise. Memory is
/// O(pairs) either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRemap {
  table: Table,
  mapped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Table {
  Dense(Vec<Option<u32>>),
  Sparse(HashMap<u32, u32>),
}

impl Default for IndexRemap {
  fn default() -> Self {
    Self {
      table: Table::Dense(Vec::new()),
      mapped: 0,
    }
  }
}

impl IndexRemap {
  /// Every index in `0..len` maps to itself.
  pub fn identity(len: usize) -> Self {
    Self {
      table: Table::Dense((0..len as u32).map(Some).collect()),
      mapped: len,
    }
  }

  /// `surviving[new] = old`: the old index of each point, in current order.
  ///
  /// An old index listed twice keeps its first position.
  pub fn from_surviving(surviving: &[u32]) -> Self {
    Self::from_pairs(
      surviving
        .iter()
        .enumerate()
        .map(|(new_index, &old_index)| (old_index, new_index as u32)),
    )
  }

  /// Build from `(old, new)` pairs. The first pair for an old index wins.
  pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
    let pairs: Vec<(u32, u32)> = pairs.into_iter().collect();
    let Some(max_old) = pairs.iter().map(|&(old_index, _)| old_index as usize).max() else {
      return Self::default();
    };

    let mut mapped = 0;
    let table = if max_old < pairs.len().saturating_mul(DENSE_SPREAD) {
      let mut table = vec![None; max_old + 1];
      for (old_index, new_index) in pairs {
        let slot = &mut table[old_index as usize];
        if slot.is_none() {
          *slot = Some(new_index);
          mapped += 1;
        }
      }
      Table::Dense(table)
    } else {
      let mut table = HashMap::with_capacity(pairs.len());
      for (old_index, new_index) in pairs {
        table.entry(old_index).or_insert_with(|| {
          mapped += 1;
          new_index
        });
      }
      Table::Sparse(table)
    };
    Self { table, mapped }
  }

  /// New index of `old`, `None` when that point is gone.
  #[inline]
  pub fn resolve(&self, old: u32) -> Option<u32> {
    match &self.table {
      Table::Dense(table) => table.get(old as usize).copied().flatten(),
      Table::Sparse(table) => table.get(&old).copied(),
    }
  }

  /// Number of old indices that resolve.
  pub fn len(&self) -> usize {
    self.mapped
  }

  pub fn is_empty(&self) -> bool {
    self.mapped == 0
  }

  /// Slots held by the table, mapped or not.
  pub fn capacity(&self) -> usize {
    match &self.table {
      Table::Dense(table) => table.len(),
      Table::Sparse(table) => table.len(),
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
  /// Valid edges whose endpoints moved.
  pub remapped: usize,
  /// Edges flagged invalid by this pass.
  pub invalidated: usize,
  /// Edges that were already invalid.
  pub skipped: usize,
}

/// Rewrite every valid edge through `remap`. Edges with an unresolved
/// endpoint are flagged invalid; nothing is removed.
pub fn consolidate_edges(edges: &mut [IndexedEdge], remap: &IndexRemap) -> ConsolidationStats {
  let mut stats = ConsolidationStats::default();
  for edge in edges.iter_mut() {
    if !edge.valid {
      stats.skipped += 1;
      continue;
    }
    match (remap.resolve(edge.start), remap.resolve(edge.end)) {
      (Some(start), Some(end)) => {
        if (start, end) != (edge.start, edge.end) {
          stats.remapped += 1;
        }
        edge.start = start;
        edge.end = end;
      }
      _ => {
        edge.valid = false;
        stats.invalidated += 1;
      }
    }
  }
  stats
}
